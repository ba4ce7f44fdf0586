//! Wire types for the `/ask` endpoint.
//!
//! These mirror the JSON shapes produced by the retrieval backend. Field names
//! follow the backend (`isNonsense`), not Rust conventions.

use serde::{Deserialize, Serialize};

/// Request body for `POST /ask`.
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    /// The user's question, already trimmed and non-empty.
    pub query: &'a str,
}

/// A citation returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Backend identifier of the case study.
    pub id: String,
    /// Case study title.
    pub title: String,
    /// Client the case study belongs to.
    pub client: String,
    /// Relevance score in `[0, 1]`, if the backend ranked it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Successful response from `POST /ask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer text.
    pub answer: String,
    /// Ranked supporting sources, best first.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Set when the backend classified the question as off-topic and answered
    /// with a canned redirect instead of running retrieval.
    #[serde(rename = "isNonsense", default)]
    pub is_nonsense: bool,
}
