//! Transcript entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::Source;

/// Shown in place of an answer when the backend call fails.
pub const APOLOGY: &str =
    "Sorry, I encountered an error processing your question. Please try again.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions.
    User,
    /// Agy, answering from the portfolio.
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Opaque unique message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry in the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    sources: Vec<Source>,
    off_topic: bool,
    created_at: DateTime<Utc>,
}

impl Message {
    /// A question typed (or picked) by the user.
    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new(), false)
    }

    /// An answer from the backend.
    pub(crate) fn assistant(content: impl Into<String>, sources: Vec<Source>, off_topic: bool) -> Self {
        Self::new(Role::Assistant, content.into(), sources, off_topic)
    }

    /// The fixed reply used when the backend call fails.
    pub(crate) fn apology() -> Self {
        Self::assistant(APOLOGY, Vec::new(), false)
    }

    fn new(role: Role, content: String, sources: Vec<Source>, off_topic: bool) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            sources,
            off_topic,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// All sources returned with the answer, best first.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Whether the backend flagged the question as off-topic.
    #[must_use]
    pub fn is_off_topic(&self) -> bool {
        self.off_topic
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
