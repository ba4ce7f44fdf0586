//! Client for the external retrieval backend.
//!
//! The backend exposes a single endpoint, `POST {base}/ask`, which takes a
//! question and returns an answer with ranked sources. Everything about
//! retrieval and generation happens on the other side of that call.
//!
//! - [`AskClient`]: the seam the conversation controller talks to
//! - [`HttpAskClient`]: reqwest implementation
//! - [`AskError`]: failure of a single call

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::{DEFAULT_API_BASE_URL, HttpAskClient};
pub use error::{AskError, Result};
pub use types::{AskRequest, AskResponse, Source};

/// Something that can answer a question about the portfolio.
#[async_trait]
pub trait AskClient: Send + Sync {
    /// Ask one question. `query` must be non-empty after trimming.
    async fn ask(&self, query: &str) -> Result<AskResponse>;
}
