//! MattGPT
//!
//! A chat front end for asking questions about a portfolio of case studies.
//! Answers and ranked sources come from an external retrieval backend; this
//! crate serves the page, owns each visitor's conversation, and renders it.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server; HTMX actions plus SSE for live updates
//! - **Conversation**: per-session transcript and the question/answer cycle
//! - **Rendering**: pure server-side HTML for messages, sources and indicator
//! - **Backend client**: one `POST /ask` call per question
//!
//! # Modules
//!
//! - [`api`]: backend client and wire types
//! - [`conversation`]: transcript ownership and state machine
//! - [`render`]: HTML rendering
//! - [`session`]: per-browser session storage
//! - [`server`]: router and handlers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod conversation;
pub mod render;
pub mod resilience;
pub mod server;
pub mod session;
pub mod telemetry;

use std::sync::Arc;

use crate::api::AskClient;
use crate::config::AppConfig;
use crate::resilience::AppRateLimiter;
use crate::session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active browser sessions.
    pub sessions: SessionStore,
    /// Backend answering questions.
    pub client: Arc<dyn AskClient>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<AppRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, client: Arc<dyn AskClient>) -> Self {
        Self {
            sessions: SessionStore::new(),
            client,
            rate_limiter: Arc::new(resilience::rate_limiter(&config.resilience)),
            config,
        }
    }
}
