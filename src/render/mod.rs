//! Server-side HTML rendering.
//!
//! Every function here is a pure function of its arguments: it reads the
//! conversation state and returns markup, never touching the state itself.
//! HTMX swaps the output into the page.
//!
//! # Structure
//!
//! - [`page`]: full document for a new session
//! - [`panel`]: transcript (or landing view) plus composer, re-sent on every change
//! - [`message`] / [`source_card`]: one transcript row and its citations

mod chat;
mod html;
mod message;

pub use chat::{TRANSCRIPT_END_ID, composer, landing, page, panel, thinking_indicator, transcript};
pub use html::{escape, html_shell};
pub use message::{MAX_RENDERED_SOURCES, format_score, message, source_card};
