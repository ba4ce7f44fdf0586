//! Conversation state and the question/answer cycle.
//!
//! # Architecture
//!
//! - [`ConversationController`]: owns the transcript and the thinking flag
//! - [`Message`]: immutable transcript entry
//! - [`SUGGESTIONS`]: example questions for the landing view
//!
//! A question moves Idle -> Waiting -> Idle. While Waiting, further submits
//! are refused, so at most one backend call is outstanding per conversation.
//!
//! # Example
//!
//! ```rust
//! use mattgpt::api::{AskError, AskResponse};
//! use mattgpt::conversation::ConversationController;
//!
//! let mut convo = ConversationController::new();
//! let pending = convo.begin("How did Matt scale engineering teams?").unwrap();
//! assert!(convo.state().is_thinking());
//!
//! convo.settle(pending, Err(AskError::Status { status: 502 }));
//! assert!(!convo.state().is_thinking());
//! assert_eq!(convo.state().messages().len(), 2);
//! ```

mod controller;
mod message;
mod suggestions;

pub use controller::{ConversationController, ConversationState, PendingQuestion, SubmitError};
pub use message::{APOLOGY, Message, MessageId, Role};
pub use suggestions::{SUGGESTIONS, suggestion};
