//! Browser session management.
//!
//! Each page load gets its own session, identified by UUID, holding one
//! conversation. Nothing is persisted: reloading the page starts over, and
//! idle sessions are swept after a timeout.
//!
//! # Architecture
//!
//! - [`Session`]: one browser session and its conversation
//! - [`SessionStore`]: thread-safe store for all active sessions
//!
//! # Example
//!
//! ```rust
//! use mattgpt::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! assert!(store.get(session.id()).is_some());
//! ```

mod store;

pub use store::{DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
