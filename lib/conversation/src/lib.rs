//! Conversation state for the wayfarer recommendation service.
//!
//! This crate provides:
//!
//! - **Transcript**: the append-only record of what the user asked for
//! - **Conversation Session**: per-conversation search state
//! - **Session Store**: token-keyed sessions with per-session turn
//!   serialization and idle expiry

pub mod error;
pub mod session;
pub mod store;
pub mod transcript;

pub use error::SessionError;
pub use session::ConversationSession;
pub use store::{SessionGuard, SessionStore};
pub use transcript::{Transcript, TranscriptEntry};
