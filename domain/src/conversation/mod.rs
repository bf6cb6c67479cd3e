//! Conversation domain
//!
//! Messages exchanged with brains and the bounded session window that
//! feeds them back as history.

pub mod message;
pub mod session;

pub use message::{ConversationMessage, Role};
pub use session::{DEFAULT_HISTORY_WINDOW, Session};
