//! Bounded conversation window for interactive chat

use super::message::ConversationMessage;

/// Default number of messages kept in a chat session
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Rolling conversation history.
///
/// When the window overflows, the oldest user/assistant pair is evicted as a
/// unit so the retained history never opens with an orphaned assistant turn
/// (providers reject that shape).
#[derive(Debug, Clone)]
pub struct Session {
    max_history: usize,
    messages: Vec<ConversationMessage>,
}

impl Session {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            messages: Vec::new(),
        }
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.push(ConversationMessage::user(content));
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.push(ConversationMessage::assistant(content));
    }

    /// Snapshot of the current history
    pub fn history(&self) -> Vec<ConversationMessage> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        while self.messages.len() > self.max_history {
            let evict = self.messages.len().min(2);
            self.messages.drain(..evict);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_session_keeps_messages_in_order() {
        let mut session = Session::new(10);
        session.add_user("q1");
        session.add_assistant("a1");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "a1");
    }

    #[test]
    fn test_session_evicts_pairs() {
        let mut session = Session::new(4);
        for i in 0..3 {
            session.add_user(format!("q{i}"));
            session.add_assistant(format!("a{i}"));
        }

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[0].role, Role::User);
    }

    #[test]
    fn test_session_odd_window_never_starts_with_assistant() {
        let mut session = Session::new(3);
        session.add_user("q0");
        session.add_assistant("a0");
        session.add_user("q1");
        session.add_assistant("a1");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "q1");
    }

    #[test]
    fn test_session_clear() {
        let mut session = Session::default();
        session.add_user("hello");
        session.clear();
        assert!(session.is_empty());
    }
}
