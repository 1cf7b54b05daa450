//! UI-agnostic conversation state.
//!
//! The chat log is an explicit, owned, append-only structure passed by
//! reference to the rendering layer; there is no hidden singleton. Messages
//! are immutable once appended. Outbound requests take a sequence number so
//! that a reply arriving after a newer request was issued can be recognized
//! as stale and dropped instead of landing out of order in the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message in the conversation with the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// The role of a chat message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only chat log plus the request bookkeeping around it.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
    conversation_id: Option<String>,
    pending: Option<u64>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The backend's continuation token, once the first reply arrived.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn set_conversation_id(&mut self, id: String) {
        self.conversation_id = Some(id);
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::User, text.into())
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::Assistant, text.into())
    }

    fn push(&mut self, role: ChatRole, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            timestamp: Utc::now(),
        });
        id
    }

    /// Claim a sequence number for an outbound request. Any previously
    /// outstanding request becomes stale.
    pub fn begin_request(&mut self) -> u64 {
        let seq = self.next_id;
        self.next_id += 1;
        self.pending = Some(seq);
        seq
    }

    pub fn request_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Append the reply for request `seq`. Returns false and appends nothing
    /// if a newer request superseded it.
    pub fn complete_request(&mut self, seq: u64, text: impl Into<String>) -> bool {
        if self.pending != Some(seq) {
            return false;
        }
        self.pending = None;
        self.push_assistant(text);
        true
    }

    /// Surface a failed request as an assistant-side error line, subject to
    /// the same staleness rule as a success.
    pub fn fail_request(&mut self, seq: u64, error: &str) -> bool {
        self.complete_request(seq, format!("Request failed: {}", error))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut conversation = Conversation::new();
        let a = conversation.push_user("first");
        let b = conversation.push_assistant("second");
        let c = conversation.push_user("third");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_complete_request_appends_reply() {
        let mut conversation = Conversation::new();
        conversation.push_user("what is the fit score?");
        let seq = conversation.begin_request();
        assert!(conversation.request_pending());

        assert!(conversation.complete_request(seq, "Fit Score: 85"));
        assert!(!conversation.request_pending());
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut conversation = Conversation::new();
        let first = conversation.begin_request();
        let second = conversation.begin_request();

        // The reply to the first request arrives after the second was issued
        assert!(!conversation.complete_request(first, "stale"));
        assert!(conversation.messages().is_empty());

        assert!(conversation.complete_request(second, "current"));
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].text, "current");
    }

    #[test]
    fn test_failure_respects_staleness() {
        let mut conversation = Conversation::new();
        let first = conversation.begin_request();
        let _second = conversation.begin_request();

        assert!(!conversation.fail_request(first, "timed out"));
        assert!(conversation.messages().is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        conversation.set_conversation_id("abc".to_string());
        conversation.begin_request();

        conversation.clear();
        assert!(conversation.is_empty());
        assert!(conversation.conversation_id().is_none());
        assert!(!conversation.request_pending());
    }
}
