//! Chat thread controller.
//!
//! `ChatThread` holds the message list and the pending flag for the chatbot.
//! It knows nothing about the provider: the view opens a fragment stream via
//! the `ai` traits and feeds each fragment back through `append_fragment`,
//! so partial replies are visible as they arrive.

use time::OffsetDateTime;

use crate::ai::{CHAT_APOLOGY, GREETING};
use crate::types::{ChatMessage, Role};

#[derive(Clone, Debug, PartialEq)]
pub struct ChatThread {
    messages: Vec<ChatMessage>,
    pending: bool,
    next_id: u64,
}

impl ChatThread {
    /// A fresh thread, seeded with the fixed greeting.
    pub fn new() -> Self {
        let mut thread = Self {
            messages: Vec::new(),
            pending: false,
            next_id: 0,
        };
        thread.push(Role::Assistant, GREETING.to_string());
        thread
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a reply is being awaited or streamed; sends are blocked.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Index of the assistant message currently being streamed into.
    pub fn streaming_index(&self) -> Option<usize> {
        self.pending.then(|| self.messages.len() - 1)
    }

    /// Record a user send. Appends the user message and an empty assistant
    /// placeholder, and returns the trimmed text to hand to the provider.
    /// Returns `None` (and changes nothing) when the text trims to empty or
    /// a reply is still pending.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.pending {
            return None;
        }

        self.push(Role::User, trimmed.to_string());
        self.push(Role::Assistant, String::new());
        self.pending = true;
        Some(trimmed.to_string())
    }

    /// Append one streamed fragment to the in-progress assistant message.
    pub fn append_fragment(&mut self, piece: &str) {
        if !self.pending {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            last.text.push_str(piece);
        }
    }

    /// The stream finished cleanly; input is re-enabled.
    pub fn complete(&mut self) {
        self.pending = false;
    }

    /// The stream failed. The placeholder is overwritten with the fixed
    /// apology so the failure reads like a normal assistant message.
    pub fn fail(&mut self) {
        if !self.pending {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            last.text = CHAT_APOLOGY.to_string();
        }
        self.pending = false;
    }

    fn push(&mut self, role: Role, text: String) {
        let id = format!("msg-{}", self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            created_at: Some(OffsetDateTime::now_utc()),
        });
    }
}

impl Default for ChatThread {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_thread_starts_with_the_greeting() {
        let thread = ChatThread::new();
        assert_eq!(thread.messages().len(), 1);
        assert_eq!(thread.messages()[0].role, Role::Assistant);
        assert_eq!(thread.messages()[0].text, GREETING);
        assert!(!thread.is_pending());
    }

    #[test]
    fn empty_or_whitespace_send_is_a_noop() {
        let mut thread = ChatThread::new();
        assert!(thread.begin_send("").is_none());
        assert!(thread.begin_send("   \n\t").is_none());
        assert_eq!(thread.messages().len(), 1);
        assert!(!thread.is_pending());
    }

    #[test]
    fn send_appends_user_message_and_placeholder() {
        let mut thread = ChatThread::new();
        let outbound = thread.begin_send("  What suits a small bedroom?  ");
        assert_eq!(outbound.as_deref(), Some("What suits a small bedroom?"));

        let messages = thread.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].text, "What suits a small bedroom?");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].text, "");
        assert!(thread.is_pending());
        assert_eq!(thread.streaming_index(), Some(2));
    }

    #[test]
    fn send_while_pending_is_blocked() {
        let mut thread = ChatThread::new();
        thread.begin_send("first").expect("first send");
        assert!(thread.begin_send("second").is_none());
        assert_eq!(thread.messages().len(), 3);
    }

    #[test]
    fn fragments_accumulate_in_arrival_order() {
        let mut thread = ChatThread::new();
        thread.begin_send("hi").expect("send");

        thread.append_fragment("Hel");
        assert_eq!(thread.messages().last().unwrap().text, "Hel");
        thread.append_fragment("lo!");
        assert_eq!(thread.messages().last().unwrap().text, "Hello!");

        thread.complete();
        assert!(!thread.is_pending());
        assert_eq!(thread.messages().last().unwrap().text, "Hello!");
    }

    #[test]
    fn mid_stream_failure_overwrites_with_the_apology() {
        let mut thread = ChatThread::new();
        thread.begin_send("hi").expect("send");
        thread.append_fragment("partial rep");

        thread.fail();
        assert_eq!(thread.messages().last().unwrap().text, CHAT_APOLOGY);
        assert!(!thread.is_pending());

        // Input is usable again right away.
        assert!(thread.begin_send("again").is_some());
    }

    #[test]
    fn message_ids_are_unique() {
        let mut thread = ChatThread::new();
        thread.begin_send("one").expect("send");
        thread.complete();
        thread.begin_send("two").expect("send");

        let mut ids: Vec<_> = thread.messages().iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), thread.messages().len());
    }
}
