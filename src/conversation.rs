//! Transcript state and the ask-pipeline latch.
//!
//! One `Conversation` per page, replaced wholesale on session switch. The
//! ask cycle is `begin_ask` → exactly one backend exchange → one of the
//! settle calls; both settle paths drop the pending indicator and lower the
//! in-flight guard, so a failure never wedges the composer.

use crate::types::{ChatMessage, Role};

/// Bot text substituted when the backend answers without a usable response.
pub const NO_RESPONSE_FALLBACK: &str = "No response.";
/// Bot text appended when the exchange fails outright.
pub const BACKEND_ERROR_MESSAGE: &str = "Error connecting to backend.";
/// Synthetic local greeting appended when a fresh chat starts.
pub const NEW_CHAT_GREETING: &str = "New chat started. Ask your question!";

#[derive(Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    in_flight: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a typing indicator should be visible.
    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// True while an ask is outstanding; composer controls disable off this.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start an ask cycle. Appends the user message and raises the guard,
    /// returning the trimmed question. `None` means no-op: the text was
    /// empty after trimming, or an ask is already outstanding.
    pub fn begin_ask(&mut self, raw: &str) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let question = raw.trim();
        if question.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(question));
        self.in_flight = true;
        self.awaiting_reply = true;
        Some(question.to_string())
    }

    /// Settle the outstanding ask with the backend's answer. An absent or
    /// empty response field becomes [`NO_RESPONSE_FALLBACK`].
    pub fn settle_with_answer(&mut self, response: Option<String>) {
        let text = match response {
            Some(text) if !text.trim().is_empty() => text,
            _ => NO_RESPONSE_FALLBACK.to_string(),
        };
        self.settle(text);
    }

    /// Settle the outstanding ask after a transport or status failure.
    pub fn settle_with_error(&mut self) {
        self.settle(BACKEND_ERROR_MESSAGE.to_string());
    }

    fn settle(&mut self, text: String) {
        self.awaiting_reply = false;
        self.messages.push(ChatMessage::bot(text));
        self.in_flight = false;
    }

    /// Drop all messages (session switch, before the reload lands).
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replace the transcript wholesale with reloaded history.
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Reset to the single synthetic greeting of a fresh chat.
    pub fn reset_with_greeting(&mut self) {
        self.messages.clear();
        self.messages.push(ChatMessage::bot(NEW_CHAT_GREETING));
    }

    /// Count of messages with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
