use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One turn of a session transcript. `role` and `text` are the wire shape
/// the backend speaks; `received_at` is stamped locally when a message is
/// appended in this client and is absent on reloaded history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(skip)]
    pub received_at: Option<OffsetDateTime>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            received_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            received_at: Some(OffsetDateTime::now_utc()),
        }
    }
}

/// One row of the `/chats` listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub session_id: String,
    #[serde(default)]
    pub preview: Option<String>,
}

impl ChatSummary {
    /// Label shown in the history list: the preview when the backend has
    /// one, otherwise the raw session id.
    pub fn label(&self) -> &str {
        match self.preview.as_deref() {
            Some(preview) if !preview.is_empty() => preview,
            _ => &self.session_id,
        }
    }
}
