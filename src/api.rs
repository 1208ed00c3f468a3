//! HTTP client for the chat backend.
//!
//! Every collaborator the client talks to over HTTP lives here: the ask
//! exchange, document upload/list/delete, and the session list/load/delete
//! calls. One request per operation, no retries; callers map failures to
//! their fixed user-visible literals.

use crate::config::ClientConfig;
use crate::types::{ChatMessage, ChatSummary};
use reqwest::StatusCode;
use reqwest::multipart;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}")]
    Status {
        status: StatusCode,
        /// Structured `detail` field from the error body, when present.
        detail: Option<String>,
    },
}

impl ApiError {
    /// The collaborator-provided detail message, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Transport(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct SessionTranscript {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// Pull the `detail` field out of an error body, tolerating non-JSON bodies.
fn extract_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .filter(|detail| !detail.trim().is_empty())
}

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env().backend_url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One question/answer exchange. `None` means the backend answered
    /// without a usable `response` field.
    pub async fn ask(&self, question: &str, session_id: &str) -> ApiResult<Option<String>> {
        let form = multipart::Form::new()
            .text("question", question.to_string())
            .text("session_id", session_id.to_string());

        let response = self
            .http
            .post(self.endpoint("ask"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let parsed: AskResponse = response.json().await?;
        Ok(parsed.response)
    }

    /// Upload one document into the session. Returns the backend's status
    /// string; a non-success response carries its `detail` in the error.
    pub async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        session_id: &str,
    ) -> ApiResult<Option<String>> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new()
            .part("file", part)
            .text("session_id", session_id.to_string());

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                detail: extract_detail(&body),
            });
        }

        let parsed: UploadResponse = response.json().await?;
        Ok(parsed.status)
    }

    /// All known sessions, newest meaning is up to the backend.
    pub async fn list_sessions(&self) -> ApiResult<Vec<ChatSummary>> {
        let response = self
            .http
            .get(self.endpoint("chats"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Full transcript of one session.
    pub async fn load_session(&self, session_id: &str) -> ApiResult<Vec<ChatMessage>> {
        let response = self
            .http
            .get(self.endpoint(&format!("chat/{session_id}")))
            .send()
            .await?
            .error_for_status()?;
        let parsed: SessionTranscript = response.json().await?;
        Ok(parsed.messages)
    }

    /// Filenames of the documents attached to one session.
    pub async fn list_documents(&self, session_id: &str) -> ApiResult<Vec<String>> {
        let response = self
            .http
            .get(self.endpoint(&format!("documents/{session_id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn delete_document(&self, session_id: &str, filename: &str) -> ApiResult<()> {
        let form = multipart::Form::new()
            .text("session_id", session_id.to_string())
            .text("filename", filename.to_string());

        self.http
            .post(self.endpoint("delete_doc"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
        let form = multipart::Form::new().text("session_id", session_id.to_string());

        self.http
            .post(self.endpoint("delete_session"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint("ask"), "http://localhost:8000/ask");
        assert_eq!(
            client.endpoint("/chat/sess_1"),
            "http://localhost:8000/chat/sess_1"
        );
    }

    #[test]
    fn detail_extraction_tolerates_garbage() {
        assert_eq!(
            extract_detail(r#"{"detail": "Unsupported file type."}"#),
            Some("Unsupported file type.".to_string())
        );
        assert_eq!(extract_detail(r#"{"detail": "  "}"#), None);
        assert_eq!(extract_detail(r#"{"other": 1}"#), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
    }
}
