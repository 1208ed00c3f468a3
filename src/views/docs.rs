use crate::api::{ApiError, BackendClient};
use crate::session::SessionTracker;
use dioxus::events::FormEvent;
use dioxus::prelude::*;

const UPLOAD_FAILED_STATUS: &str = "Upload failed.";
const DOCS_LOAD_ERROR: &str = "Failed to load documents.";

#[component]
pub fn DocsView(tracker: Signal<SessionTracker>, documents: Signal<Vec<String>>) -> Element {
    let upload_status = use_signal(String::new);
    let load_failed = use_signal(|| false);

    let refresh_documents = {
        let mut documents = documents;
        let mut load_failed = load_failed;
        move || {
            let session_id = tracker.with(|t| t.active().to_string());
            spawn(async move {
                let client = BackendClient::from_env();
                match client.list_documents(&session_id).await {
                    Ok(names) => {
                        documents.set(names);
                        load_failed.set(false);
                    }
                    Err(err) => {
                        tracing::error!("failed loading documents: {err}");
                        load_failed.set(true);
                    }
                }
            });
        }
    };

    let upload_file = {
        let mut upload_status = upload_status;
        let mut refresh_documents = refresh_documents;
        move |evt: FormEvent| {
            let Some(file_engine) = evt.files() else { return };
            let Some(name) = file_engine.files().first().cloned() else {
                return;
            };
            let session_id = tracker.with(|t| t.active().to_string());
            spawn(async move {
                let Some(bytes) = file_engine.read_file(&name).await else {
                    upload_status.set(UPLOAD_FAILED_STATUS.to_string());
                    return;
                };
                let client = BackendClient::from_env();
                match client.upload_document(&name, bytes, &session_id).await {
                    Ok(status) => {
                        upload_status
                            .set(status.unwrap_or_else(|| UPLOAD_FAILED_STATUS.to_string()));
                        refresh_documents();
                    }
                    Err(err) => {
                        tracing::error!("upload failed: {err}");
                        let status = match &err {
                            ApiError::Status { .. } => err
                                .detail()
                                .unwrap_or(UPLOAD_FAILED_STATUS)
                                .to_string(),
                            ApiError::Transport(_) => UPLOAD_FAILED_STATUS.to_string(),
                        };
                        upload_status.set(status);
                    }
                }
            });
        }
    };

    let delete_document = {
        let mut refresh_documents = refresh_documents;
        move |name: String| {
            let session_id = tracker.with(|t| t.active().to_string());
            spawn(async move {
                let client = BackendClient::from_env();
                match client.delete_document(&session_id, &name).await {
                    Ok(()) => refresh_documents(),
                    // Prior list stays as-is; nothing surfaced.
                    Err(err) => tracing::warn!("failed deleting document {name}: {err}"),
                }
            });
        }
    };

    let docs_snapshot = documents();
    let status_line = upload_status();

    rsx! {
        div { class: "main-container",
            div { class: "upload-controls",
                label { class: "control-label", for: "doc-upload", "Add a document" }
                input {
                    id: "doc-upload",
                    r#type: "file",
                    onchange: upload_file,
                }
                if !status_line.is_empty() {
                    p { class: "upload-status", "{status_line}" }
                }
            }
            if load_failed() {
                p { class: "text-muted doc-error", "{DOCS_LOAD_ERROR}" }
            } else if docs_snapshot.is_empty() {
                p { class: "text-muted", "No documents in this chat yet. Upload one to ask about it." }
            } else {
                div { class: "doc-table",
                    div { class: "doc-table-header",
                        span { class: "doc-col-title", "Name" }
                        span { class: "doc-col-actions", "" }
                    }
                    div { class: "doc-table-body",
                        for name in docs_snapshot.iter().cloned() {
                            div {
                                key: "{name}",
                                class: "doc-row",
                                span { class: "doc-row-title", "{name}" }
                                button {
                                    class: "doc-delete btn-ghost",
                                    r#type: "button",
                                    title: "Delete document",
                                    onclick: {
                                        let mut delete_document = delete_document;
                                        let name = name.clone();
                                        move |_| delete_document(name.clone())
                                    },
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
