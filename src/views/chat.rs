use crate::api::BackendClient;
use crate::config::ClientConfig;
use crate::conversation::Conversation;
use crate::session::SessionTracker;
use crate::transcribe::{Debouncer, FragmentFilter, TranscriptionFeed};
use crate::types::{ChatMessage, ChatSummary, Role};
use crate::views::shared::{ConfirmDialog, markdown_to_html};
use dioxus::events::Key;
use dioxus::prelude::*;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tokio::sync::mpsc::unbounded_channel;

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

const MIC_OFF_STATUS: &str = "Mic is OFF";
const MIC_ON_STATUS: &str = "Mic is ON and streaming...";
const MIC_ERROR_STATUS: &str = "Mic error";

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Bot => "bot",
    }
}

#[component]
pub fn ChatView(
    tracker: Signal<SessionTracker>,
    conversation: Signal<Conversation>,
    documents: Signal<Vec<String>>,
    history: Signal<Vec<ChatSummary>>,
) -> Element {
    let mut input = use_signal(String::new);
    let feed = use_signal(TranscriptionFeed::new);
    let mic_status = use_signal(|| MIC_OFF_STATUS.to_string());
    let pending_delete = use_signal(|| Option::<String>::None);

    let refresh_history = {
        let mut history = history;
        move || {
            spawn(async move {
                let client = BackendClient::from_env();
                match client.list_sessions().await {
                    Ok(sessions) => history.set(sessions),
                    Err(err) => tracing::error!("failed loading chats: {err}"),
                }
            });
        }
    };

    let send_message = {
        let mut conversation = conversation;
        let mut input_signal = input;
        move |text: String| {
            let question = conversation.with_mut(|convo| convo.begin_ask(&text));
            let Some(question) = question else { return };
            input_signal.set(String::new());

            let session_id = tracker.with(|t| t.active().to_string());
            spawn(async move {
                let client = BackendClient::from_env();
                match client.ask(&question, &session_id).await {
                    Ok(response) => {
                        conversation.with_mut(|convo| convo.settle_with_answer(response));
                    }
                    Err(err) => {
                        tracing::error!("ask failed: {err}");
                        conversation.with_mut(|convo| convo.settle_with_error());
                    }
                }
            });
        }
    };

    let switch_session = {
        let mut tracker = tracker;
        let mut conversation = conversation;
        let mut documents = documents;
        move |id: String| {
            tracker.with_mut(|t| t.switch(id.clone()));
            conversation.with_mut(|convo| convo.clear());
            spawn(async move {
                let client = BackendClient::from_env();
                match client.load_session(&id).await {
                    Ok(messages) => {
                        conversation.with_mut(|convo| convo.replace_all(messages));
                    }
                    Err(err) => tracing::error!("failed loading chat {id}: {err}"),
                }
                match client.list_documents(&id).await {
                    Ok(names) => documents.set(names),
                    Err(err) => tracing::error!("failed loading documents for {id}: {err}"),
                }
            });
        }
    };

    let start_new_chat = {
        let mut tracker = tracker;
        let mut conversation = conversation;
        let mut documents = documents;
        let mut refresh_history = refresh_history;
        move |_| {
            tracker.with_mut(|t| {
                t.start_new();
            });
            conversation.with_mut(|convo| convo.reset_with_greeting());
            documents.set(Vec::new());
            refresh_history();
        }
    };

    let toggle_mic = {
        let mut feed = feed;
        let mut mic_status = mic_status;
        let mut input = input;
        let mut send_message_again = send_message;
        move |_| {
            if feed.with(|f| f.is_streaming()) {
                feed.with_mut(|f| f.stop());
                mic_status.set(MIC_OFF_STATUS.to_string());

                // Give a final debounced fragment a chance to land, then
                // hand the input to the ask pipeline.
                let grace = ClientConfig::from_env().submit_grace;
                spawn(async move {
                    if !grace.is_zero() {
                        tokio::time::sleep(grace).await;
                    }
                    let text = input();
                    if !text.trim().is_empty() && !conversation.with(|c| c.in_flight()) {
                        send_message_again(text);
                    }
                });
                return;
            }

            spawn(async move {
                let config = ClientConfig::from_env();
                let (fragment_tx, mut fragment_rx) = unbounded_channel::<String>();
                match feed.with_mut(|f| f.start(&config, fragment_tx)) {
                    Ok(()) => mic_status.set(MIC_ON_STATUS.to_string()),
                    Err(err) => {
                        tracing::error!("mic capture unavailable: {err:#}");
                        mic_status.set(MIC_ERROR_STATUS.to_string());
                        return;
                    }
                }

                let mut filter = FragmentFilter::new();
                let (debounced_tx, mut debounced_rx) = unbounded_channel::<String>();
                let mut debouncer = Debouncer::new(config.debounce, debounced_tx);
                loop {
                    tokio::select! {
                        fragment = fragment_rx.recv() => match fragment {
                            Some(raw) => {
                                if let Some(text) = filter.accept(&raw) {
                                    debouncer.schedule(text);
                                }
                            }
                            None => break,
                        },
                        Some(text) = debounced_rx.recv() => input.set(text),
                    }
                }
                // The feed just stopped; let an armed fragment land.
                if let Some(task) = debouncer.take_pending() {
                    let _ = task.await;
                }
                while let Ok(text) = debounced_rx.try_recv() {
                    input.set(text);
                }
            });
        }
    };

    let confirm_delete = {
        let mut tracker = tracker;
        let mut conversation = conversation;
        let mut documents = documents;
        let mut pending_delete = pending_delete;
        let mut refresh_history = refresh_history;
        move |_| {
            let Some(id) = pending_delete() else { return };
            pending_delete.set(None);
            spawn(async move {
                let client = BackendClient::from_env();
                match client.delete_session(&id).await {
                    Ok(()) => {
                        let was_active = tracker.with(|t| t.active() == id);
                        if was_active {
                            tracker.with_mut(|t| {
                                t.start_new();
                            });
                            conversation.with_mut(|convo| convo.reset_with_greeting());
                            documents.set(Vec::new());
                        }
                    }
                    Err(err) => tracing::error!("failed deleting chat {id}: {err}"),
                }
                refresh_history();
            });
        }
    };

    let messages_snapshot: Vec<ChatMessage> =
        conversation.with(|convo| convo.messages().to_vec());
    let awaiting_reply = conversation.with(|convo| convo.awaiting_reply());
    let in_flight = conversation.with(|convo| convo.in_flight());
    let history_snapshot = history();
    let active_session = tracker.with(|t| t.active().to_string());
    let mic_streaming = feed.with(|f| f.is_streaming());

    rsx! {
        div { class: "main-container",
            aside { class: "history-panel",
                div { class: "history-header",
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: start_new_chat,
                        "New Chat"
                    }
                    span { class: "session-caption", title: "Active session", "{active_session}" }
                }
                div { class: "history-list",
                    if history_snapshot.is_empty() {
                        p { class: "text-muted", "No chats yet." }
                    }
                    for chat in history_snapshot.iter().cloned() {
                        div {
                            key: "{chat.session_id}",
                            class: format_args!(
                                "history-row {}",
                                if chat.session_id == active_session { "active" } else { "" }
                            ),
                            onclick: {
                                let mut switch_session = switch_session;
                                let id = chat.session_id.clone();
                                move |_| switch_session(id.clone())
                            },
                            span { class: "history-label", "{chat.label()}" }
                            button {
                                class: "history-delete",
                                r#type: "button",
                                title: "Delete chat",
                                onclick: {
                                    let mut pending_delete = pending_delete;
                                    let id = chat.session_id.clone();
                                    move |evt| {
                                        evt.stop_propagation();
                                        pending_delete.set(Some(id.clone()));
                                    }
                                },
                                "✕"
                            }
                        }
                    }
                }
            }

            div { class: "chat-wrap",
                div { id: "chat-list", class: "chat-list",
                    for (i, msg) in messages_snapshot.iter().enumerate() {
                        div { key: "{i}", class: format_args!("message-row {}", role_class(msg.role)),
                            if msg.role == Role::Bot { div { class: "avatar bot", "S" } }
                            div { class: "message-stack",
                                div { class: format_args!("bubble {}", role_class(msg.role)),
                                    if msg.role == Role::Bot {
                                        BotBubble { text: msg.text.clone() }
                                    } else { "{msg.text}" }
                                }
                                if let Some(ts) = format_message_timestamp(msg.received_at) {
                                    div { class: format_args!(
                                            "message-meta {}",
                                            match msg.role { Role::User => "align-end", Role::Bot => "align-start" }
                                        ),
                                        span { class: "message-timestamp", "{ts}" }
                                    }
                                }
                            }
                        }
                    }
                    if awaiting_reply {
                        div { class: "message-row bot typing-indicator",
                            div { class: "avatar bot", "S" }
                            div { class: "shimmer-line",
                                span { class: "shimmer-text", "Thinking…" }
                            }
                        }
                    }
                }

                form { class: "composer no-divider",
                    div { class: "composer-inner",
                        div { class: "hstack", style: "gap: 0.5rem; width: 100%; align-items: flex-end;",
                            textarea {
                                class: "", rows: "1", placeholder: "Ask about your documents",
                                value: "{input}", oninput: move |ev| input.set(ev.value()),
                                onkeydown: {
                                    let mut send_message = send_message;
                                    move |ev| {
                                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                            ev.prevent_default();
                                            let text = input();
                                            send_message(text);
                                        }
                                    }
                                },
                                disabled: in_flight, autofocus: true,
                            }
                            button {
                                class: "btn btn-primary", r#type: "button",
                                disabled: in_flight || input().trim().is_empty(),
                                onclick: {
                                    let mut send_message = send_message;
                                    move |_| {
                                        let text = input();
                                        send_message(text);
                                    }
                                },
                                "Send"
                            }
                            button {
                                class: format_args!(
                                    "btn btn-mic {}",
                                    if mic_streaming { "recording" } else { "" }
                                ),
                                r#type: "button",
                                title: "Toggle microphone",
                                onclick: toggle_mic,
                                if mic_streaming { "Stop Mic" } else { "Mic" }
                            }
                        }
                        div { class: "mic-status", "{mic_status}" }
                    }
                }
            }
        }

        if let Some(id) = pending_delete() {
            ConfirmDialog {
                message: format!("Delete chat {id}? This cannot be undone."),
                confirm_label: "Delete",
                on_confirm: confirm_delete,
                on_cancel: move |_| {
                    let mut pending_delete = pending_delete;
                    pending_delete.set(None);
                },
            }
        }
    }
}

#[component]
fn BotBubble(text: String) -> Element {
    let content_html = markdown_to_html(&text);
    let copy_payload = text.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(feature = "desktop")]
            {
                if let Ok(mut cb) = arboard::Clipboard::new() {
                    let _ = cb.set_text(raw);
                }
            }
            #[cfg(not(feature = "desktop"))]
            let _ = raw;
        });
    };

    rsx! {
        div { class: "bubble-controls",
            div { class: "actions",
                button { class: "action-btn", title: "Copy", onclick: on_copy, "Copy" }
            }
        }
        div { class: "md", dangerous_inner_html: "{content_html}" }
    }
}
