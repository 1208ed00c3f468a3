use crate::api::BackendClient;
use crate::conversation::Conversation;
use crate::session::SessionTracker;
use crate::types::ChatSummary;
use crate::views::{ChatView, DocsView};
use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppTab {
    Chat,
    Documents,
}

#[component]
pub fn App() -> Element {
    let tracker = use_signal(SessionTracker::restore);
    let conversation = use_signal(Conversation::new);
    let documents = use_signal(Vec::<String>::new);
    let history = use_signal(Vec::<ChatSummary>::new);
    let active_tab = use_signal(|| AppTab::Chat);

    use_initial_load(tracker, documents, history);

    rsx! {
        AppHeader { active_tab }
        TabPanels {
            active_tab,
            tracker,
            conversation,
            documents,
            history,
        }
    }
}

/// Page-load behavior: fetch the history list and the active session's
/// documents. The transcript stays empty until a session is selected.
fn use_initial_load(
    tracker: Signal<SessionTracker>,
    mut documents: Signal<Vec<String>>,
    mut history: Signal<Vec<ChatSummary>>,
) {
    use_hook(|| {
        let session_id = tracker.peek().active().to_string();
        spawn(async move {
            let client = BackendClient::from_env();
            match client.list_sessions().await {
                Ok(sessions) => history.set(sessions),
                Err(err) => tracing::error!("failed loading chats: {err}"),
            }
            match client.list_documents(&session_id).await {
                Ok(names) => documents.set(names),
                Err(err) => tracing::error!("failed loading documents: {err}"),
            }
        });
    });
}

#[component]
fn AppHeader(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                h1 { class: "wordmark", "Starling" }
                TabNavigation { active_tab }
            }
        }
    }
}

#[component]
fn TabPanels(
    active_tab: Signal<AppTab>,
    tracker: Signal<SessionTracker>,
    conversation: Signal<Conversation>,
    documents: Signal<Vec<String>>,
    history: Signal<Vec<ChatSummary>>,
) -> Element {
    rsx! {
        div { class: "tab-panels",
            TabPanel {
                active_tab,
                tab: AppTab::Chat,
                children: rsx!( ChatView { tracker, conversation, documents, history } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Documents,
                children: rsx!( DocsView { tracker, documents } ),
            }
        }
    }
}

#[component]
fn TabPanel(active_tab: Signal<AppTab>, tab: AppTab, children: Element) -> Element {
    let is_active = active_tab() == tab;
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            class: format_args!("tab-panel {}", class_suffix),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}

#[component]
fn TabNavigation(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "tabs",
            TabButton { active_tab, tab: AppTab::Chat, label: "Chat" }
            TabButton { active_tab, tab: AppTab::Documents, label: "Documents" }
        }
    }
}

#[component]
fn TabButton(active_tab: Signal<AppTab>, tab: AppTab, label: &'static str) -> Element {
    let mut active_tab = active_tab;
    let class = if active_tab() == tab {
        "tab active"
    } else {
        "tab"
    };
    rsx! {
        h1 {
            class: class,
            onclick: move |_| active_tab.set(tab),
            "{label}"
        }
    }
}
