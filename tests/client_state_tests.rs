//! Integration tests for the client-state lifecycle
//!
//! Exercises the session/conversation/transcription core the way the view
//! layer drives it, without a backend.

use starling::conversation::{
    BACKEND_ERROR_MESSAGE, Conversation, NEW_CHAT_GREETING, NO_RESPONSE_FALLBACK,
};
use starling::session::SessionTracker;
use starling::storage;
use starling::transcribe::{Debouncer, FragmentFilter};
use starling::types::Role;

mod ask_pipeline_tests {
    use super::*;

    #[test]
    fn resolved_ask_leaves_one_user_and_one_bot_message() {
        let mut convo = Conversation::new();

        assert!(convo.begin_ask("what does the contract say?").is_some());
        assert_eq!(convo.count_role(Role::User), 1);
        assert_eq!(convo.count_role(Role::Bot), 0);
        assert!(convo.awaiting_reply(), "indicator must show while pending");

        convo.settle_with_answer(Some("Clause 4 covers termination.".into()));
        assert_eq!(convo.count_role(Role::User), 1);
        assert_eq!(convo.count_role(Role::Bot), 1);
        assert!(!convo.awaiting_reply(), "indicator must be gone after settle");
    }

    #[test]
    fn failed_ask_also_leaves_one_bot_message() {
        let mut convo = Conversation::new();
        convo.begin_ask("anything");
        convo.settle_with_error();

        assert_eq!(convo.count_role(Role::Bot), 1);
        assert_eq!(convo.messages().last().unwrap().text, BACKEND_ERROR_MESSAGE);
        assert!(!convo.awaiting_reply());
        assert!(!convo.in_flight());
    }

    #[test]
    fn whitespace_question_is_a_complete_noop() {
        let mut convo = Conversation::new();
        assert!(convo.begin_ask("").is_none());
        assert!(convo.begin_ask("   \t\n").is_none());
        assert!(convo.messages().is_empty());
        assert!(!convo.awaiting_reply());
    }

    #[test]
    fn second_ask_before_resolution_is_suppressed() {
        let mut convo = Conversation::new();
        assert!(convo.begin_ask("first question").is_some());
        assert!(convo.begin_ask("second question").is_none());
        assert_eq!(convo.count_role(Role::User), 1);

        convo.settle_with_answer(None);
        assert_eq!(convo.messages().last().unwrap().text, NO_RESPONSE_FALLBACK);
        assert!(convo.begin_ask("second question").is_some());
    }
}

mod session_tests {
    use super::*;

    #[test]
    fn switching_sessions_replaces_the_transcript_wholesale() {
        let key = "it_session_switch";
        storage::delete(key).expect("cleanup failed");

        let mut tracker = SessionTracker::restore_scoped(key);
        let mut convo = Conversation::new();
        convo.begin_ask("old question");
        convo.settle_with_answer(Some("old answer".into()));

        tracker.switch("sess_other");
        convo.clear();
        convo.replace_all(vec![
            starling::types::ChatMessage::user("restored question"),
            starling::types::ChatMessage::bot("restored answer"),
        ]);

        assert_eq!(tracker.active(), "sess_other");
        assert_eq!(convo.messages().len(), 2);
        assert!(
            convo
                .messages()
                .iter()
                .all(|m| m.text.starts_with("restored")),
            "no message from the previous session may remain"
        );

        storage::delete(key).expect("cleanup failed");
    }

    #[test]
    fn deleting_the_active_session_starts_fresh_with_greeting() {
        let key = "it_session_delete_active";
        storage::delete(key).expect("cleanup failed");

        let mut tracker = SessionTracker::restore_scoped(key);
        let mut convo = Conversation::new();
        convo.begin_ask("doomed question");
        convo.settle_with_answer(Some("doomed answer".into()));
        let doomed = tracker.active().to_string();

        // Accept path of the confirm dialog, active id case.
        std::thread::sleep(std::time::Duration::from_millis(2));
        tracker.start_new();
        convo.reset_with_greeting();

        assert_ne!(tracker.active(), doomed);
        assert_eq!(convo.messages().len(), 1);
        assert_eq!(convo.messages()[0].role, Role::Bot);
        assert_eq!(convo.messages()[0].text, NEW_CHAT_GREETING);

        storage::delete(key).expect("cleanup failed");
    }

    #[test]
    fn cancelled_delete_changes_nothing() {
        let key = "it_session_delete_cancel";
        storage::delete(key).expect("cleanup failed");

        let mut tracker = SessionTracker::restore_scoped(key);
        let before = tracker.active().to_string();
        let mut convo = Conversation::new();
        convo.begin_ask("kept question");
        convo.settle_with_answer(Some("kept answer".into()));

        // Cancel path: no delete request, no state mutation.
        assert_eq!(tracker.active(), before);
        assert_eq!(convo.messages().len(), 2);

        storage::delete(key).expect("cleanup failed");
    }
}

mod transcription_tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn fragment_burst_updates_input_once_with_the_latest() {
        let (debounced_tx, mut debounced_rx) = unbounded_channel();
        let mut filter = FragmentFilter::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), debounced_tx);
        let started = Instant::now();

        for (at_ms, fragment) in [(0u64, "a"), (100, "ab"), (150, "abc")] {
            sleep(Duration::from_millis(at_ms) - started.elapsed()).await;
            if let Some(text) = filter.accept(fragment) {
                debouncer.schedule(text);
            }
        }

        let delivered = debounced_rx.recv().await.expect("debounced update");
        assert_eq!(delivered, "abc");
        assert_eq!(started.elapsed(), Duration::from_millis(550));
        assert!(
            debounced_rx.try_recv().is_err(),
            "exactly one update per quiet period"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_fragments_do_not_restart_the_timer() {
        let (debounced_tx, mut debounced_rx) = unbounded_channel();
        let mut filter = FragmentFilter::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), debounced_tx);
        let started = Instant::now();

        if let Some(text) = filter.accept("hello") {
            debouncer.schedule(text);
        }
        // The collaborator re-sends the same hypothesis while we wait.
        sleep(Duration::from_millis(200)).await;
        assert!(filter.accept("hello").is_none());
        sleep(Duration::from_millis(100)).await;
        assert!(filter.accept("  hello  ").is_none());

        let delivered = debounced_rx.recv().await.expect("debounced update");
        assert_eq!(delivered, "hello");
        assert_eq!(
            started.elapsed(),
            Duration::from_millis(400),
            "duplicates must not push the deadline out"
        );
        assert!(debounced_rx.try_recv().is_err());
    }
}
