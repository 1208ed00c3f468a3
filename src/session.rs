//! Session bookkeeping.
//!
//! Exactly one session is active at a time. The active identifier survives
//! restarts through [`crate::storage`]; everything else about a session
//! (transcript, documents) lives on the backend and is re-fetched on switch.

use crate::storage;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a fresh session identifier from the current wall clock.
///
/// Two calls within the same millisecond yield the same token. The backend
/// treats that as one session; callers get no uniqueness promise.
pub fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("sess_{}", millis)
}

/// Owns the active session identifier and its persistence.
pub struct SessionTracker {
    active: String,
    storage_key: &'static str,
}

impl SessionTracker {
    /// Restore the persisted session, or create and persist a fresh one.
    pub fn restore() -> Self {
        Self::restore_scoped(storage::SESSION_KEY)
    }

    /// Same as [`SessionTracker::restore`] under an explicit storage key.
    /// Tests use distinct keys for isolation.
    pub fn restore_scoped(storage_key: &'static str) -> Self {
        let active = match storage::get(storage_key) {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                let id = generate_session_id();
                persist(storage_key, &id);
                id
            }
        };
        Self {
            active,
            storage_key,
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    /// Make `id` the active session and persist it.
    pub fn switch(&mut self, id: impl Into<String>) {
        self.active = id.into();
        persist(self.storage_key, &self.active);
    }

    /// Generate a fresh identifier and switch to it. Returns the new id.
    pub fn start_new(&mut self) -> &str {
        let id = generate_session_id();
        self.switch(id);
        &self.active
    }
}

fn persist(key: &str, id: &str) {
    if let Err(err) = storage::set(key, id) {
        // The in-memory id still works for this page lifetime.
        tracing::warn!("failed to persist session id: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn generated_ids_are_timestamp_tokens() {
        let id = generate_session_id();
        let suffix = id.strip_prefix("sess_").expect("missing sess_ prefix");
        assert!(suffix.parse::<u128>().is_ok(), "non-numeric suffix: {id}");
    }

    #[test]
    fn restore_persists_a_fresh_session() {
        let key = "session_restore_test";
        storage::delete(key).expect("cleanup failed");

        let tracker = SessionTracker::restore_scoped(key);
        assert_eq!(storage::get(key).as_deref(), Some(tracker.active()));

        // A second restore sees the same id, not a new one.
        let again = SessionTracker::restore_scoped(key);
        assert_eq!(again.active(), tracker.active());

        storage::delete(key).expect("cleanup failed");
    }

    #[test]
    fn switch_replaces_and_persists() {
        let key = "session_switch_test";
        storage::delete(key).expect("cleanup failed");

        let mut tracker = SessionTracker::restore_scoped(key);
        tracker.switch("sess_42");
        assert_eq!(tracker.active(), "sess_42");
        assert_eq!(storage::get(key).as_deref(), Some("sess_42"));

        storage::delete(key).expect("cleanup failed");
    }

    #[test]
    fn start_new_moves_off_the_current_session() {
        let key = "session_start_new_test";
        storage::delete(key).expect("cleanup failed");

        let mut tracker = SessionTracker::restore_scoped(key);
        let before = tracker.active().to_string();
        // The id token has millisecond granularity.
        thread::sleep(Duration::from_millis(2));
        tracker.start_new();
        assert_ne!(tracker.active(), before);
        assert_eq!(storage::get(key).as_deref(), Some(tracker.active()));

        storage::delete(key).expect("cleanup failed");
    }
}
