//! Persisted client state.
//!
//! A single key-value namespace scoped to the local profile, durable across
//! restarts. File-backed on native targets, in-memory on wasm (the browser
//! build keeps state for the lifetime of the page only).

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

/// Storage key holding the active session identifier.
pub const SESSION_KEY: &str = "session_id";

/// In-memory fallback for WASM, file-based for native
#[allow(dead_code)]
static PROFILE_STORE: Lazy<Mutex<HashMap<String, String>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Directory holding one file per persisted key
#[cfg(not(target_arch = "wasm32"))]
fn state_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("starling").join("state");
    }

    PathBuf::from("cache").join("state")
}

/// Sanitize a storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

/// Read a persisted value
#[cfg(not(target_arch = "wasm32"))]
pub fn get(key: &str) -> Option<String> {
    let file_path = state_dir().join(format!("{}.json", sanitize_key(key)));
    fs::read_to_string(file_path).ok()
}

#[cfg(target_arch = "wasm32")]
pub fn get(key: &str) -> Option<String> {
    let store = PROFILE_STORE.lock().ok()?;
    store.get(key).cloned()
}

/// Persist a value under a key
#[cfg(not(target_arch = "wasm32"))]
pub fn set(key: &str, value: &str) -> Result<(), String> {
    let dir = state_dir();
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create state directory: {}", e))?;
    let file_path = dir.join(format!("{}.json", sanitize_key(key)));
    fs::write(file_path, value).map_err(|e| format!("Failed to write state: {}", e))
}

#[cfg(target_arch = "wasm32")]
pub fn set(key: &str, value: &str) -> Result<(), String> {
    let mut store = PROFILE_STORE.lock().map_err(|e| e.to_string())?;
    store.insert(key.to_string(), value.to_string());
    Ok(())
}

/// Remove a persisted value
#[cfg(not(target_arch = "wasm32"))]
pub fn delete(key: &str) -> Result<(), String> {
    let file_path = state_dir().join(format!("{}.json", sanitize_key(key)));
    if file_path.exists() {
        fs::remove_file(file_path).map_err(|e| format!("Failed to delete state: {}", e))?;
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn delete(key: &str) -> Result<(), String> {
    let mut store = PROFILE_STORE.lock().map_err(|e| e.to_string())?;
    store.remove(key);
    Ok(())
}
