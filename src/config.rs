use std::env;
use std::time::Duration;

/// Client configuration, read once per operation from the environment so a
/// `.env` file or the process environment can override any knob.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the chat backend.
    pub backend_url: String,
    /// Websocket address of the streaming transcription endpoint.
    pub asr_ws_url: String,
    /// Quiet period before a transcript fragment reaches the input field.
    pub debounce: Duration,
    /// Duration of each captured audio chunk.
    pub chunk: Duration,
    /// Delay between toggling the mic off and auto-submitting the input.
    /// Zero submits immediately.
    pub submit_grace: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            asr_ws_url: "ws://localhost:8000/ws/asr".to_string(),
            debounce: Duration::from_millis(400),
            chunk: Duration::from_millis(250),
            submit_grace: Duration::from_millis(800),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: env::var("STARLING_BACKEND_URL").unwrap_or(defaults.backend_url),
            asr_ws_url: env::var("STARLING_ASR_WS_URL").unwrap_or(defaults.asr_ws_url),
            debounce: millis_var("STARLING_DEBOUNCE_MS", defaults.debounce),
            chunk: millis_var("STARLING_CHUNK_MS", defaults.chunk),
            submit_grace: millis_var("STARLING_SUBMIT_GRACE_MS", defaults.submit_grace),
        }
    }
}

fn millis_var(key: &str, fallback: Duration) -> Duration {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!("ignoring non-numeric {key}={raw:?}");
                fallback
            }
        },
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let config = ClientConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(400));
        assert_eq!(config.chunk, Duration::from_millis(250));
        assert!(config.backend_url.starts_with("http://"));
        assert!(config.asr_ws_url.starts_with("ws://"));
    }
}
