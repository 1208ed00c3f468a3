//! Live transcription feed.
//!
//! A two-state machine (Idle / Streaming) owning the capture device and the
//! duplex socket as a pair: both open together on mic-on and both close
//! together on mic-off, and at most one pair exists per page. Inbound
//! fragments are deduplicated and debounced by the view layer using
//! [`FragmentFilter`] and [`Debouncer`].

pub mod capture;
pub mod debounce;
pub mod fragments;
pub mod stream;

pub use debounce::Debouncer;
pub use fragments::FragmentFilter;

use crate::config::ClientConfig;
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

enum FeedState {
    Idle,
    Streaming(MicSession),
}

/// Tasks backing one Streaming period. Aborting both tears the capture
/// device and the socket down; the fragment channel closing lets the view
/// side drain its last debounced value.
struct MicSession {
    chunker: JoinHandle<()>,
    link: JoinHandle<()>,
}

pub struct TranscriptionFeed {
    state: FeedState,
}

impl Default for TranscriptionFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionFeed {
    pub fn new() -> Self {
        Self {
            state: FeedState::Idle,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, FeedState::Streaming(_))
    }

    /// Idle → Streaming: open the capture device, connect the duplex link,
    /// and start forwarding fixed-duration chunks. Fragments arrive on
    /// `fragments` until [`TranscriptionFeed::stop`].
    ///
    /// Capture denial fails here synchronously and leaves the feed Idle.
    /// Starting while already Streaming is a no-op.
    pub fn start(
        &mut self,
        config: &ClientConfig,
        fragments: UnboundedSender<String>,
    ) -> Result<()> {
        if self.is_streaming() {
            return Ok(());
        }

        let handle = capture::open_capture()?;
        let (audio_tx, audio_rx) = unbounded_channel::<Vec<u8>>();

        let chunk = config.chunk;
        let chunker = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(chunk);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let samples = handle.drain_chunk();
                if samples.is_empty() {
                    continue;
                }
                if audio_tx.send(capture::samples_to_pcm16(&samples)).is_err() {
                    break;
                }
            }
        });

        let url = config.asr_ws_url.clone();
        let link = tokio::spawn(async move {
            if let Err(err) = stream::run_duplex(&url, audio_rx, fragments).await {
                tracing::error!("transcription link failed: {err:#}");
            }
        });

        self.state = FeedState::Streaming(MicSession { chunker, link });
        Ok(())
    }

    /// Streaming → Idle: stop the capture device and drop the link. Closing
    /// is user-initiated only; there is no timeout path. A no-op when Idle.
    pub fn stop(&mut self) {
        if let FeedState::Streaming(session) = std::mem::replace(&mut self.state, FeedState::Idle)
        {
            session.chunker.abort();
            session.link.abort();
            tracing::debug!("transcription feed stopped");
        }
    }
}

impl Drop for TranscriptionFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_starts_idle() {
        let feed = TranscriptionFeed::new();
        assert!(!feed.is_streaming());
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let mut feed = TranscriptionFeed::new();
        feed.stop();
        assert!(!feed.is_streaming());
    }

    #[cfg(not(feature = "desktop"))]
    #[tokio::test]
    async fn start_without_a_capture_backend_stays_idle() {
        let (tx, _rx) = unbounded_channel();
        let mut feed = TranscriptionFeed::new();
        assert!(feed.start(&ClientConfig::default(), tx).is_err());
        assert!(!feed.is_streaming());
    }
}
