use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Single-slot delayed delivery: scheduling a value supersedes any value
/// still waiting, so a burst of schedules within one quiet period delivers
/// only the last one.
///
/// Values land on the channel handed to [`Debouncer::new`]; the receiver
/// side decides what "deliver" means (for the mic feed, writing the question
/// input).
pub struct Debouncer {
    delay: Duration,
    out: UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration, out: UnboundedSender<String>) -> Self {
        Self {
            delay,
            out,
            pending: None,
        }
    }

    /// Arm the slot with `value`, cancelling whatever was armed before.
    pub fn schedule(&mut self, value: String) {
        self.cancel();
        let delay = self.delay;
        let out = self.out.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = out.send(value);
        }));
    }

    /// Drop the armed value, if any, without delivering it.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    /// Hand over the armed task so a caller can await its delivery before
    /// tearing the feed down. Leaves the slot empty.
    pub fn take_pending(&mut self) -> Option<JoinHandle<()>> {
        self.pending.take()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_the_latest_value() {
        let (tx, mut rx) = unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), tx);
        let started = Instant::now();

        debouncer.schedule("a".to_string());
        sleep(Duration::from_millis(100)).await;
        debouncer.schedule("ab".to_string());
        sleep(Duration::from_millis(50)).await;
        debouncer.schedule("abc".to_string());

        let delivered = rx.recv().await.expect("debounced value");
        assert_eq!(delivered, "abc");
        assert_eq!(started.elapsed(), Duration::from_millis(550));
        assert!(rx.try_recv().is_err(), "superseded values must not arrive");
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_schedules_deliver_each_value() {
        let (tx, mut rx) = unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), tx);

        debouncer.schedule("first".to_string());
        assert_eq!(rx.recv().await.as_deref(), Some("first"));

        debouncer.schedule("second".to_string());
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_armed_value() {
        let (tx, mut rx) = unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), tx);

        debouncer.schedule("doomed".to_string());
        debouncer.cancel();
        sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn take_pending_lets_the_last_value_land() {
        let (tx, mut rx) = unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(400), tx);

        debouncer.schedule("final fragment".to_string());
        let task = debouncer.take_pending().expect("armed task");
        let _ = task.await;
        assert_eq!(rx.try_recv().as_deref().ok(), Some("final fragment"));
    }
}
