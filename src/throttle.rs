//! Demand-coalescing for high-frequency control input.
//!
//! The first value after a quiet period is applied immediately. While the
//! interval is running, newer values overwrite a single pending slot, and
//! the pending value (the latest one) is applied when the interval ends.
//! Intermediate values are dropped, never queued.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Drains `updates`, calling `apply` at most once per `interval` with the
/// latest received value. Returns once the sender side is closed and any
/// pending value has been applied at its scheduled time.
pub async fn run_throttled<T, F>(
    mut updates: mpsc::Receiver<T>,
    interval: Duration,
    mut apply: F,
) where
    F: FnMut(T),
{
    while let Some(first) = updates.recv().await {
        apply(first);
        let mut deadline = Instant::now() + interval;
        let mut pending: Option<T> = None;

        loop {
            tokio::select! {
                biased;
                received = updates.recv() => match received {
                    Some(value) => {
                        if pending.replace(value).is_some() {
                            trace!("Superseded pending update dropped");
                        }
                    }
                    None => {
                        if let Some(value) = pending.take() {
                            sleep_until(deadline).await;
                            apply(value);
                        }
                        return;
                    }
                },
                _ = sleep_until(deadline) => match pending.take() {
                    Some(value) => {
                        apply(value);
                        deadline = Instant::now() + interval;
                    }
                    None => break,
                },
            }
        }
    }
}

/// Sending half used by the input side; `send` never blocks on the consumer.
#[derive(Debug, Clone)]
pub struct ThrottleHandle<T> {
    sender: mpsc::Sender<T>,
}

impl<T: Send + 'static> ThrottleHandle<T> {
    /// Spawns the throttling loop on the current runtime.
    pub fn spawn<F>(interval: Duration, apply: F) -> (Self, tokio::task::JoinHandle<()>)
    where
        F: FnMut(T) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(64);
        let task = tokio::spawn(run_throttled(receiver, interval, apply));
        (Self { sender }, task)
    }

    pub async fn send(&self, value: T) -> anyhow::Result<()> {
        self.sender
            .send(value)
            .await
            .map_err(|_| anyhow::anyhow!("Throttle loop has stopped"))
    }
}
