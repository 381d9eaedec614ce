//! One-second tick source for the session clock and countdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Interval between ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// A repeating timer running on a spawned task.
///
/// The background task is aborted on [`cancel`](Ticker::cancel) and on drop,
/// so a ticker never outlives its owner.
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
    cancelled: bool,
}

impl Ticker {
    /// Start a ticker firing every [`TICK`], first tick one period from now.
    pub fn start() -> Self {
        Self::with_period(TICK)
    }

    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            rx,
            handle,
            cancelled: false,
        }
    }

    /// Wait for the next tick. Returns `false` once the ticker is cancelled.
    pub async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    /// Stop the timer. Further calls to [`tick`](Ticker::tick) return `false`.
    pub fn cancel(&mut self) {
        self.handle.abort();
        self.rx.close();
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
