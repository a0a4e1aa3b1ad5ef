use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Repeating tick task owned by a presenter.
///
/// The task stops as soon as the handle is dropped.
#[derive(Debug)]
pub(crate) struct Cadence {
    ticks: mpsc::Receiver<()>,
    _guard: DropGuard,
}

impl Cadence {
    pub(crate) fn start(period: Duration) -> Self {
        let token = CancellationToken::new();
        let (sender, ticks) = mpsc::channel(1);
        tokio::spawn(run_cadence(period, sender, token.clone()));
        Self {
            ticks,
            _guard: token.drop_guard(),
        }
    }

    /// Waits for the next tick. Returns false if the task has stopped.
    pub(crate) async fn tick(&mut self) -> bool {
        self.ticks.recv().await.is_some()
    }
}

async fn run_cadence(period: Duration, sender: mpsc::Sender<()>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if sender.send(()).await.is_err() {
                    break;
                }
            }
        }
    }
}
