//! Tick scheduler background task

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::state::TimerEngine;

/// Handle to a running tick scheduler
#[derive(Debug)]
pub struct TickerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop the scheduler and wait for it to exit.
    /// A tick already in progress completes; none are delivered afterwards.
    pub async fn cancel(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.join.await {
            warn!("Tick scheduler ended abnormally: {}", e);
        }
    }
}

/// Spawn the scheduler that calls `engine.tick()` once per `period`
pub fn spawn_tick_scheduler(engine: Arc<TimerEngine>, period: Duration) -> TickerHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    let join = tokio::spawn(tick_scheduler_task(engine, period, stop_rx));
    TickerHandle { stop_tx, join }
}

async fn tick_scheduler_task(
    engine: Arc<TimerEngine>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    info!("Starting tick scheduler every {:?}", period);

    // First tick lands one full period after start
    let mut interval = interval_at(Instant::now() + period, period);
    // A stalled runtime delays ticks instead of firing a burst of them
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => {
                debug!("Tick scheduler cancelled");
                break;
            }

            _ = interval.tick() => {
                let completions = engine.tick();
                if !completions.is_empty() {
                    debug!("Tick completed {} timers", completions.len());
                }
            }
        }
    }

    info!("Tick scheduler stopped");
}
