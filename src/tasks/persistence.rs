//! Persistence writer background task

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::{
    services::HistoryRecorder,
    state::{CompletionEvent, Timer},
    storage::TimerRepository,
};

/// Work queued by the engine, applied strictly in order
#[derive(Debug)]
pub enum PersistJob {
    /// Write a snapshot of the active collection taken at mutation time
    SaveTimers(Vec<Timer>),
    /// Append the history entry for a completion
    Record(CompletionEvent),
    /// Acknowledge once every earlier job has been applied
    Flush(oneshot::Sender<()>),
}

/// Background task that owns all writes to the store.
///
/// Being the only writer is what keeps the history read-append-write safe.
/// Write failures are logged and dropped; memory stays authoritative.
pub async fn persistence_task(
    mut jobs: mpsc::UnboundedReceiver<PersistJob>,
    repository: TimerRepository,
    recorder: HistoryRecorder,
) {
    info!("Starting persistence task");

    while let Some(job) = jobs.recv().await {
        match job {
            PersistJob::SaveTimers(snapshot) => {
                if let Err(e) = repository.save_timers(&snapshot).await {
                    error!("Failed to save timers: {}", e);
                }
            }
            PersistJob::Record(event) => {
                if let Err(e) = recorder.record(&event.timer, event.completed_at).await {
                    error!("Failed to record completion of timer {}: {}", event.timer.id, e);
                }
            }
            PersistJob::Flush(ack) => {
                // The waiter may have given up; nothing to do then
                let _ = ack.send(());
            }
        }
    }

    debug!("Persistence queue closed, task exiting");
}
