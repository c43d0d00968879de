//! Conversion of completed timers into history entries

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    error::RepositoryError,
    state::{HistoryEntry, Timer},
    storage::TimerRepository,
};

/// Appends one history entry per completion through the repository
#[derive(Clone)]
pub struct HistoryRecorder {
    repository: TimerRepository,
}

impl HistoryRecorder {
    pub fn new(repository: TimerRepository) -> Self {
        Self { repository }
    }

    /// Record `timer` as completed at `now` and return the stored entry
    pub async fn record(
        &self,
        timer: &Timer,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry, RepositoryError> {
        let entry = HistoryEntry::from_completion(timer, now);
        self.repository.append_history(entry.clone()).await?;

        info!(
            "Recorded completion of '{}' ({}) at {}",
            entry.name, entry.category, entry.completion_time
        );
        Ok(entry)
    }
}
