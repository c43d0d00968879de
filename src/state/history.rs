//! Completion events and the immutable history entries built from them

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Timer};

/// Emitted once when a running timer reaches zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    /// The timer as it was at the instant it completed
    pub timer: Timer,
    pub completed_at: DateTime<Utc>,
}

/// One line of the append-only history log.
///
/// The serialized form matches the persisted `timerHistory` layout:
/// `{id, name, category, completionTime}`, plus `timerId` linking back to
/// the timer that completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(rename = "completionTime")]
    pub completion_time: String,
    #[serde(rename = "timerId", default, skip_serializing_if = "Option::is_none")]
    pub timer_id: Option<String>,
}

impl HistoryEntry {
    /// Build the entry for a timer completing at `now`.
    /// Every entry gets its own id; a reused timer produces distinct entries.
    pub fn from_completion(timer: &Timer, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: timer.name.clone(),
            category: timer.category,
            completion_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            timer_id: Some(timer.id.clone()),
        }
    }
}
