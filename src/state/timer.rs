//! Timer entity and its per-timer state machine

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Closed set of timer categories accepted at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Workout,
    Study,
    Break,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Workout => "Workout",
            Category::Study => "Study",
            Category::Break => "Break",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Workout" => Ok(Category::Workout),
            "Study" => Ok(Category::Study),
            "Break" => Ok(Category::Break),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

/// Lifecycle phase derived from a timer's fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
}

/// What a single tick did to one timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    Decremented,
    Completed,
}

/// A named countdown owned by the engine's active collection.
///
/// The serialized form matches the persisted `timers` layout:
/// `{id, name, duration, remainingTime, isRunning, category}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    #[serde(rename = "remainingTime")]
    pub remaining_seconds: u64,
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    pub category: Category,
}

impl Timer {
    /// Build a validated, idle timer with a fresh id
    pub fn new(
        name: &str,
        duration_seconds: u64,
        category: Category,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if duration_seconds == 0 {
            return Err(ValidationError::NonPositiveDuration(0));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            duration_seconds,
            remaining_seconds: duration_seconds,
            is_running: false,
            category,
        })
    }

    pub fn phase(&self) -> TimerPhase {
        if self.remaining_seconds == 0 {
            TimerPhase::Completed
        } else if self.is_running {
            TimerPhase::Running
        } else {
            TimerPhase::Idle
        }
    }

    /// Fraction of the duration still remaining, in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        if self.duration_seconds == 0 {
            return 0.0;
        }
        self.remaining_seconds as f64 / self.duration_seconds as f64
    }

    /// Flip the running flag. Returns false, leaving the timer untouched,
    /// when asked to start a timer that has no time left.
    pub fn toggle(&mut self) -> bool {
        if !self.is_running && self.remaining_seconds == 0 {
            return false;
        }
        self.is_running = !self.is_running;
        true
    }

    pub fn reset(&mut self) {
        self.remaining_seconds = self.duration_seconds;
        self.is_running = false;
    }

    /// Advance by one tick.
    ///
    /// Reaching zero stops the timer in the same step, so a running timer is
    /// never observed at zero and the completion is reported exactly once.
    pub fn advance(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Unchanged;
        }

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            if self.remaining_seconds > 0 {
                return TickOutcome::Decremented;
            }
        }

        self.is_running = false;
        TickOutcome::Completed
    }

    /// Repair a record read from storage so the invariants hold again.
    /// Returns None for records that can never be valid.
    pub fn normalized(mut self) -> Option<Self> {
        if self.name.trim().is_empty() || self.duration_seconds == 0 {
            return None;
        }
        self.remaining_seconds = self.remaining_seconds.min(self.duration_seconds);
        if self.remaining_seconds == 0 {
            self.is_running = false;
        }
        Some(self)
    }
}

/// Parse a duration typed into a form field
pub fn parse_duration(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NonNumericDuration(trimmed.to_string()))?;
    positive_duration(value)
}

/// Reject zero and negative durations
pub fn positive_duration(value: i64) -> Result<u64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveDuration(value));
    }
    Ok(value as u64)
}
