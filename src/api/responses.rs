//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Timer, TimerPhase};

/// Body of `POST /timers`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimerRequest {
    pub name: String,
    pub duration: DurationInput,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Workout".to_string()
}

/// A duration as sent by a client: a JSON number or the raw text of a form field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Seconds(i64),
    Text(String),
}

/// A timer together with its derived lifecycle phase and progress
#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    pub phase: TimerPhase,
    /// Fraction of the duration still remaining, 1.0 when full
    pub progress: f64,
}

impl From<Timer> for TimerView {
    fn from(timer: Timer) -> Self {
        let phase = timer.phase();
        let progress = timer.progress();
        Self { timer, phase, progress }
    }
}

/// API response structure for timer operations
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerView>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: Option<Timer>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.map(TimerView::from),
        }
    }

    /// Create a response reporting a timer's current state
    pub fn timer(message: String, timer: Timer) -> Self {
        let status = if timer.is_running { "running" } else { "stopped" };
        Self::new(status, message, Some(timer))
    }

    /// Create an error response
    pub fn error(message: String, timer: Option<Timer>) -> Self {
        Self::new("error", message, timer)
    }
}

/// Response of `GET /timers`
#[derive(Debug, Clone, Serialize)]
pub struct TimerListResponse {
    pub timers: Vec<TimerView>,
    pub running: usize,
}

impl TimerListResponse {
    pub fn new(timers: Vec<Timer>) -> Self {
        let running = timers.iter().filter(|t| t.is_running).count();
        Self {
            timers: timers.into_iter().map(TimerView::from).collect(),
            running,
        }
    }
}

/// Response of `POST /history/export`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub path: String,
}

/// Server status summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: usize,
    pub running: usize,
    pub completed: usize,
    pub uptime: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
