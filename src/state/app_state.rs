//! Shared state handed to the HTTP layer

use std::{path::PathBuf, sync::Arc, time::Instant};

use super::TimerEngine;

/// Everything the request handlers need
pub struct AppState {
    pub engine: Arc<TimerEngine>,
    /// Directory receiving history exports
    pub export_dir: PathBuf,
    /// Server metadata
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<TimerEngine>, export_dir: PathBuf) -> Self {
        Self {
            engine,
            export_dir,
            start_time: Instant::now(),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
