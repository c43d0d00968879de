//! Services built on top of the repository
//!
//! This module contains the history recorder and the history export.

pub mod export;
pub mod recorder;

// Re-export main types
pub use export::{export_history, EXPORT_FILE_NAME};
pub use recorder::HistoryRecorder;
