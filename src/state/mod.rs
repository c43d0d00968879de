//! State management module
//!
//! This module contains the timer entity, history records, the engine that
//! owns the active collection and the state shared with the HTTP layer.

pub mod app_state;
pub mod engine;
pub mod history;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use engine::{TimerEngine, ToggleOutcome};
pub use history::{CompletionEvent, HistoryEntry};
pub use timer::{Category, TickOutcome, Timer, TimerPhase};
