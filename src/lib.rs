//! Timer Keeper - named, categorized countdown timers with a completion history
//!
//! This library provides the timer lifecycle engine, its tick scheduler, the
//! repository persisting timers and history to a key-value store, and an
//! HTTP surface for driving it.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerEngine};
pub use storage::{FileStore, MemoryStore, PersistentStore, TimerRepository};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
