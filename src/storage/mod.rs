//! Persistence module
//!
//! This module contains the durable key-value stores and the repository that
//! maps timers and history onto them.

pub mod repository;
pub mod store;

// Re-export main types
pub use repository::{TimerRepository, HISTORY_KEY, TIMERS_KEY};
pub use store::{FileStore, MemoryStore, PersistentStore};
