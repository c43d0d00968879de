//! Background tasks module
//!
//! This module contains the tick scheduler and the persistence writer that
//! run alongside the engine.

pub mod persistence;
pub mod tick_scheduler;

// Re-export main functions
pub use persistence::{persistence_task, PersistJob};
pub use tick_scheduler::{spawn_tick_scheduler, TickerHandle};
