//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired entries of the in-process store
//! - Store Health: Pings the store and reconnects after an outage

mod cleanup;
mod health;

pub use cleanup::spawn_cleanup_task;
pub use health::spawn_health_task;
