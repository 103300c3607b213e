//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: calls `clear_expired` at a configured interval (opt-in)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
