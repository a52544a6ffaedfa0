//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry cleanup: sweeps expired entries out of every cache

mod cleanup;

pub use cleanup::spawn_cleanup_task;
