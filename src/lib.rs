//! Blog Service - a JWT-guarded blog backend
//!
//! Bounded per-entry-TTL caches front the user and article lookups and hold
//! the blocklist of logged-out tokens.

pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, ConfigError};
pub use tasks::spawn_cleanup_task;
