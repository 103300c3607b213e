//! LLM Response Cache - persistent response cache for local model runtimes
//!
//! Stores generation responses in a single-file SQLite store keyed by a
//! SHA-256 digest of `(model, prompt, params)`, with TTL expiry and
//! hit-count weighted, size-bounded eviction. Ships a small REST server for
//! cache maintenance.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{derive_key, CacheStats, ResponseCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use generator::{CachedGenerator, Generator};
pub use tasks::spawn_cleanup_task;
