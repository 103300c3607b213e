//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies. Statistics and
//! exports are served as [`crate::cache::CacheStats`] and
//! [`crate::cache::CacheExport`] directly.

use serde::Serialize;
use serde_json::Value;

/// Response body for GET /entries/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /entries
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /entries/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for POST /responses
#[derive(Debug, Clone, Serialize)]
pub struct CachedResponse {
    /// Derived cache key
    pub key: String,
}

/// Response body for POST /responses/lookup
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// Derived cache key
    pub key: String,
    /// The cached model response
    pub response: String,
}

/// Response body for POST /clear and POST /clear-expired
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of removed entries
    pub removed: usize,
    pub message: String,
}

impl ClearResponse {
    pub fn new(removed: usize, what: &str) -> Self {
        Self {
            removed,
            message: format!("Removed {} {}", removed, what),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
