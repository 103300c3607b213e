//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the response cache and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache directory could not be created
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The embedded database rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A value or document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error outside of directory setup (e.g. export)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found, expired, or unreadable
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A write was attempted but the cache reported failure
    #[error("Failed to store key: {0}")]
    StoreFailed(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::CreateDirectory { .. }
            | CacheError::Database(_)
            | CacheError::Serialization(_)
            | CacheError::Io(_)
            | CacheError::StoreFailed(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (
                CacheError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CacheError::StoreFailed("key".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CacheError::Internal("error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CacheError::Database(rusqlite::Error::QueryReturnedNoRows),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = CacheError::NotFound("abc".to_string()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "Key not found: abc");
    }

    #[test]
    fn test_create_directory_message_names_path() {
        let err = CacheError::CreateDirectory {
            path: PathBuf::from("/nope/cache"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nope/cache"));
    }
}
