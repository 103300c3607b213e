//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_response_handler, clear_expired_handler, clear_handler, delete_handler, export_handler,
    get_handler, health_handler, lookup_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/entries", put(set_handler))
        .route("/entries/:key", get(get_handler).delete(delete_handler))
        .route("/responses", post(cache_response_handler))
        .route("/responses/lookup", post(lookup_handler))
        .route("/stats", get(stats_handler))
        .route("/clear", post(clear_handler))
        .route("/clear-expired", post(clear_expired_handler))
        .route("/export", get(export_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1024 * 1024, 300).unwrap();
        (dir, create_router(AppState::new(cache)))
    }

    async fn status_of(app: Router, method: &str, uri: &str, body: Option<&str>) -> StatusCode {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(status_of(app, "GET", "/health", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(status_of(app, "GET", "/stats", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let (_dir, app) = create_test_app();
        let status = status_of(app, "PUT", "/entries", Some(r#"{"key":"test","value":"hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (_dir, app) = create_test_app();
        assert_eq!(
            status_of(app, "GET", "/entries/nonexistent", None).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_maintenance_endpoints() {
        let (_dir, app) = create_test_app();
        assert_eq!(status_of(app.clone(), "POST", "/clear", None).await, StatusCode::OK);
        assert_eq!(status_of(app.clone(), "POST", "/clear-expired", None).await, StatusCode::OK);
        assert_eq!(status_of(app, "GET", "/export", None).await, StatusCode::OK);
    }
}
