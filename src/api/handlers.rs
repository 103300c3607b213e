//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! Cache operations are blocking SQLite calls, so every handler runs them on
//! the blocking thread pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{derive_key, CacheExport, CacheStats, ResponseCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    requests::validate_key, CacheResponseRequest, CachedResponse, ClearResponse, DeleteResponse,
    GetResponse, HealthResponse, LookupRequest, LookupResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The cache needs no lock: SQLite serializes writers itself.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the cache described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ResponseCache::from_config(config)?))
    }

    /// Runs `op` against the cache on the blocking pool.
    pub async fn run_blocking<F, R>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&ResponseCache) -> R + Send + 'static,
        R: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))
    }
}

/// Handler for PUT /entries
///
/// Stores a JSON value under a raw key with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest { key, value, ttl } = req;
    let stored_key = key.clone();
    let stored = state
        .run_blocking(move |cache| cache.set(&stored_key, &value, ttl))
        .await?;

    if !stored {
        return Err(CacheError::StoreFailed(key));
    }
    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /entries/:key
///
/// Absent, expired and unreadable entries are all reported as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let lookup_key = key.clone();
    let value = state
        .run_blocking(move |cache| cache.get::<Value>(&lookup_key))
        .await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let target = key.clone();
    let existed = state.run_blocking(move |cache| cache.delete(&target)).await?;

    if !existed {
        return Err(CacheError::NotFound(key));
    }
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /responses
///
/// Caches a model response under the key derived from model, prompt and params.
pub async fn cache_response_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheResponseRequest>,
) -> Result<Json<CachedResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let params = req.generation_params();
    let CacheResponseRequest {
        model,
        prompt,
        response,
        ttl,
        ..
    } = req;

    let (key, stored) = state
        .run_blocking(move |cache| {
            cache.try_cache_response(&model, &prompt, response.as_str(), ttl, &params)
        })
        .await?;

    if !stored {
        return Err(CacheError::StoreFailed(key));
    }
    Ok(Json(CachedResponse { key }))
}

/// Handler for POST /responses/lookup
///
/// Params must match the ones used when the response was cached.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<LookupResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let params = req.generation_params();
    let LookupRequest { model, prompt, .. } = req;
    let key = derive_key(&model, &prompt, &params);

    let response = state
        .run_blocking(move |cache| cache.get_cached_response::<String, _, _, _>(&model, &prompt, &params))
        .await?;

    match response {
        Some(response) => Ok(Json(LookupResponse { key, response })),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<CacheStats>> {
    let stats = state.run_blocking(|cache| cache.get_stats()).await??;
    Ok(Json(stats))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.run_blocking(|cache| cache.clear()).await??;
    Ok(Json(ClearResponse::new(removed, "entries")))
}

/// Handler for POST /clear-expired
pub async fn clear_expired_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.run_blocking(|cache| cache.clear_expired()).await??;
    Ok(Json(ClearResponse::new(removed, "expired entries")))
}

/// Handler for GET /export
///
/// Statistics plus per-entry metadata; cached values are never included.
pub async fn export_handler(State(state): State<AppState>) -> Result<Json<CacheExport>> {
    let export = state.run_blocking(|cache| cache.export()).await??;
    Ok(Json(export))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
