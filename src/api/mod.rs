//! API Module
//!
//! HTTP handlers and routing for the cache maintenance REST API.
//!
//! # Endpoints
//! - `PUT /entries` - Store a JSON value under a raw key
//! - `GET /entries/:key` - Retrieve a value by key
//! - `DELETE /entries/:key` - Delete a key
//! - `POST /responses` - Cache a model response
//! - `POST /responses/lookup` - Look up a cached model response
//! - `GET /stats` - Cache statistics
//! - `POST /clear` - Remove every entry
//! - `POST /clear-expired` - Remove expired entries
//! - `GET /export` - Statistics plus entry metadata
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
