//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::GenerationParams;

/// Maximum accepted length of a raw cache key, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for storing a raw key (PUT /entries)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for caching a model response (POST /responses)
#[derive(Debug, Clone, Deserialize)]
pub struct CacheResponseRequest {
    pub model: String,
    pub prompt: String,
    pub response: String,
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Extra generation parameters, part of the cache key
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl CacheResponseRequest {
    pub fn validate(&self) -> Option<String> {
        validate_model_prompt(&self.model, &self.prompt)
    }

    pub fn generation_params(&self) -> GenerationParams {
        to_generation_params(&self.params)
    }
}

/// Request body for looking up a model response (POST /responses/lookup)
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl LookupRequest {
    pub fn validate(&self) -> Option<String> {
        validate_model_prompt(&self.model, &self.prompt)
    }

    pub fn generation_params(&self) -> GenerationParams {
        to_generation_params(&self.params)
    }
}

/// Validates a raw cache key
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_model_prompt(model: &str, prompt: &str) -> Option<String> {
    if model.trim().is_empty() {
        return Some("Model cannot be empty".to_string());
    }
    if prompt.is_empty() {
        return Some("Prompt cannot be empty".to_string());
    }
    None
}

/// Renders JSON parameters as key text: strings verbatim, everything else as JSON.
pub fn to_generation_params(params: &BTreeMap<String, Value>) -> GenerationParams {
    params
        .iter()
        .map(|(name, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), rendered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"answer": 42}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"answer": 42}));
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_with_negative_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl": -5}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(-5));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("").is_some());
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key("valid_key").is_none());
    }

    #[test]
    fn test_cache_response_request_defaults() {
        let json = r#"{"model": "llama", "prompt": "say hi", "response": "hello"}"#;
        let req: CacheResponseRequest = serde_json::from_str(json).unwrap();
        assert!(req.params.is_empty());
        assert!(req.ttl.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_lookup_request_validation() {
        let req: LookupRequest = serde_json::from_str(r#"{"model": " ", "prompt": "x"}"#).unwrap();
        assert!(req.validate().is_some());

        let req: LookupRequest = serde_json::from_str(r#"{"model": "m", "prompt": ""}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_generation_params_rendering() {
        let req: LookupRequest = serde_json::from_str(
            r#"{"model": "m", "prompt": "p",
                "params": {"temperature": 0.1, "stop": "END", "stream": false, "seeds": [1, 2]}}"#,
        )
        .unwrap();
        let params = req.generation_params();

        assert_eq!(params["temperature"], "0.1");
        assert_eq!(params["stop"], "END");
        assert_eq!(params["stream"], "false");
        assert_eq!(params["seeds"], "[1,2]");
    }
}
