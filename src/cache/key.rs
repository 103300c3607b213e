//! Cache Key Module
//!
//! Deterministic cache key derivation from model, prompt and parameters.

use std::collections::BTreeMap;
use std::fmt::Display;

use sha2::{Digest, Sha256};

// == Generation Params ==
/// Extra generation parameters (temperature, top_p, ...) rendered as text.
///
/// A `BTreeMap` keeps them sorted, which is the order the key derivation needs.
pub type GenerationParams = BTreeMap<String, String>;

/// Empty parameter list for callers that only key on model and prompt.
pub const NO_PARAMS: [(&str, &str); 0] = [];

// == Key Derivation ==
/// Derives the cache key for a `(model, prompt, params)` request.
///
/// The digest input is `"{model}:{prompt}:"` followed by `key=value` pairs
/// sorted by key and joined with `:`. The result is the lowercase hex SHA-256
/// of that string (64 characters). Parameter order does not matter; when a
/// parameter name repeats, the last value wins.
pub fn derive_key<I, K, V>(model: &str, prompt: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.to_string()))
        .collect();

    let mut input = format!("{model}:{prompt}:");
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(":");
    input.push_str(&joined);

    hex::encode(Sha256::digest(input.as_bytes()))
}
