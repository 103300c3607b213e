//! Generator Module
//!
//! Read-through caching around a text generator.
//!
//! The generator itself (HTTP client or subprocess driver for the model
//! runtime) lives elsewhere; this module only needs the [`Generator`] seam.

use tracing::debug;

use crate::cache::{key_preview, GenerationParams, ResponseCache};

// == Generator Trait ==
/// Something that turns `(model, prompt, params)` into generated text.
pub trait Generator: Send + Sync {
    fn generate(&self, model: &str, prompt: &str, params: &GenerationParams) -> anyhow::Result<String>;
}

// == Cached Generator ==
/// Wraps a [`Generator`] so repeated requests are answered from the cache.
pub struct CachedGenerator<G> {
    generator: G,
    cache: Option<ResponseCache>,
}

impl<G: Generator> CachedGenerator<G> {
    /// Passing `None` disables caching entirely.
    pub fn new(generator: G, cache: Option<ResponseCache>) -> Self {
        Self { generator, cache }
    }

    /// The cache, for stats/clear/export pass-throughs.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generates text, consulting the cache first when `use_cache` is set.
    ///
    /// Empty model or prompt yields an empty response without calling the
    /// generator. Non-empty live responses are stored under the same params
    /// used for the lookup. Generator errors are returned unchanged.
    pub fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
        use_cache: bool,
    ) -> anyhow::Result<String> {
        if model.is_empty() || prompt.is_empty() {
            return Ok(String::new());
        }

        let cache = self.cache.as_ref().filter(|_| use_cache);

        if let Some(cache) = cache {
            if let Some(cached) = cache.get_cached_response::<String, _, _, _>(model, prompt, params) {
                if !cached.is_empty() {
                    debug!(model, "Serving generation from cache");
                    return Ok(cached);
                }
            }
        }

        let response = self.generator.generate(model, prompt, params)?;

        if let Some(cache) = cache {
            if !response.is_empty() {
                let key = cache.cache_response(model, prompt, response.as_str(), None, params);
                debug!(model, key = %key_preview(&key), "Cached generated response");
            }
        }

        Ok(response)
    }
}
