// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding Client
//!
//! Embedding providers behind [`EmbeddingProvider`].
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Turns facet labels and query text into vectors
//!
//! [`HashingEmbedder`] runs fully offline and is the default; it gives
//! lexical rather than semantic similarity. [`OllamaEmbeddingClient`] talks
//! to an Ollama-compatible `/api/embeddings` endpoint. [`CachedEmbedder`]
//! wraps either one with an LRU so repeated query text is embedded once.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::errors::EmbeddingError;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder over word unigrams and character trigrams.
///
/// Output is L2-normalised, so cosine similarity equals the dot product.
/// Features are hashed with SeaHash, whose output is fixed, so a label maps
/// to the same vector on every build.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = seahash::hash(feature.as_bytes());

        let bucket = (hash % self.dimensions as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let normalised = text.to_lowercase();
        let words: Vec<&str> = normalised
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for word in &words {
            self.add_feature(&mut vector, &format!("w:{}", word), WORD_WEIGHT);

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for trigram in padded.windows(3) {
                let trigram: String = trigram.iter().collect();
                self.add_feature(&mut vector, &format!("c:{}", trigram), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

pub struct OllamaEmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
}

impl OllamaEmbeddingClient {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            dimensions: None,
        }
    }

    /// Reject responses whose vector length differs from `dimensions`
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let url = format!("{}/api/embeddings", self.endpoint.trim_end_matches('/'));
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 404 {
                EmbeddingError::ModelNotFound(self.model.clone())
            } else {
                EmbeddingError::Provider(format!("HTTP {}: {}", status, error_text))
            });
        }

        let body: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Provider(format!("Failed to parse response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(EmbeddingError::Provider("empty embedding in response".to_string()));
        }
        if let Some(expected) = self.dimensions {
            if body.embedding.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: body.embedding.len(),
                });
            }
        }

        Ok(body.embedding)
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Cache
// ============================================================================

pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let hit = self.cache.lock().get(text).cloned();
        if let Some(vector) = hit {
            return Ok(vector);
        }

        // Lock is not held across the provider call; a concurrent miss on the
        // same text embeds twice and the later write wins.
        let vector = self.inner.embed(text).await?;
        debug!(provider = self.inner.name(), "Caching embedding");
        self.cache.lock().put(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn dimensions(&self) -> Option<usize> {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
