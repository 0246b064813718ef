// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine Factory - Application Layer
//!
//! Wires the store, link graph, facet index and query facade together from
//! a [`NavigatorConfig`], and exposes the ingestion calls an external
//! extraction pipeline uses to populate them.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Composition root for the engine

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::application::navigator_service::{NavigatorService, StandardNavigatorService};
use crate::domain::config::{EmbeddingConfig, EmbeddingProviderKind, NavigatorConfig};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::entities::{Memory, Thread};
use crate::domain::errors::NavigatorResult;
use crate::domain::facet::{Facet, FacetType};
use crate::domain::ids::{FacetId, MemoryId, TapestryId, ThreadId};
use crate::infrastructure::{
    CachedEmbedder, FacetIndex, HashingEmbedder, InMemoryTapestryStore, LinkGraph, LoadReport,
    OllamaEmbeddingClient, SnapshotLoader, StaleIndexLog, TapestrySnapshot,
};

/// Creates the embedding provider selected by configuration, behind an LRU
/// cache unless `cache_capacity` is zero
pub fn create_embedding_provider(config: &EmbeddingConfig) -> Arc<dyn EmbeddingProvider> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
        EmbeddingProviderKind::Ollama => Arc::new(
            OllamaEmbeddingClient::new(config.endpoint.clone(), config.model.clone())
                .with_dimensions(config.dimensions),
        ),
    };

    match NonZeroUsize::new(config.cache_capacity) {
        Some(capacity) => Arc::new(CachedEmbedder::new(provider, capacity)),
        None => provider,
    }
}

/// A fully wired engine instance
pub struct TapestryEngine {
    pub store: Arc<InMemoryTapestryStore>,
    pub graph: Arc<LinkGraph>,
    pub index: Arc<FacetIndex>,
    pub stale_log: Arc<StaleIndexLog>,
    pub service: Arc<StandardNavigatorService>,
}

impl TapestryEngine {
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::with_embedder(config, create_embedding_provider(&config.embedding))
    }

    pub fn with_embedder(config: &NavigatorConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = Arc::new(LinkGraph::new(store.clone()));
        let stale_log = Arc::new(StaleIndexLog::new());
        let index = Arc::new(FacetIndex::new(store.clone(), graph.clone(), embedder, stale_log.clone()));
        let service = Arc::new(StandardNavigatorService::new(index.clone(), graph.clone(), config));

        Self {
            store,
            graph,
            index,
            stale_log,
            service,
        }
    }

    pub fn navigator(&self) -> Arc<dyn NavigatorService> {
        self.service.clone()
    }

    pub async fn load_snapshot(&self, snapshot: &TapestrySnapshot) -> NavigatorResult<LoadReport> {
        SnapshotLoader::new(self.store.clone(), self.graph.clone(), self.index.clone())
            .load(snapshot)
            .await
    }

    pub async fn load_snapshot_file(&self, path: impl AsRef<Path>) -> anyhow::Result<LoadReport> {
        let path = path.as_ref();
        info!("Loading tapestry snapshot from {:?}", path);
        let snapshot = TapestrySnapshot::from_file(path)?;
        self.load_snapshot(&snapshot)
            .await
            .with_context(|| format!("Failed to ingest snapshot {:?}", path))
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Commit a facet and bring its embedding up to date. A facet whose
    /// embedding fails stays committed and waits in the stale log.
    pub async fn upsert_facet(
        &self,
        tapestry_id: &TapestryId,
        facet_type: FacetType,
        label: &str,
        created_at: DateTime<Utc>,
        explicit_id: Option<FacetId>,
    ) -> NavigatorResult<Facet> {
        let (facet, _) = self
            .store
            .upsert_facet(tapestry_id, facet_type, label, created_at, explicit_id)
            .await?;
        self.index.index_or_defer(&facet).await;
        Ok(facet)
    }

    pub async fn insert_thread(&self, thread: Thread) {
        self.store.insert_thread(thread).await;
    }

    pub async fn insert_memory(&self, memory: Memory) {
        self.store.insert_memory(memory).await;
    }

    pub async fn link_facet_thread(
        &self,
        tapestry_id: &TapestryId,
        facet_id: &FacetId,
        thread_id: &ThreadId,
    ) -> NavigatorResult<u64> {
        self.graph.link_facet_thread(tapestry_id, facet_id, thread_id).await
    }

    pub async fn link_thread_memory(
        &self,
        tapestry_id: &TapestryId,
        thread_id: &ThreadId,
        memory_id: &MemoryId,
    ) -> NavigatorResult<u64> {
        self.graph.link_thread_memory(tapestry_id, thread_id, memory_id).await
    }
}
