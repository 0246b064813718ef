// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Facet similarity index
//!
//! Embeddings of canonical facet labels, partitioned by
//! `(tapestry_id, facet_type)`. Search is exact cosine similarity over the
//! partition; partitions are small enough per tenant and type that a linear
//! pass beats maintaining an ANN structure under relabels.
//!
//! Every entry remembers the label it was embedded from. A facet whose entry
//! is missing, or was embedded from an older label, is stale: it sits out of
//! the query and is handed to the [`StaleIndexLog`] for [`FacetIndex::repair`].

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider};
use crate::domain::errors::{EmbeddingError, NavigatorError, NavigatorResult};
use crate::domain::facet::{Facet, FacetType};
use crate::domain::ids::{FacetId, TapestryId};
use crate::domain::query::{FacetCount, ScoredFacet};
use crate::domain::ranking::{RankBy, RankingEngine};
use crate::infrastructure::link_graph::LinkGraph;
use crate::infrastructure::stale_index::{StaleIndexLog, StaleReason};
use crate::infrastructure::tapestry_store::InMemoryTapestryStore;

struct IndexEntry {
    label: String,
    embedding: Vec<f32>,
}

#[derive(Default)]
struct IndexPartition {
    entries: HashMap<FacetId, IndexEntry>,
    dimensions: Option<usize>,
}

/// Outcome of a [`FacetIndex::repair`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub reindexed: usize,
    /// Logged facets that no longer exist in the store
    pub dropped: usize,
    pub failed: usize,
}

pub struct FacetIndex {
    store: Arc<InMemoryTapestryStore>,
    graph: Arc<LinkGraph>,
    embedder: Arc<dyn EmbeddingProvider>,
    stale_log: Arc<StaleIndexLog>,
    partitions: RwLock<HashMap<(TapestryId, FacetType), IndexPartition>>,
}

impl FacetIndex {
    pub fn new(
        store: Arc<InMemoryTapestryStore>,
        graph: Arc<LinkGraph>,
        embedder: Arc<dyn EmbeddingProvider>,
        stale_log: Arc<StaleIndexLog>,
    ) -> Self {
        Self {
            store,
            graph,
            embedder,
            stale_log,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Embed the facet's canonical label unless its entry is already current.
    ///
    /// Returns whether a new embedding was computed.
    pub async fn index_facet(&self, facet: &Facet) -> NavigatorResult<bool> {
        let key = (facet.tapestry_id.clone(), facet.facet_type);

        let expected_dimensions = {
            let partitions = self.partitions.read().await;
            let partition = partitions.get(&key);
            if partition
                .and_then(|p| p.entries.get(&facet.id))
                .is_some_and(|entry| entry.label == facet.label)
            {
                return Ok(false);
            }
            partition.and_then(|p| p.dimensions).or(self.embedder.dimensions())
        };

        let embedding = self.embedder.embed(&facet.label).await?;
        if let Some(expected) = expected_dimensions {
            if embedding.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                }
                .into());
            }
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(key).or_default();
        partition.dimensions.get_or_insert(embedding.len());
        partition.entries.insert(
            facet.id.clone(),
            IndexEntry {
                label: facet.label.clone(),
                embedding,
            },
        );

        debug!(
            tapestry_id = %facet.tapestry_id,
            facet_id = %facet.id,
            facet_type = %facet.facet_type,
            provider = self.embedder.name(),
            "Indexed facet embedding"
        );
        Ok(true)
    }

    /// [`Self::index_facet`] for ingestion paths that have already committed
    /// the facet: an embedding failure is logged and the facet is handed to
    /// the stale log, so it sits out of search until [`Self::repair`].
    ///
    /// Returns whether a new embedding was computed.
    pub async fn index_or_defer(&self, facet: &Facet) -> bool {
        match self.index_facet(facet).await {
            Ok(computed) => computed,
            Err(e) => {
                let reason = {
                    let partitions = self.partitions.read().await;
                    let indexed = partitions
                        .get(&(facet.tapestry_id.clone(), facet.facet_type))
                        .is_some_and(|p| p.entries.contains_key(&facet.id));
                    if indexed {
                        StaleReason::LabelChanged
                    } else {
                        StaleReason::MissingEntry
                    }
                };
                warn!(
                    tapestry_id = %facet.tapestry_id,
                    facet_id = %facet.id,
                    error = %e,
                    "Deferring facet embedding to repair"
                );
                self.stale_log.record(&facet.tapestry_id, &facet.id, facet.facet_type, reason);
                false
            }
        }
    }

    /// Facets of `facet_type` scoring at least `threshold` against
    /// `query_text`, best first. Equal scores fall back to creation order,
    /// then facet id.
    pub async fn search(
        &self,
        tapestry_id: &TapestryId,
        facet_type: FacetType,
        query_text: &str,
        top_k: usize,
        threshold: f64,
    ) -> NavigatorResult<Vec<ScoredFacet>> {
        let query = self.embedder.embed(query_text).await.map_err(|e| match e {
            EmbeddingError::EmptyInput => {
                NavigatorError::validation("text", "text has no letters or digits to search for")
            }
            other => other.into(),
        })?;
        let facets = self.store.facets_of_type(tapestry_id, facet_type).await;

        let mut stale = Vec::new();
        let candidates: Vec<ScoredFacet> = {
            let partitions = self.partitions.read().await;
            let partition = partitions.get(&(tapestry_id.clone(), facet_type));

            if let Some(expected) = partition.and_then(|p| p.dimensions) {
                if query.len() != expected {
                    return Err(NavigatorError::Embedding(EmbeddingError::DimensionMismatch {
                        expected,
                        actual: query.len(),
                    }));
                }
            }

            facets
                .into_iter()
                .filter_map(|facet| {
                    let entry = match partition.and_then(|p| p.entries.get(&facet.id)) {
                        Some(entry) if entry.label == facet.label => entry,
                        Some(_) => {
                            stale.push((facet.id.clone(), StaleReason::LabelChanged));
                            return None;
                        }
                        None => {
                            stale.push((facet.id.clone(), StaleReason::MissingEntry));
                            return None;
                        }
                    };
                    let score = cosine_similarity(&query, &entry.embedding);
                    (score >= threshold).then_some(ScoredFacet { facet, score })
                })
                .collect()
        };

        for (facet_id, reason) in &stale {
            self.stale_log.record(tapestry_id, facet_id, facet_type, *reason);
        }

        debug!(
            tapestry_id = %tapestry_id,
            facet_type = %facet_type,
            candidates = candidates.len(),
            stale = stale.len(),
            threshold,
            "Scored facet candidates"
        );

        Ok(RankingEngine::top_k(candidates, RankBy::Similarity, top_k))
    }

    /// Facets of `facet_type` by distinct referencing threads, most first.
    /// Facets no thread references yet rank last with a count of zero.
    pub async fn top_by_thread_count(
        &self,
        tapestry_id: &TapestryId,
        facet_type: FacetType,
        top_k: usize,
    ) -> Vec<FacetCount> {
        let facets = self.store.facets_of_type(tapestry_id, facet_type).await;
        let counts = self.graph.thread_counts(tapestry_id, facets.iter().map(|f| &f.id)).await;

        let candidates = facets
            .into_iter()
            .map(|facet| {
                let count = counts.get(&facet.id).copied().unwrap_or(0);
                FacetCount { facet, count }
            })
            .collect();

        RankingEngine::top_k(candidates, RankBy::Count, top_k)
    }

    /// Re-embed every facet the stale log has collected
    pub async fn repair(&self) -> RepairReport {
        let mut report = RepairReport::default();

        for entry in self.stale_log.drain() {
            let facet = match self.store.get_facet(&entry.tapestry_id, &entry.facet_id).await {
                Ok(facet) => facet,
                Err(_) => {
                    report.dropped += 1;
                    continue;
                }
            };

            match self.index_facet(&facet).await {
                Ok(_) => report.reindexed += 1,
                Err(e) => {
                    warn!(
                        tapestry_id = %entry.tapestry_id,
                        facet_id = %entry.facet_id,
                        error = %e,
                        "Failed to repair facet embedding"
                    );
                    self.stale_log
                        .record(&entry.tapestry_id, &entry.facet_id, entry.facet_type, entry.reason);
                    report.failed += 1;
                }
            }
        }

        if report != RepairReport::default() {
            info!(
                reindexed = report.reindexed,
                dropped = report.dropped,
                failed = report.failed,
                "Facet index repair pass complete"
            );
        }
        report
    }

    pub async fn indexed_count(&self, tapestry_id: &TapestryId, facet_type: FacetType) -> usize {
        let partitions = self.partitions.read().await;
        partitions
            .get(&(tapestry_id.clone(), facet_type))
            .map_or(0, |p| p.entries.len())
    }

    pub fn stale_log(&self) -> &StaleIndexLog {
        &self.stale_log
    }
}
