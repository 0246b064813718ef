// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: in-memory graph, similarity index, embedders

pub mod tapestry_store;
pub mod link_graph;
pub mod facet_index;
pub mod stale_index;
pub mod embedding_client;
pub mod snapshot;

pub use tapestry_store::{FacetUpsert, InMemoryTapestryStore, TapestryStats};
pub use link_graph::LinkGraph;
pub use facet_index::{FacetIndex, RepairReport};
pub use stale_index::{StaleEntry, StaleIndexLog, StaleReason};
pub use embedding_client::{CachedEmbedder, HashingEmbedder, OllamaEmbeddingClient};
pub use snapshot::{FacetRecord, FacetRef, LoadReport, MemoryRecord, SnapshotLoader, TapestryRecord, TapestrySnapshot, ThreadRecord};
