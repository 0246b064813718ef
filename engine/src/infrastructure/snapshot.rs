// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Snapshot
//!
//! Declarative tapestry contents (JSON or YAML) and the loader that pushes
//! them through the ingestion path.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Populates store, link graph and facet index from a file
//!
//! Per tapestry the loader commits facets, threads and memories first and
//! links them afterwards, so a concurrent reader never sees an edge whose
//! endpoint is not yet in the store.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{Memory, Thread};
use crate::domain::errors::NavigatorResult;
use crate::domain::facet::FacetType;
use crate::domain::ids::{FacetId, MemoryId, TapestryId, ThreadId};
use crate::infrastructure::facet_index::FacetIndex;
use crate::infrastructure::link_graph::LinkGraph;
use crate::infrastructure::tapestry_store::{FacetUpsert, InMemoryTapestryStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapestrySnapshot {
    #[serde(default)]
    pub tapestries: Vec<TapestryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapestryRecord {
    pub id: TapestryId,
    #[serde(default)]
    pub facets: Vec<FacetRecord>,
    #[serde(default)]
    pub threads: Vec<ThreadRecord>,
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetRecord {
    /// Derived from type and label when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FacetId>,
    #[serde(rename = "type")]
    pub facet_type: FacetType,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

/// A thread's reference to a facet: either a declared id or an inline
/// mention that resolves (or creates) the canonical facet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetRef {
    Id(FacetId),
    Mention {
        #[serde(rename = "type")]
        facet_type: FacetType,
        label: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: ThreadId,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub facets: Vec<FacetRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: MemoryId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub threads: Vec<ThreadId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl TapestrySnapshot {
    /// Read a snapshot; `.json` files are JSON, anything else is YAML
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let snapshot = if is_json {
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON snapshot {:?}", path))?
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML snapshot {:?}", path))?
        };
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub tapestries: usize,
    pub facets_created: usize,
    pub facets_relabelled: usize,
    pub threads: usize,
    pub memories: usize,
    pub facet_links: usize,
    pub memory_links: usize,
    pub embeddings_computed: usize,
}

pub struct SnapshotLoader {
    store: Arc<InMemoryTapestryStore>,
    graph: Arc<LinkGraph>,
    index: Arc<FacetIndex>,
}

impl SnapshotLoader {
    pub fn new(store: Arc<InMemoryTapestryStore>, graph: Arc<LinkGraph>, index: Arc<FacetIndex>) -> Self {
        Self { store, graph, index }
    }

    pub async fn load(&self, snapshot: &TapestrySnapshot) -> NavigatorResult<LoadReport> {
        let mut report = LoadReport::default();

        for record in &snapshot.tapestries {
            self.load_tapestry(record, &mut report).await?;
            report.tapestries += 1;
        }

        info!(
            tapestries = report.tapestries,
            facets = report.facets_created,
            threads = report.threads,
            memories = report.memories,
            edges = report.facet_links + report.memory_links,
            "Loaded tapestry snapshot"
        );
        Ok(report)
    }

    async fn load_tapestry(&self, record: &TapestryRecord, report: &mut LoadReport) -> NavigatorResult<()> {
        let tapestry_id = &record.id;

        for facet in &record.facets {
            self.upsert_facet(tapestry_id, facet.facet_type, &facet.label, facet.created_at, facet.id.clone(), report)
                .await?;
        }

        for thread in &record.threads {
            let mut entity = Thread::new(thread.id.clone(), tapestry_id.clone(), thread.occurred_at);
            entity.properties = thread.properties.clone();
            self.store.insert_thread(entity).await;
            report.threads += 1;
        }

        for memory in &record.memories {
            let mut entity = Memory::new(memory.id.clone(), tapestry_id.clone(), memory.created_at, memory.content.clone());
            entity.properties = memory.properties.clone();
            self.store.insert_memory(entity).await;
            report.memories += 1;
        }

        for thread in &record.threads {
            for facet_ref in &thread.facets {
                let facet_id = match facet_ref {
                    FacetRef::Id(id) => id.clone(),
                    // First mention dates the facet
                    FacetRef::Mention { facet_type, label } => {
                        self.upsert_facet(tapestry_id, *facet_type, label, thread.occurred_at, None, report)
                            .await?
                    }
                };
                self.graph.link_facet_thread(tapestry_id, &facet_id, &thread.id).await?;
                report.facet_links += 1;
            }
        }

        for memory in &record.memories {
            for thread_id in &memory.threads {
                self.graph.link_thread_memory(tapestry_id, thread_id, &memory.id).await?;
                report.memory_links += 1;
            }
        }

        Ok(())
    }

    async fn upsert_facet(
        &self,
        tapestry_id: &TapestryId,
        facet_type: FacetType,
        label: &str,
        created_at: DateTime<Utc>,
        explicit_id: Option<FacetId>,
        report: &mut LoadReport,
    ) -> NavigatorResult<FacetId> {
        let (facet, outcome) = self
            .store
            .upsert_facet(tapestry_id, facet_type, label, created_at, explicit_id)
            .await?;
        match outcome {
            FacetUpsert::Created => report.facets_created += 1,
            FacetUpsert::Relabelled => report.facets_relabelled += 1,
            FacetUpsert::Existing => {}
        }
        if self.index.index_or_defer(&facet).await {
            report.embeddings_computed += 1;
        }
        Ok(facet.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::NavigatorError;
    use crate::infrastructure::embedding_client::HashingEmbedder;
    use crate::infrastructure::stale_index::StaleIndexLog;
    use std::io::Write;

    const SNAPSHOT_YAML: &str = r#"
tapestries:
  - id: T
    facets:
      - id: F1
        type: topics
        label: AI
        created_at: 2023-12-01T00:00:00Z
    threads:
      - id: Th1
        occurred_at: 2024-01-01T00:00:00Z
        facets:
          - F1
          - { type: people, label: Ada Lovelace }
      - id: Th2
        occurred_at: 2024-02-01T00:00:00Z
        facets:
          - F1
          - { type: people, label: "ada  lovelace" }
    memories:
      - id: M1
        created_at: 2024-02-02T00:00:00Z
        content: Notes on attention
        threads: [Th2]
"#;

    fn loader() -> (SnapshotLoader, Arc<InMemoryTapestryStore>, Arc<LinkGraph>) {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = Arc::new(LinkGraph::new(store.clone()));
        let index = Arc::new(FacetIndex::new(
            store.clone(),
            graph.clone(),
            Arc::new(HashingEmbedder::new(64)),
            Arc::new(StaleIndexLog::new()),
        ));
        (SnapshotLoader::new(store.clone(), graph.clone(), index), store, graph)
    }

    #[tokio::test]
    async fn test_load_yaml_snapshot_dedupes_mentions() {
        let snapshot: TapestrySnapshot = serde_yaml::from_str(SNAPSHOT_YAML).unwrap();
        let (loader, store, graph) = loader();

        let report = loader.load(&snapshot).await.unwrap();
        assert_eq!(report.tapestries, 1);
        // F1 plus one canonical person despite two spellings
        assert_eq!(report.facets_created, 2);
        assert_eq!(report.embeddings_computed, 2);
        assert_eq!(report.facet_links, 4);
        assert_eq!(report.memory_links, 1);

        let t = TapestryId::from("T");
        let people = store.facets_of_type(&t, FacetType::People).await;
        assert_eq!(people.len(), 1);
        // Dated by the first mentioning thread
        assert_eq!(people[0].created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let counts = graph.thread_counts(&t, [&people[0].id]).await;
        assert_eq!(counts[&people[0].id], 2);
    }

    #[tokio::test]
    async fn test_dangling_reference_is_rejected() {
        let yaml = r#"
tapestries:
  - id: T
    memories:
      - id: M1
        created_at: 2024-01-01T00:00:00Z
        threads: [missing]
"#;
        let snapshot: TapestrySnapshot = serde_yaml::from_str(yaml).unwrap();
        let (loader, _, _) = loader();
        let err = loader.load(&snapshot).await.unwrap_err();
        assert!(matches!(err, NavigatorError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_declared_ids_with_same_canonical_label_are_rejected() {
        let yaml = r#"
tapestries:
  - id: T
    facets:
      - { id: A, type: topics, label: AI, created_at: 2024-01-01T00:00:00Z }
      - { id: B, type: topics, label: ai, created_at: 2024-01-02T00:00:00Z }
    threads:
      - id: Th1
        occurred_at: 2024-01-03T00:00:00Z
        facets: [B]
"#;
        let snapshot: TapestrySnapshot = serde_yaml::from_str(yaml).unwrap();
        let (loader, store, graph) = loader();

        let err = loader.load(&snapshot).await.unwrap_err();
        match err {
            NavigatorError::Integrity(message) => assert!(message.contains("collides with canonical facet A")),
            other => panic!("unexpected error: {:?}", other),
        }
        let t = TapestryId::from("T");
        assert!(!store.contains_facet(&t, &"B".into()).await);
        assert_eq!(graph.edge_count(&t).await, 0);
    }

    #[test]
    fn test_from_file_by_extension() {
        let snapshot: TapestrySnapshot = serde_yaml::from_str(SNAPSHOT_YAML).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json_file.write_all(json.as_bytes()).unwrap();
        let from_json = TapestrySnapshot::from_file(json_file.path()).unwrap();
        assert_eq!(from_json.tapestries[0].threads.len(), 2);

        let mut yaml_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml_file.write_all(SNAPSHOT_YAML.as_bytes()).unwrap();
        let from_yaml = TapestrySnapshot::from_file(yaml_file.path()).unwrap();
        assert_eq!(from_yaml.tapestries[0].memories[0].content, "Notes on attention");

        assert!(TapestrySnapshot::from_file("/nonexistent/snapshot.yaml").is_err());
    }
}
