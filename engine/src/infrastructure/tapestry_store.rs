// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory tapestry store
//!
//! Owns every facet, thread and memory, partitioned by tapestry. The
//! tapestry id is the first key of every lookup, so an id that exists only
//! under another tapestry is indistinguishable from one that does not exist
//! at all.
//!
//! Readers share the partition lock; only ingestion takes it exclusively.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::errors::{EntityKind, NavigatorError, NavigatorResult};
use crate::domain::facet::{canonical_key, Facet, FacetType};
use crate::domain::entities::{Memory, Thread};
use crate::domain::ids::{FacetId, MemoryId, TapestryId, ThreadId};

#[derive(Default)]
struct TapestryPartition {
    facets: HashMap<FacetId, Facet>,
    facets_by_key: HashMap<String, FacetId>,
    facets_by_type: HashMap<FacetType, BTreeSet<FacetId>>,
    threads: HashMap<ThreadId, Thread>,
    memories: HashMap<MemoryId, Memory>,
}

/// What `upsert_facet` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetUpsert {
    Created,
    /// Mention resolved to an existing canonical facet
    Existing,
    /// Canonical label changed; the embedding must be recomputed
    Relabelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapestryStats {
    pub facets: usize,
    pub threads: usize,
    pub memories: usize,
}

pub struct InMemoryTapestryStore {
    partitions: RwLock<HashMap<TapestryId, TapestryPartition>>,
}

impl InMemoryTapestryStore {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn get_facet(&self, tapestry_id: &TapestryId, facet_id: &FacetId) -> NavigatorResult<Facet> {
        let partitions = self.partitions.read().await;
        partitions
            .get(tapestry_id)
            .and_then(|p| p.facets.get(facet_id))
            .cloned()
            .ok_or_else(|| NavigatorError::not_found(EntityKind::Facet, facet_id))
    }

    pub async fn get_memory(&self, tapestry_id: &TapestryId, memory_id: &MemoryId) -> NavigatorResult<Memory> {
        let partitions = self.partitions.read().await;
        partitions
            .get(tapestry_id)
            .and_then(|p| p.memories.get(memory_id))
            .cloned()
            .ok_or_else(|| NavigatorError::not_found(EntityKind::Memory, memory_id))
    }

    /// Facets of one type, ordered by id. Unknown tapestries yield nothing.
    pub async fn facets_of_type(&self, tapestry_id: &TapestryId, facet_type: FacetType) -> Vec<Facet> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(tapestry_id) else {
            return Vec::new();
        };
        partition
            .facets_by_type
            .get(&facet_type)
            .map(|ids| ids.iter().filter_map(|id| partition.facets.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Batch hydration in input order; ids not (yet) committed are skipped
    pub async fn get_facets<'a>(
        &self,
        tapestry_id: &TapestryId,
        ids: impl IntoIterator<Item = &'a FacetId>,
    ) -> Vec<Facet> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(tapestry_id) else {
            return Vec::new();
        };
        ids.into_iter().filter_map(|id| partition.facets.get(id).cloned()).collect()
    }

    pub async fn get_threads<'a>(
        &self,
        tapestry_id: &TapestryId,
        ids: impl IntoIterator<Item = &'a ThreadId>,
    ) -> Vec<Thread> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(tapestry_id) else {
            return Vec::new();
        };
        ids.into_iter().filter_map(|id| partition.threads.get(id).cloned()).collect()
    }

    pub async fn get_memories<'a>(
        &self,
        tapestry_id: &TapestryId,
        ids: impl IntoIterator<Item = &'a MemoryId>,
    ) -> Vec<Memory> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(tapestry_id) else {
            return Vec::new();
        };
        ids.into_iter().filter_map(|id| partition.memories.get(id).cloned()).collect()
    }

    pub async fn contains_facet(&self, tapestry_id: &TapestryId, facet_id: &FacetId) -> bool {
        let partitions = self.partitions.read().await;
        partitions.get(tapestry_id).is_some_and(|p| p.facets.contains_key(facet_id))
    }

    pub async fn contains_thread(&self, tapestry_id: &TapestryId, thread_id: &ThreadId) -> bool {
        let partitions = self.partitions.read().await;
        partitions.get(tapestry_id).is_some_and(|p| p.threads.contains_key(thread_id))
    }

    pub async fn contains_memory(&self, tapestry_id: &TapestryId, memory_id: &MemoryId) -> bool {
        let partitions = self.partitions.read().await;
        partitions.get(tapestry_id).is_some_and(|p| p.memories.contains_key(memory_id))
    }

    /// Every tapestry holding at least one entity, in id order
    pub async fn tapestry_ids(&self) -> Vec<TapestryId> {
        let partitions = self.partitions.read().await;
        let mut ids: Vec<TapestryId> = partitions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn stats(&self, tapestry_id: &TapestryId) -> TapestryStats {
        let partitions = self.partitions.read().await;
        partitions
            .get(tapestry_id)
            .map(|p| TapestryStats {
                facets: p.facets.len(),
                threads: p.threads.len(),
                memories: p.memories.len(),
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Create or resolve a canonical facet.
    ///
    /// Without an explicit id the facet id is derived from its canonical
    /// key, so repeated mentions land on the same facet. With an explicit id
    /// that already exists, a changed label relabels the facet; a changed
    /// type is rejected. An explicit id whose label resolves to another
    /// facet is rejected rather than silently merged.
    pub async fn upsert_facet(
        &self,
        tapestry_id: &TapestryId,
        facet_type: FacetType,
        label: &str,
        created_at: DateTime<Utc>,
        explicit_id: Option<FacetId>,
    ) -> NavigatorResult<(Facet, FacetUpsert)> {
        let label = label.trim();
        if label.is_empty() {
            return Err(NavigatorError::validation("label", "facet label cannot be empty"));
        }
        if !label.chars().any(char::is_alphanumeric) {
            return Err(NavigatorError::validation(
                "label",
                format!("facet label '{}' has no letters or digits", label),
            ));
        }

        let key = canonical_key(facet_type, label);
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(tapestry_id.clone()).or_default();

        if let Some(id) = explicit_id.as_ref() {
            if let Some(existing) = partition.facets.get(id).cloned() {
                if existing.facet_type != facet_type {
                    return Err(NavigatorError::Integrity(format!(
                        "facet {} is of type '{}' and cannot become '{}'",
                        id, existing.facet_type, facet_type
                    )));
                }
                if existing.label == label {
                    return Ok((existing, FacetUpsert::Existing));
                }

                let old_key = existing.canonical_key();
                if old_key != key {
                    if let Some(other) = partition.facets_by_key.get(&key) {
                        return Err(NavigatorError::Integrity(format!(
                            "relabelling facet {} to '{}' collides with facet {}",
                            id, label, other
                        )));
                    }
                    partition.facets_by_key.remove(&old_key);
                    partition.facets_by_key.insert(key, id.clone());
                }

                let facet = partition
                    .facets
                    .get_mut(id)
                    .ok_or_else(|| NavigatorError::not_found(EntityKind::Facet, id))?;
                debug!(facet_id = %id, old_label = %facet.label, new_label = %label, "Relabelling facet");
                facet.label = label.to_string();
                return Ok((facet.clone(), FacetUpsert::Relabelled));
            }
        }

        if let Some(existing_id) = partition.facets_by_key.get(&key) {
            if let Some(existing) = partition.facets.get(existing_id) {
                if let Some(id) = explicit_id.as_ref() {
                    return Err(NavigatorError::Integrity(format!(
                        "facet {} ('{}') collides with canonical facet {} ('{}')",
                        id, label, existing.id, existing.label
                    )));
                }
                return Ok((existing.clone(), FacetUpsert::Existing));
            }
        }

        let id = explicit_id.unwrap_or_else(|| FacetId::canonical(tapestry_id, &key));
        let facet = Facet::new(id.clone(), tapestry_id.clone(), facet_type, label, created_at);
        partition.facets_by_key.insert(key, id.clone());
        partition.facets_by_type.entry(facet_type).or_default().insert(id.clone());
        partition.facets.insert(id, facet.clone());

        Ok((facet, FacetUpsert::Created))
    }

    /// Insert or replace a thread under its own tapestry
    pub async fn insert_thread(&self, thread: Thread) {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(thread.tapestry_id.clone())
            .or_default()
            .threads
            .insert(thread.id.clone(), thread);
    }

    /// Insert or replace a memory under its own tapestry
    pub async fn insert_memory(&self, memory: Memory) {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(memory.tapestry_id.clone())
            .or_default()
            .memories
            .insert(memory.id.clone(), memory);
    }
}

impl Default for InMemoryTapestryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_deduplicates_by_canonical_identity() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");

        let (first, outcome) = store.upsert_facet(&t, FacetType::Companies, "Acme Corp", ts(1), None).await.unwrap();
        assert_eq!(outcome, FacetUpsert::Created);

        let (second, outcome) = store.upsert_facet(&t, FacetType::Companies, "acme  corp", ts(2), None).await.unwrap();
        assert_eq!(outcome, FacetUpsert::Existing);
        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, ts(1));

        // Same label under another type is a different facet
        let (other, _) = store.upsert_facet(&t, FacetType::Products, "Acme Corp", ts(1), None).await.unwrap();
        assert_ne!(other.id, first.id);
        assert_eq!(store.stats(&t).await.facets, 2);
    }

    #[tokio::test]
    async fn test_explicit_id_colliding_with_canonical_facet_is_rejected() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");

        store.upsert_facet(&t, FacetType::Topics, "AI", ts(1), Some("A".into())).await.unwrap();
        let err = store
            .upsert_facet(&t, FacetType::Topics, "ai", ts(2), Some("B".into()))
            .await
            .unwrap_err();
        match err {
            NavigatorError::Integrity(message) => {
                assert!(message.contains("B"));
                assert!(message.contains("A"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!store.contains_facet(&t, &"B".into()).await);
        assert_eq!(store.stats(&t).await.facets, 1);

        // Re-declaring the same id and label is still idempotent
        let (same, outcome) = store
            .upsert_facet(&t, FacetType::Topics, "AI", ts(3), Some("A".into()))
            .await
            .unwrap();
        assert_eq!(outcome, FacetUpsert::Existing);
        assert_eq!(same.id, FacetId::from("A"));
    }

    #[tokio::test]
    async fn test_facet_type_is_immutable() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");
        let id = FacetId::from("f1");

        store.upsert_facet(&t, FacetType::Topics, "AI", ts(1), Some(id.clone())).await.unwrap();
        let err = store
            .upsert_facet(&t, FacetType::People, "AI", ts(1), Some(id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, NavigatorError::Integrity(_)));
        assert_eq!(store.get_facet(&t, &id).await.unwrap().facet_type, FacetType::Topics);
    }

    #[tokio::test]
    async fn test_relabel_updates_canonical_index() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");
        let id = FacetId::from("f1");

        store.upsert_facet(&t, FacetType::Topics, "AI", ts(1), Some(id.clone())).await.unwrap();
        let (facet, outcome) = store
            .upsert_facet(&t, FacetType::Topics, "Artificial Intelligence", ts(1), Some(id.clone()))
            .await
            .unwrap();
        assert_eq!(outcome, FacetUpsert::Relabelled);
        assert_eq!(facet.label, "Artificial Intelligence");

        // The new label now resolves to the same facet; the old one is free
        let (resolved, outcome) = store
            .upsert_facet(&t, FacetType::Topics, "artificial intelligence", ts(3), None)
            .await
            .unwrap();
        assert_eq!(outcome, FacetUpsert::Existing);
        assert_eq!(resolved.id, id);

        let (fresh, outcome) = store.upsert_facet(&t, FacetType::Topics, "AI", ts(3), None).await.unwrap();
        assert_eq!(outcome, FacetUpsert::Created);
        assert_ne!(fresh.id, id);
    }

    #[tokio::test]
    async fn test_rejects_empty_label() {
        let store = InMemoryTapestryStore::new();
        let err = store
            .upsert_facet(&"t".into(), FacetType::Topics, "   ", ts(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, NavigatorError::Validation { field: "label", .. }));
    }

    #[tokio::test]
    async fn test_rejects_punctuation_only_label_before_commit() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");
        for label in ["!!!", "#", " ... "] {
            let err = store
                .upsert_facet(&t, FacetType::Companies, label, ts(1), None)
                .await
                .unwrap_err();
            assert!(matches!(err, NavigatorError::Validation { field: "label", .. }));
        }
        assert_eq!(store.stats(&t).await, TapestryStats::default());
        assert!(store.tapestry_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_tapestry_ids_and_stats() {
        let store = InMemoryTapestryStore::new();
        store.upsert_facet(&"b".into(), FacetType::Topics, "AI", ts(1), None).await.unwrap();
        store.insert_thread(Thread::new("th1".into(), "a".into(), ts(1))).await;
        store.insert_memory(Memory::new("m1".into(), "a".into(), ts(1), "note")).await;

        assert_eq!(store.tapestry_ids().await, vec![TapestryId::from("a"), TapestryId::from("b")]);
        assert_eq!(
            store.stats(&"a".into()).await,
            TapestryStats {
                facets: 0,
                threads: 1,
                memories: 1
            }
        );
        assert!(store.contains_thread(&"a".into(), &"th1".into()).await);
        assert!(!store.contains_thread(&"b".into(), &"th1".into()).await);
    }

    #[tokio::test]
    async fn test_cross_tapestry_lookup_is_not_found() {
        let store = InMemoryTapestryStore::new();
        let t1 = TapestryId::from("t1");
        let t2 = TapestryId::from("t2");
        let id = FacetId::from("shared-looking-id");

        store.upsert_facet(&t1, FacetType::Topics, "AI", ts(1), Some(id.clone())).await.unwrap();
        store.insert_memory(Memory::new("m1".into(), t1.clone(), ts(1), "note")).await;

        assert!(store.get_facet(&t1, &id).await.is_ok());
        assert!(matches!(
            store.get_facet(&t2, &id).await,
            Err(NavigatorError::NotFound { kind: EntityKind::Facet, .. })
        ));
        assert!(matches!(
            store.get_memory(&t2, &"m1".into()).await,
            Err(NavigatorError::NotFound { kind: EntityKind::Memory, .. })
        ));
        assert!(store.facets_of_type(&t2, FacetType::Topics).await.is_empty());
        assert!(store.get_facets(&t2, [&id]).await.is_empty());
    }

    #[tokio::test]
    async fn test_facets_of_type_ordered_by_id() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");
        for (id, label) in [("f3", "c"), ("f1", "a"), ("f2", "b")] {
            store.upsert_facet(&t, FacetType::Topics, label, ts(1), Some(id.into())).await.unwrap();
        }
        store.upsert_facet(&t, FacetType::People, "Ada", ts(1), Some("p1".into())).await.unwrap();

        let ids: Vec<String> = store
            .facets_of_type(&t, FacetType::Topics)
            .await
            .into_iter()
            .map(|f| f.id.0)
            .collect();
        assert_eq!(ids, vec!["f1", "f2", "f3"]);
    }

    #[tokio::test]
    async fn test_batch_hydration_skips_missing() {
        let store = InMemoryTapestryStore::new();
        let t = TapestryId::from("t");
        store.insert_thread(Thread::new("th1".into(), t.clone(), ts(1))).await;
        store.insert_thread(Thread::new("th2".into(), t.clone(), ts(2))).await;

        let wanted = [ThreadId::from("th2"), ThreadId::from("ghost"), ThreadId::from("th1")];
        let threads = store.get_threads(&t, wanted.iter()).await;
        let ids: Vec<&str> = threads.iter().map(|th| th.id.as_str()).collect();
        assert_eq!(ids, vec!["th2", "th1"]);
    }
}
