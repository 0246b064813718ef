// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Link Graph
//!
//! Facet↔thread and thread↔memory adjacency, partitioned by tapestry.
//!
//! Edge counts live in an arena per tapestry; four endpoint indices point into it,
//! so every traversal starts from the source node's own adjacency and only
//! touches its local neighbourhood:
//!
//! - facet → threads → facets            (`neighbour_facets`)
//! - facet → threads → memories          (`memories_for_facet`)
//! - memory → threads → facets → threads → memories (`neighbour_memories`)
//!
//! Memory↔facet relationships are never stored; they fall out of the
//! thread hop. Entities are hydrated from the tapestry store after the
//! adjacency walk, and anything the store does not (yet) hold is dropped,
//! so a reader never sees a dangling reference.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{Memory, Thread};
use crate::domain::errors::{NavigatorError, NavigatorResult};
use crate::domain::facet::FacetType;
use crate::domain::ids::{FacetId, MemoryId, TapestryId, ThreadId};
use crate::domain::query::{FacetNeighbour, MemoryNeighbour};
use crate::domain::ranking::{RankBy, RankingEngine};
use crate::domain::time_range::TimeRange;
use crate::infrastructure::tapestry_store::InMemoryTapestryStore;

type EdgeIx = usize;

#[derive(Default)]
struct GraphPartition {
    /// Aggregate count per edge; repeats bump the count instead of adding edges
    edges: Vec<u64>,
    facet_threads: HashMap<FacetId, BTreeMap<ThreadId, EdgeIx>>,
    thread_facets: HashMap<ThreadId, BTreeMap<FacetId, EdgeIx>>,
    thread_memories: HashMap<ThreadId, BTreeMap<MemoryId, EdgeIx>>,
    memory_threads: HashMap<MemoryId, BTreeMap<ThreadId, EdgeIx>>,
}

impl GraphPartition {
    fn threads_of_facet(&self, facet_id: &FacetId) -> Vec<ThreadId> {
        self.facet_threads
            .get(facet_id)
            .map(|threads| threads.keys().cloned().collect())
            .unwrap_or_default()
    }
}

pub struct LinkGraph {
    store: Arc<InMemoryTapestryStore>,
    partitions: RwLock<HashMap<TapestryId, GraphPartition>>,
}

impl LinkGraph {
    pub fn new(store: Arc<InMemoryTapestryStore>) -> Self {
        Self {
            store,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Record that `thread_id` references `facet_id`. Both must already be
    /// committed to the store. Returns the aggregate count for the pair.
    pub async fn link_facet_thread(
        &self,
        tapestry_id: &TapestryId,
        facet_id: &FacetId,
        thread_id: &ThreadId,
    ) -> NavigatorResult<u64> {
        if !self.store.contains_facet(tapestry_id, facet_id).await {
            return Err(NavigatorError::Integrity(format!(
                "cannot link thread {} to uncommitted facet {}",
                thread_id, facet_id
            )));
        }
        if !self.store.contains_thread(tapestry_id, thread_id).await {
            return Err(NavigatorError::Integrity(format!(
                "cannot link facet {} to uncommitted thread {}",
                facet_id, thread_id
            )));
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(tapestry_id.clone()).or_default();

        if let Some(&ix) = partition.facet_threads.get(facet_id).and_then(|t| t.get(thread_id)) {
            let count = &mut partition.edges[ix];
            *count += 1;
            return Ok(*count);
        }

        let ix = partition.edges.len();
        partition.edges.push(1);
        partition.facet_threads.entry(facet_id.clone()).or_default().insert(thread_id.clone(), ix);
        partition.thread_facets.entry(thread_id.clone()).or_default().insert(facet_id.clone(), ix);

        Ok(1)
    }

    /// Record that `memory_id` belongs to `thread_id`. Both must already be
    /// committed to the store. Returns the aggregate count for the pair.
    pub async fn link_thread_memory(
        &self,
        tapestry_id: &TapestryId,
        thread_id: &ThreadId,
        memory_id: &MemoryId,
    ) -> NavigatorResult<u64> {
        if !self.store.contains_thread(tapestry_id, thread_id).await {
            return Err(NavigatorError::Integrity(format!(
                "cannot link memory {} to uncommitted thread {}",
                memory_id, thread_id
            )));
        }
        if !self.store.contains_memory(tapestry_id, memory_id).await {
            return Err(NavigatorError::Integrity(format!(
                "cannot link thread {} to uncommitted memory {}",
                thread_id, memory_id
            )));
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(tapestry_id.clone()).or_default();

        if let Some(&ix) = partition.thread_memories.get(thread_id).and_then(|m| m.get(memory_id)) {
            let count = &mut partition.edges[ix];
            *count += 1;
            return Ok(*count);
        }

        let ix = partition.edges.len();
        partition.edges.push(1);
        partition.thread_memories.entry(thread_id.clone()).or_default().insert(memory_id.clone(), ix);
        partition.memory_threads.entry(memory_id.clone()).or_default().insert(thread_id.clone(), ix);

        Ok(1)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Distinct threads referencing each facet
    pub async fn thread_counts<'a>(
        &self,
        tapestry_id: &TapestryId,
        facet_ids: impl IntoIterator<Item = &'a FacetId>,
    ) -> HashMap<FacetId, u64> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(tapestry_id) else {
            return HashMap::new();
        };
        facet_ids
            .into_iter()
            .map(|id| {
                let count = partition.facet_threads.get(id).map_or(0, |t| t.len() as u64);
                (id.clone(), count)
            })
            .collect()
    }

    /// Distinct edges of both kinds
    pub async fn edge_count(&self, tapestry_id: &TapestryId) -> usize {
        let partitions = self.partitions.read().await;
        partitions.get(tapestry_id).map_or(0, |p| p.edges.len())
    }

    /// Threads linked to a facet within `range`, most recent first
    pub async fn threads_for_facet(
        &self,
        facet_id: &FacetId,
        tapestry_id: &TapestryId,
        limit: usize,
        range: TimeRange,
    ) -> NavigatorResult<Vec<Thread>> {
        let threads = self.linked_threads_in_range(facet_id, tapestry_id, range).await?;
        Ok(RankingEngine::top_k(threads, RankBy::Recency, limit))
    }

    /// Memories reachable through the facet's threads, filtered on the
    /// thread's timestamp. A memory reached through several threads appears
    /// once, at the position of its most recent linking thread.
    pub async fn memories_for_facet(
        &self,
        facet_id: &FacetId,
        tapestry_id: &TapestryId,
        limit: usize,
        range: TimeRange,
    ) -> NavigatorResult<Vec<Memory>> {
        let threads = self.linked_threads_in_range(facet_id, tapestry_id, range).await?;
        let threads = RankingEngine::top_k(threads, RankBy::Recency, usize::MAX);

        let ordered_ids: Vec<MemoryId> = {
            let partitions = self.partitions.read().await;
            let Some(partition) = partitions.get(tapestry_id) else {
                return Ok(Vec::new());
            };
            let mut seen = HashSet::new();
            threads
                .iter()
                .filter_map(|thread| partition.thread_memories.get(&thread.id))
                .flat_map(|memories| memories.keys())
                .filter(|id| seen.insert(*id))
                .cloned()
                .collect()
        };

        let mut memories = self.store.get_memories(tapestry_id, ordered_ids.iter()).await;
        memories.truncate(limit);
        Ok(memories)
    }

    /// Facets of `neighbour_type` sharing at least one in-range thread with
    /// the source facet, by distinct shared threads. The source is excluded.
    pub async fn neighbour_facets(
        &self,
        facet_id: &FacetId,
        neighbour_type: FacetType,
        tapestry_id: &TapestryId,
        top_k: usize,
        range: TimeRange,
    ) -> NavigatorResult<Vec<FacetNeighbour>> {
        let threads = self.linked_threads_in_range(facet_id, tapestry_id, range).await?;

        let shared: HashMap<FacetId, u64> = {
            let partitions = self.partitions.read().await;
            let Some(partition) = partitions.get(tapestry_id) else {
                return Ok(Vec::new());
            };
            let mut shared = HashMap::new();
            for thread in &threads {
                let Some(co_facets) = partition.thread_facets.get(&thread.id) else {
                    continue;
                };
                for co_facet in co_facets.keys().filter(|id| *id != facet_id) {
                    *shared.entry(co_facet.clone()).or_insert(0) += 1;
                }
            }
            shared
        };

        debug!(
            facet_id = %facet_id,
            threads = threads.len(),
            candidates = shared.len(),
            "Collected co-occurring facets"
        );

        let candidates: Vec<FacetNeighbour> = self
            .store
            .get_facets(tapestry_id, shared.keys())
            .await
            .into_iter()
            .filter(|facet| facet.facet_type == neighbour_type)
            .map(|facet| {
                let shared_thread_count = shared.get(&facet.id).copied().unwrap_or(0);
                FacetNeighbour { facet, shared_thread_count }
            })
            .collect();

        Ok(RankingEngine::top_k(candidates, RankBy::Count, top_k))
    }

    /// Memories sharing facets of `facet_type` with the source memory,
    /// ranked by the number of distinct shared facets. The source is excluded.
    pub async fn neighbour_memories(
        &self,
        memory_id: &MemoryId,
        facet_type: FacetType,
        tapestry_id: &TapestryId,
        top_k: usize,
    ) -> NavigatorResult<Vec<MemoryNeighbour>> {
        self.store.get_memory(tapestry_id, memory_id).await?;

        // memory → threads → facets
        let source_facet_ids: Vec<FacetId> = {
            let partitions = self.partitions.read().await;
            let Some(partition) = partitions.get(tapestry_id) else {
                return Ok(Vec::new());
            };
            let mut facet_ids: Vec<FacetId> = partition
                .memory_threads
                .get(memory_id)
                .into_iter()
                .flat_map(|threads| threads.keys())
                .filter_map(|thread_id| partition.thread_facets.get(thread_id))
                .flat_map(|facets| facets.keys().cloned())
                .collect();
            facet_ids.sort();
            facet_ids.dedup();
            facet_ids
        };

        let source_facets: Vec<FacetId> = self
            .store
            .get_facets(tapestry_id, source_facet_ids.iter())
            .await
            .into_iter()
            .filter(|facet| facet.facet_type == facet_type)
            .map(|facet| facet.id)
            .collect();

        // facets → threads → memories
        let shared: HashMap<MemoryId, HashSet<FacetId>> = {
            let partitions = self.partitions.read().await;
            let Some(partition) = partitions.get(tapestry_id) else {
                return Ok(Vec::new());
            };
            let mut shared: HashMap<MemoryId, HashSet<FacetId>> = HashMap::new();
            for facet_id in &source_facets {
                let reachable = partition
                    .facet_threads
                    .get(facet_id)
                    .into_iter()
                    .flat_map(|threads| threads.keys())
                    .filter_map(|thread_id| partition.thread_memories.get(thread_id))
                    .flat_map(|memories| memories.keys())
                    .filter(|other| *other != memory_id);
                for other in reachable {
                    shared.entry(other.clone()).or_default().insert(facet_id.clone());
                }
            }
            shared
        };

        let candidates: Vec<MemoryNeighbour> = self
            .store
            .get_memories(tapestry_id, shared.keys())
            .await
            .into_iter()
            .map(|memory| {
                let shared_facet_count = shared.get(&memory.id).map_or(0, |f| f.len() as u64);
                MemoryNeighbour { memory, shared_facet_count }
            })
            .collect();

        Ok(RankingEngine::top_k(candidates, RankBy::Count, top_k))
    }

    /// Verify the facet, then hydrate its threads that fall inside `range`
    async fn linked_threads_in_range(
        &self,
        facet_id: &FacetId,
        tapestry_id: &TapestryId,
        range: TimeRange,
    ) -> NavigatorResult<Vec<Thread>> {
        self.store.get_facet(tapestry_id, facet_id).await?;

        let thread_ids = {
            let partitions = self.partitions.read().await;
            partitions
                .get(tapestry_id)
                .map(|p| p.threads_of_facet(facet_id))
                .unwrap_or_default()
        };

        Ok(self
            .store
            .get_threads(tapestry_id, thread_ids.iter())
            .await
            .into_iter()
            .filter(|thread| range.contains(thread.occurred_at))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::EntityKind;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, 0, 0, 0).unwrap()
    }

    async fn facet(store: &InMemoryTapestryStore, t: &TapestryId, id: &str, ty: FacetType) -> FacetId {
        let (facet, _) = store.upsert_facet(t, ty, id, day(1, 1), Some(id.into())).await.unwrap();
        facet.id
    }

    async fn thread(store: &InMemoryTapestryStore, t: &TapestryId, id: &str, at: DateTime<Utc>) -> ThreadId {
        store.insert_thread(Thread::new(id.into(), t.clone(), at)).await;
        id.into()
    }

    async fn memory(store: &InMemoryTapestryStore, t: &TapestryId, id: &str, at: DateTime<Utc>) -> MemoryId {
        store.insert_memory(Memory::new(id.into(), t.clone(), at, id)).await;
        id.into()
    }

    fn ids<T, F: Fn(&T) -> &str>(items: &[T], f: F) -> Vec<String> {
        items.iter().map(|i| f(i).to_string()).collect()
    }

    #[tokio::test]
    async fn test_repeated_links_increment_count() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("t");
        let f = facet(&store, &t, "f1", FacetType::Topics).await;
        let th = thread(&store, &t, "th1", day(1, 1)).await;

        assert_eq!(graph.link_facet_thread(&t, &f, &th).await.unwrap(), 1);
        assert_eq!(graph.link_facet_thread(&t, &f, &th).await.unwrap(), 2);
        assert_eq!(graph.edge_count(&t).await, 1);
        assert_eq!(graph.link_facet_thread(&t, &f, &th).await.unwrap(), 3);
        assert_eq!(graph.thread_counts(&t, [&f]).await[&f], 1);
    }

    #[tokio::test]
    async fn test_rejects_dangling_links() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("t");
        let f = facet(&store, &t, "f1", FacetType::Topics).await;

        let err = graph.link_facet_thread(&t, &f, &"missing".into()).await.unwrap_err();
        assert!(matches!(err, NavigatorError::Integrity(_)));

        let th = thread(&store, &t, "th1", day(1, 1)).await;
        let err = graph.link_thread_memory(&t, &th, &"missing".into()).await.unwrap_err();
        assert!(matches!(err, NavigatorError::Integrity(_)));

        // Entities from another tapestry are as good as missing
        let other = TapestryId::from("other");
        assert!(graph.link_facet_thread(&other, &f, &th).await.is_err());
        assert_eq!(graph.edge_count(&t).await, 0);
    }

    #[tokio::test]
    async fn test_threads_for_facet_most_recent_first() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("T");
        let f1 = facet(&store, &t, "F1", FacetType::Topics).await;
        let th1 = thread(&store, &t, "Th1", day(1, 1)).await;
        let th2 = thread(&store, &t, "Th2", day(2, 1)).await;
        graph.link_facet_thread(&t, &f1, &th1).await.unwrap();
        graph.link_facet_thread(&t, &f1, &th2).await.unwrap();

        let threads = graph.threads_for_facet(&f1, &t, 10, TimeRange::unbounded()).await.unwrap();
        assert_eq!(ids(&threads, |th| th.id.as_str()), vec!["Th2", "Th1"]);

        let limited = graph.threads_for_facet(&f1, &t, 1, TimeRange::unbounded()).await.unwrap();
        assert_eq!(ids(&limited, |th| th.id.as_str()), vec!["Th2"]);

        let january = TimeRange::new(Some(day(1, 1)), Some(day(1, 31))).unwrap();
        let filtered = graph.threads_for_facet(&f1, &t, 10, january).await.unwrap();
        assert_eq!(ids(&filtered, |th| th.id.as_str()), vec!["Th1"]);
    }

    #[tokio::test]
    async fn test_replaced_thread_timestamp_drives_order_and_window() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("T");
        let f1 = facet(&store, &t, "F1", FacetType::Topics).await;
        let th1 = thread(&store, &t, "Th1", day(1, 1)).await;
        let th2 = thread(&store, &t, "Th2", day(2, 1)).await;
        graph.link_facet_thread(&t, &f1, &th1).await.unwrap();
        graph.link_facet_thread(&t, &f1, &th2).await.unwrap();

        // Re-ingesting Th1 moves it to March; existing links follow the store
        thread(&store, &t, "Th1", day(3, 1)).await;

        let threads = graph.threads_for_facet(&f1, &t, 10, TimeRange::unbounded()).await.unwrap();
        assert_eq!(ids(&threads, |th| th.id.as_str()), vec!["Th1", "Th2"]);

        let january = TimeRange::new(Some(day(1, 1)), Some(day(1, 31))).unwrap();
        let filtered = graph.threads_for_facet(&f1, &t, 10, january).await.unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_facet_is_not_found() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store);
        let err = graph
            .threads_for_facet(&"nope".into(), &"t".into(), 10, TimeRange::unbounded())
            .await
            .unwrap_err();
        assert!(matches!(err, NavigatorError::NotFound { kind: EntityKind::Facet, .. }));
    }

    #[tokio::test]
    async fn test_memories_for_facet_dedup_and_filter_on_thread_time() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("t");
        let f = facet(&store, &t, "f", FacetType::Topics).await;
        let old = thread(&store, &t, "old", day(1, 5)).await;
        let new = thread(&store, &t, "new", day(3, 5)).await;
        // Memory timestamps deliberately disagree with thread timestamps
        let m_shared = memory(&store, &t, "m-shared", day(12, 1)).await;
        let m_old = memory(&store, &t, "m-old", day(12, 2)).await;
        let m_new = memory(&store, &t, "m-new", day(1, 1)).await;

        graph.link_facet_thread(&t, &f, &old).await.unwrap();
        graph.link_facet_thread(&t, &f, &new).await.unwrap();
        graph.link_thread_memory(&t, &old, &m_old).await.unwrap();
        graph.link_thread_memory(&t, &old, &m_shared).await.unwrap();
        graph.link_thread_memory(&t, &new, &m_shared).await.unwrap();
        graph.link_thread_memory(&t, &new, &m_new).await.unwrap();

        let all = graph.memories_for_facet(&f, &t, 10, TimeRange::unbounded()).await.unwrap();
        assert_eq!(ids(&all, |m| m.id.as_str()), vec!["m-new", "m-shared", "m-old"]);

        let only_old = TimeRange::new(None, Some(day(2, 1))).unwrap();
        let filtered = graph.memories_for_facet(&f, &t, 10, only_old).await.unwrap();
        assert_eq!(ids(&filtered, |m| m.id.as_str()), vec!["m-old", "m-shared"]);

        let limited = graph.memories_for_facet(&f, &t, 2, TimeRange::unbounded()).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_neighbour_facets_counts_distinct_shared_threads() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("T");
        let f1 = facet(&store, &t, "F1", FacetType::Topics).await;
        let f2 = facet(&store, &t, "F2", FacetType::Topics).await;
        let p1 = facet(&store, &t, "P1", FacetType::People).await;
        let p2 = facet(&store, &t, "P2", FacetType::People).await;
        let th1 = thread(&store, &t, "Th1", day(1, 1)).await;
        let th2 = thread(&store, &t, "Th2", day(2, 1)).await;
        let th3 = thread(&store, &t, "Th3", day(3, 1)).await;

        for th in [&th1, &th2] {
            graph.link_facet_thread(&t, &f1, th).await.unwrap();
            graph.link_facet_thread(&t, &p1, th).await.unwrap();
        }
        // Repeated mention must not inflate the distinct-thread count
        graph.link_facet_thread(&t, &p1, &th1).await.unwrap();
        graph.link_facet_thread(&t, &f2, &th2).await.unwrap();
        graph.link_facet_thread(&t, &p2, &th3).await.unwrap();

        let people = graph
            .neighbour_facets(&f1, FacetType::People, &t, 5, TimeRange::unbounded())
            .await
            .unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].facet.id, p1);
        assert_eq!(people[0].shared_thread_count, 2);

        // Same type as the source: the source itself never appears
        let topics = graph
            .neighbour_facets(&f1, FacetType::Topics, &t, 5, TimeRange::unbounded())
            .await
            .unwrap();
        assert_eq!(ids(&topics, |n| n.facet.id.as_str()), vec!["F2"]);

        let february = TimeRange::new(Some(day(2, 1)), None).unwrap();
        let in_range = graph
            .neighbour_facets(&f1, FacetType::People, &t, 5, february)
            .await
            .unwrap();
        assert_eq!(in_range[0].shared_thread_count, 1);
    }

    #[tokio::test]
    async fn test_neighbour_memories_ranked_by_shared_facets() {
        let store = Arc::new(InMemoryTapestryStore::new());
        let graph = LinkGraph::new(store.clone());
        let t = TapestryId::from("t");
        let ai = facet(&store, &t, "ai", FacetType::Topics).await;
        let rust = facet(&store, &t, "rust", FacetType::Topics).await;
        let ada = facet(&store, &t, "ada", FacetType::People).await;

        let th_src = thread(&store, &t, "th-src", day(1, 1)).await;
        let th_a = thread(&store, &t, "th-a", day(1, 2)).await;
        let th_b = thread(&store, &t, "th-b", day(1, 3)).await;
        let th_c = thread(&store, &t, "th-c", day(1, 4)).await;

        let src = memory(&store, &t, "src", day(1, 1)).await;
        let m_a = memory(&store, &t, "m-a", day(1, 2)).await;
        let m_b = memory(&store, &t, "m-b", day(1, 3)).await;
        let m_c = memory(&store, &t, "m-c", day(1, 4)).await;

        for f in [&ai, &rust, &ada] {
            graph.link_facet_thread(&t, f, &th_src).await.unwrap();
        }
        graph.link_facet_thread(&t, &ai, &th_a).await.unwrap();
        graph.link_facet_thread(&t, &rust, &th_a).await.unwrap();
        graph.link_facet_thread(&t, &rust, &th_b).await.unwrap();
        graph.link_facet_thread(&t, &ada, &th_c).await.unwrap();

        graph.link_thread_memory(&t, &th_src, &src).await.unwrap();
        graph.link_thread_memory(&t, &th_a, &m_a).await.unwrap();
        graph.link_thread_memory(&t, &th_b, &m_b).await.unwrap();
        graph.link_thread_memory(&t, &th_c, &m_c).await.unwrap();

        let topics = graph.neighbour_memories(&src, FacetType::Topics, &t, 10).await.unwrap();
        let ranked: Vec<(String, u64)> = topics
            .iter()
            .map(|n| (n.memory.id.0.clone(), n.shared_facet_count))
            .collect();
        assert_eq!(ranked, vec![("m-a".to_string(), 2), ("m-b".to_string(), 1)]);

        let people = graph.neighbour_memories(&src, FacetType::People, &t, 10).await.unwrap();
        assert_eq!(ids(&people, |n| n.memory.id.as_str()), vec!["m-c"]);

        let err = graph
            .neighbour_memories(&src, FacetType::Topics, &"other".into(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, NavigatorError::NotFound { kind: EntityKind::Memory, .. }));
    }
}
