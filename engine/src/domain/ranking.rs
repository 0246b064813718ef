// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Ranking Engine
//!
//! Deterministic top-k ordering over candidate sets. Identical inputs always
//! produce the identical order; there is no randomness and no dependence on
//! hash-map iteration order, because every key ends in an id tie-break.
//!
//! | Key | Primary order | Tie-break |
//! |-----|---------------|-----------|
//! | `Count` | count descending | id ascending |
//! | `Recency` | timestamp descending | id ascending |
//! | `Similarity` | score descending | `created_at` ascending, then id ascending |

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::entities::Thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Count,
    Recency,
    Similarity,
}

/// A candidate the ranking engine can order.
///
/// Implementors only override the accessors for the keys they are ranked by.
pub trait Rankable {
    fn count(&self) -> u64 {
        0
    }

    fn recency(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn similarity(&self) -> f64 {
        0.0
    }

    /// Creation time; only consulted for similarity ties (earliest first)
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn tie_break_id(&self) -> &str;
}

pub struct RankingEngine;

impl RankingEngine {
    /// Stable sort by `by`, then truncate to `k`
    pub fn top_k<T: Rankable>(mut candidates: Vec<T>, by: RankBy, k: usize) -> Vec<T> {
        candidates.sort_by(|a, b| Self::compare(a, b, by));
        candidates.truncate(k);
        candidates
    }

    pub fn compare<T: Rankable>(a: &T, b: &T, by: RankBy) -> Ordering {
        let primary = match by {
            RankBy::Count => b.count().cmp(&a.count()),
            // None sorts before Some, so descending order puts undated candidates last
            RankBy::Recency => b.recency().cmp(&a.recency()),
            RankBy::Similarity => b
                .similarity()
                .total_cmp(&a.similarity())
                .then_with(|| a.created_at().cmp(&b.created_at())),
        };
        primary.then_with(|| a.tie_break_id().cmp(b.tie_break_id()))
    }
}

impl Rankable for Thread {
    fn recency(&self) -> Option<DateTime<Utc>> {
        Some(self.occurred_at)
    }

    fn tie_break_id(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Candidate {
        id: &'static str,
        count: u64,
        score: f64,
        at: DateTime<Utc>,
    }

    impl Rankable for Candidate {
        fn count(&self) -> u64 {
            self.count
        }
        fn recency(&self) -> Option<DateTime<Utc>> {
            Some(self.at)
        }
        fn similarity(&self) -> f64 {
            self.score
        }
        fn created_at(&self) -> Option<DateTime<Utc>> {
            Some(self.at)
        }
        fn tie_break_id(&self) -> &str {
            self.id
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate { id: "c", count: 2, score: 0.5, at: day(3) },
            Candidate { id: "a", count: 2, score: 0.9, at: day(5) },
            Candidate { id: "b", count: 7, score: 0.5, at: day(1) },
            Candidate { id: "d", count: 1, score: 0.9, at: day(2) },
        ]
    }

    fn ids(ranked: &[Candidate]) -> Vec<&'static str> {
        ranked.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_count_descending_then_id() {
        let ranked = RankingEngine::top_k(candidates(), RankBy::Count, 10);
        assert_eq!(ids(&ranked), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_recency_descending() {
        let ranked = RankingEngine::top_k(candidates(), RankBy::Recency, 10);
        assert_eq!(ids(&ranked), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_similarity_ties_prefer_earliest_created() {
        let ranked = RankingEngine::top_k(candidates(), RankBy::Similarity, 10);
        // a and d tie on 0.9: d was created first. c and b tie on 0.5: b first.
        assert_eq!(ids(&ranked), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_truncates_and_tolerates_short_input() {
        assert_eq!(RankingEngine::top_k(candidates(), RankBy::Count, 2).len(), 2);
        assert_eq!(RankingEngine::top_k(candidates(), RankBy::Count, 50).len(), 4);
        assert!(RankingEngine::top_k(Vec::<Candidate>::new(), RankBy::Count, 5).is_empty());
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let mut reversed = candidates();
        reversed.reverse();
        for by in [RankBy::Count, RankBy::Recency, RankBy::Similarity] {
            assert_eq!(
                ids(&RankingEngine::top_k(candidates(), by, 10)),
                ids(&RankingEngine::top_k(reversed.clone(), by, 10))
            );
        }
    }
}
