// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Query requests and result shapes.
//!
//! Requests arrive as loosely-typed parameter bags (a transport forwards the
//! caller's JSON as-is); the application layer validates them into typed
//! parameters before any store or index access. Results are the ordered
//! lists each operation returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::entities::{Memory, Thread};
use super::errors::NavigatorError;
use super::facet::Facet;
use super::ranking::Rankable;

/// Intent of a facet search; selects default threshold and top_k
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Checking for one specific entity: few, high-confidence hits
    Precise,
    /// Browsing a theme: many, loosely related hits
    Explore,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precise => f.write_str("precise"),
            Self::Explore => f.write_str("explore"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(Self::Precise),
            "explore" => Ok(Self::Explore),
            other => Err(NavigatorError::validation(
                "search_mode",
                format!("unknown search mode '{}', expected 'precise' or 'explore'", other),
            )),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopFacetsRequest {
    #[serde(default)]
    pub tapestry_id: String,
    #[serde(default)]
    pub facet_type: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFacetsRequest {
    #[serde(default)]
    pub tapestry_id: String,
    #[serde(default, alias = "query")]
    pub text: String,
    #[serde(default)]
    pub facet_type: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub search_mode: Option<String>,
}

/// Shared by facet → threads and facet → memories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetLinksRequest {
    #[serde(default)]
    pub tapestry_id: String,
    #[serde(default)]
    pub facet_id: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedFacetsRequest {
    #[serde(default)]
    pub tapestry_id: String,
    #[serde(default)]
    pub facet_id: String,
    #[serde(default, alias = "related_type")]
    pub neighbour_type: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub search_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedMemoriesRequest {
    #[serde(default)]
    pub tapestry_id: String,
    #[serde(default)]
    pub memory_id: String,
    #[serde(default)]
    pub facet_type: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

/// One navigator operation with its raw parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum NavigatorQuery {
    ListFacetTypes,
    GetTopFacets(TopFacetsRequest),
    SearchFacets(SearchFacetsRequest),
    GetFacetThreads(FacetLinksRequest),
    GetFacetMemories(FacetLinksRequest),
    FindRelatedFacets(RelatedFacetsRequest),
    FindRelatedMemories(RelatedMemoriesRequest),
}

impl NavigatorQuery {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::ListFacetTypes => "list_facet_types",
            Self::GetTopFacets(_) => "get_top_facets",
            Self::SearchFacets(_) => "search_facets",
            Self::GetFacetThreads(_) => "get_facet_threads",
            Self::GetFacetMemories(_) => "get_facet_memories",
            Self::FindRelatedFacets(_) => "find_related_facets",
            Self::FindRelatedMemories(_) => "find_related_memories",
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub facet: Facet,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFacet {
    pub facet: Facet,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetNeighbour {
    pub facet: Facet,
    pub shared_thread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNeighbour {
    pub memory: Memory,
    pub shared_facet_count: u64,
}

/// Result of one navigator operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "results", rename_all = "snake_case")]
pub enum NavigatorResponse {
    FacetTypes(BTreeMap<String, String>),
    TopFacets(Vec<FacetCount>),
    SearchFacets(Vec<ScoredFacet>),
    FacetThreads(Vec<Thread>),
    FacetMemories(Vec<Memory>),
    RelatedFacets(Vec<FacetNeighbour>),
    RelatedMemories(Vec<MemoryNeighbour>),
}

impl NavigatorResponse {
    pub fn len(&self) -> usize {
        match self {
            Self::FacetTypes(m) => m.len(),
            Self::TopFacets(v) => v.len(),
            Self::SearchFacets(v) => v.len(),
            Self::FacetThreads(v) => v.len(),
            Self::FacetMemories(v) => v.len(),
            Self::RelatedFacets(v) => v.len(),
            Self::RelatedMemories(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Rankable for FacetCount {
    fn count(&self) -> u64 {
        self.count
    }

    fn tie_break_id(&self) -> &str {
        self.facet.id.as_str()
    }
}

impl Rankable for ScoredFacet {
    fn similarity(&self) -> f64 {
        self.score
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.facet.created_at)
    }

    fn tie_break_id(&self) -> &str {
        self.facet.id.as_str()
    }
}

impl Rankable for FacetNeighbour {
    fn count(&self) -> u64 {
        self.shared_thread_count
    }

    fn tie_break_id(&self) -> &str {
        self.facet.id.as_str()
    }
}

impl Rankable for MemoryNeighbour {
    fn count(&self) -> u64 {
        self.shared_facet_count
    }

    fn tie_break_id(&self) -> &str {
        self.memory.id.as_str()
    }
}
