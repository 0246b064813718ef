// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Threads and memories.
//!
//! Both are read-only once ingested. Memory-to-facet relationships are never
//! stored; they are derived through the threads a memory is linked to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::ids::{MemoryId, TapestryId, ThreadId};

/// Conversational or contextual unit that references facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub tapestry_id: TapestryId,
    /// Occurrence time; facet edges inherit it
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Thread {
    pub fn new(id: ThreadId, tapestry_id: TapestryId, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id,
            tapestry_id,
            occurred_at,
            properties: BTreeMap::new(),
        }
    }
}

/// Content unit linked to one or more threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub tapestry_id: TapestryId,
    pub created_at: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Memory {
    pub fn new(
        id: MemoryId,
        tapestry_id: TapestryId,
        created_at: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tapestry_id,
            created_at,
            content: content.into(),
            properties: BTreeMap::new(),
        }
    }
}
