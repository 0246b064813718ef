// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repair log for facets the similarity index has fallen behind on.
//!
//! A facet is stale when it has no index entry, or when its entry was
//! embedded from a label that is no longer the facet's canonical label.
//! Stale facets sit out of the queries that hit them; the log remembers them
//! until [`crate::infrastructure::FacetIndex::repair`] re-embeds them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::facet::FacetType;
use crate::domain::ids::{FacetId, TapestryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    MissingEntry,
    LabelChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub tapestry_id: TapestryId,
    pub facet_id: FacetId,
    pub facet_type: FacetType,
    pub reason: StaleReason,
    pub first_seen: DateTime<Utc>,
    pub occurrences: u64,
}

#[derive(Default)]
pub struct StaleIndexLog {
    entries: Mutex<BTreeMap<(TapestryId, FacetId), StaleEntry>>,
}

impl StaleIndexLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, tapestry_id: &TapestryId, facet_id: &FacetId, facet_type: FacetType, reason: StaleReason) {
        metrics::counter!("tapestry_stale_index_entries_total").increment(1);

        let mut entries = self.entries.lock();
        let key = (tapestry_id.clone(), facet_id.clone());
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.occurrences += 1;
                entry.reason = reason;
                debug!(
                    tapestry_id = %tapestry_id,
                    facet_id = %facet_id,
                    occurrences = entry.occurrences,
                    "Stale facet skipped again"
                );
            }
            None => {
                warn!(
                    tapestry_id = %tapestry_id,
                    facet_id = %facet_id,
                    facet_type = %facet_type,
                    ?reason,
                    "Facet missing from similarity index; excluded until repaired"
                );
                entries.insert(
                    key,
                    StaleEntry {
                        tapestry_id: tapestry_id.clone(),
                        facet_id: facet_id.clone(),
                        facet_type,
                        reason,
                        first_seen: Utc::now(),
                        occurrences: 1,
                    },
                );
            }
        }
    }

    /// Remove and return every pending entry, ordered by tapestry then facet
    pub fn drain(&self) -> Vec<StaleEntry> {
        let mut entries = self.entries.lock();
        std::mem::take(&mut *entries).into_values().collect()
    }

    pub fn pending(&self) -> Vec<StaleEntry> {
        self.entries.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
