// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Opaque identifiers for tapestries and the entities they own.
//!
//! Ids are carried verbatim; the engine never inspects their structure.
//! Ordering is plain lexicographic byte order, which is what every
//! id-based tie-break in the ranking rules relies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Isolation boundary. Every store and index access is keyed by it.
    TapestryId
);
opaque_id!(
    /// Canonical facet identifier, unique within a tapestry
    FacetId
);
opaque_id!(ThreadId);
opaque_id!(MemoryId);

/// Namespace for deterministic canonical facet ids
const FACET_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6f, 0x1c, 0x2a, 0x9e, 0x43, 0x7d, 0x4b, 0x1f, 0x8a, 0x55, 0x0c, 0xd2, 0x31, 0xe4, 0x7b, 0x90,
]);

impl FacetId {
    /// Derive the id of a canonical facet from its identity key.
    ///
    /// Two mentions that normalise to the same `(tapestry, type, label)`
    /// resolve to the same id, so ingestion is idempotent.
    pub fn canonical(tapestry_id: &TapestryId, canonical_key: &str) -> Self {
        let name = format!("{}/{}", tapestry_id.as_str(), canonical_key);
        Self(Uuid::new_v5(&FACET_NAMESPACE, name.as_bytes()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_opaque_strings() {
        let id = FacetId::from("facet:topics/AI");
        assert_eq!(id.as_str(), "facet:topics/AI");
        assert_eq!(id.to_string(), "facet:topics/AI");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"facet:topics/AI\"");
    }

    #[test]
    fn test_canonical_id_is_deterministic_per_tapestry() {
        let t1 = TapestryId::from("t1");
        let t2 = TapestryId::from("t2");

        let a = FacetId::canonical(&t1, "topics/ai");
        let b = FacetId::canonical(&t1, "topics/ai");
        let c = FacetId::canonical(&t2, "topics/ai");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![ThreadId::from("b"), ThreadId::from("a10"), ThreadId::from("a2")];
        ids.sort();
        assert_eq!(ids, vec![ThreadId::from("a10"), ThreadId::from("a2"), ThreadId::from("b")]);
    }
}
