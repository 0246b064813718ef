// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Facets: canonical semantic units of one enumerated type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::NavigatorError;
use super::ids::{FacetId, TapestryId};

/// Enumerated facet categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetType {
    Topics,
    Entities,
    People,
    Companies,
    Locations,
    Products,
    Things,
}

impl FacetType {
    pub const ALL: [FacetType; 7] = [
        FacetType::Topics,
        FacetType::Entities,
        FacetType::People,
        FacetType::Companies,
        FacetType::Locations,
        FacetType::Products,
        FacetType::Things,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Entities => "entities",
            Self::People => "people",
            Self::Companies => "companies",
            Self::Locations => "locations",
            Self::Products => "products",
            Self::Things => "things",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Topics => "Subjects and themes the content keeps returning to",
            Self::Entities => "Named entities that do not fit a more specific type",
            Self::People => "Individuals mentioned or interacted with",
            Self::Companies => "Brands, companies and organisations",
            Self::Locations => "Places: cities, countries, venues and regions",
            Self::Products => "Specific products and services",
            Self::Things => "Physical or abstract objects of interest",
        }
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetType {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FacetType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = FacetType::ALL.iter().map(|t| t.as_str()).collect();
                NavigatorError::validation(
                    "facet_type",
                    format!("unknown facet type '{}', expected one of: {}", s, known.join(", ")),
                )
            })
    }
}

/// Canonical facet. The embedding lives in the facet index, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub id: FacetId,
    pub tapestry_id: TapestryId,
    pub facet_type: FacetType,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

impl Facet {
    pub fn new(
        id: FacetId,
        tapestry_id: TapestryId,
        facet_type: FacetType,
        label: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tapestry_id,
            facet_type,
            label: label.into(),
            created_at,
        }
    }

    /// Identity key used for deduplication within a tapestry
    pub fn canonical_key(&self) -> String {
        canonical_key(self.facet_type, &self.label)
    }
}

/// `type/normalised-label`, where normalisation folds case and collapses
/// whitespace. Mentions with the same key share one facet.
pub fn canonical_key(facet_type: FacetType, label: &str) -> String {
    let normalised: Vec<String> = label
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    format!("{}/{}", facet_type.as_str(), normalised.join(" "))
}
