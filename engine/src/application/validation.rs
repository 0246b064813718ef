// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Request Validation
//!
//! Turns raw request bags into typed parameters before any store, graph or
//! index access. Every failure is a [`NavigatorError::Validation`] naming the
//! offending field.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Parameter checks and default resolution for the query facade

use crate::domain::config::{QueryConfig, SearchConfig};
use crate::domain::errors::{NavigatorError, NavigatorResult};
use crate::domain::facet::FacetType;
use crate::domain::ids::{FacetId, MemoryId, TapestryId};
use crate::domain::query::{
    FacetLinksRequest, RelatedFacetsRequest, RelatedMemoriesRequest, SearchFacetsRequest, SearchMode,
    TopFacetsRequest,
};
use crate::domain::time_range::TimeRange;

#[derive(Debug, Clone, PartialEq)]
pub struct TopFacetsParams {
    pub tapestry_id: TapestryId,
    pub facet_type: FacetType,
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchFacetsParams {
    pub tapestry_id: TapestryId,
    pub facet_type: FacetType,
    pub text: String,
    pub top_k: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacetLinksParams {
    pub tapestry_id: TapestryId,
    pub facet_id: FacetId,
    pub limit: usize,
    pub range: TimeRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedFacetsParams {
    pub tapestry_id: TapestryId,
    pub facet_id: FacetId,
    pub neighbour_type: FacetType,
    pub top_k: usize,
    pub range: TimeRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedMemoriesParams {
    pub tapestry_id: TapestryId,
    pub memory_id: MemoryId,
    pub facet_type: FacetType,
    pub top_k: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    query: QueryConfig,
    search: SearchConfig,
}

impl RequestValidator {
    pub fn new(query: QueryConfig, search: SearchConfig) -> Self {
        Self { query, search }
    }

    pub fn top_facets(&self, req: &TopFacetsRequest) -> NavigatorResult<TopFacetsParams> {
        Ok(TopFacetsParams {
            tapestry_id: required("tapestry_id", &req.tapestry_id)?.into(),
            facet_type: req.facet_type.parse()?,
            top_k: self.count("top_k", req.top_k, self.query.default_top_k)?,
        })
    }

    /// Explicit `threshold`/`top_k` win over the search-mode preset, which
    /// wins over the configured defaults.
    pub fn search_facets(&self, req: &SearchFacetsRequest) -> NavigatorResult<SearchFacetsParams> {
        let tapestry_id: TapestryId = required("tapestry_id", &req.tapestry_id)?.into();
        let text = required("text", &req.text)?.to_string();
        let facet_type: FacetType = req.facet_type.parse()?;
        let preset = search_mode(req.search_mode.as_deref())?.map(|mode| self.search.preset(mode));

        let threshold = match req.threshold {
            Some(t) if !t.is_finite() => {
                return Err(NavigatorError::validation("threshold", format!("must be a finite number, got {}", t)));
            }
            Some(t) => t,
            None => preset.map_or(self.search.default_threshold, |p| p.threshold),
        };
        let default_top_k = preset.map_or(self.query.default_top_k, |p| p.top_k);

        Ok(SearchFacetsParams {
            tapestry_id,
            facet_type,
            text,
            top_k: self.count("top_k", req.top_k, default_top_k)?,
            threshold,
        })
    }

    pub fn facet_links(&self, req: &FacetLinksRequest) -> NavigatorResult<FacetLinksParams> {
        Ok(FacetLinksParams {
            tapestry_id: required("tapestry_id", &req.tapestry_id)?.into(),
            facet_id: required("facet_id", &req.facet_id)?.into(),
            limit: self.count("limit", req.limit, self.query.default_limit)?,
            range: TimeRange::parse(req.from_date.as_deref(), req.to_date.as_deref())?,
        })
    }

    pub fn related_facets(&self, req: &RelatedFacetsRequest) -> NavigatorResult<RelatedFacetsParams> {
        let tapestry_id: TapestryId = required("tapestry_id", &req.tapestry_id)?.into();
        let facet_id: FacetId = required("facet_id", &req.facet_id)?.into();
        let neighbour_type: FacetType = required("neighbour_type", &req.neighbour_type)?
            .parse::<FacetType>()
            .map_err(|e| rename_field(e, "neighbour_type"))?;
        let preset = search_mode(req.search_mode.as_deref())?.map(|mode| self.search.preset(mode));
        let default_top_k = preset.map_or(self.query.default_top_k, |p| p.related_top_k);

        Ok(RelatedFacetsParams {
            tapestry_id,
            facet_id,
            neighbour_type,
            top_k: self.count("top_k", req.top_k, default_top_k)?,
            range: TimeRange::parse(req.from_date.as_deref(), req.to_date.as_deref())?,
        })
    }

    pub fn related_memories(&self, req: &RelatedMemoriesRequest) -> NavigatorResult<RelatedMemoriesParams> {
        Ok(RelatedMemoriesParams {
            tapestry_id: required("tapestry_id", &req.tapestry_id)?.into(),
            memory_id: required("memory_id", &req.memory_id)?.into(),
            facet_type: req.facet_type.parse()?,
            top_k: self.count("top_k", req.top_k, self.query.default_top_k)?,
        })
    }

    /// Positive integer no larger than `max_top_k`; `default` when absent
    fn count(&self, field: &'static str, raw: Option<i64>, default: usize) -> NavigatorResult<usize> {
        let Some(value) = raw else {
            return Ok(default);
        };
        if value <= 0 {
            return Err(NavigatorError::validation(
                field,
                format!("must be a positive integer, got {}", value),
            ));
        }
        let value = usize::try_from(value).unwrap_or(usize::MAX);
        if value > self.query.max_top_k {
            return Err(NavigatorError::validation(
                field,
                format!("must not exceed {}, got {}", self.query.max_top_k, value),
            ));
        }
        Ok(value)
    }
}

fn required<'a>(field: &'static str, raw: &'a str) -> NavigatorResult<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(NavigatorError::validation(field, "is required"));
    }
    Ok(value)
}

fn search_mode(raw: Option<&str>) -> NavigatorResult<Option<SearchMode>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(mode) => mode.parse::<SearchMode>().map(Some),
    }
}

fn rename_field(err: NavigatorError, field: &'static str) -> NavigatorError {
    match err {
        NavigatorError::Validation { reason, .. } => NavigatorError::Validation { field, reason },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> RequestValidator {
        RequestValidator::default()
    }

    fn field_of(err: NavigatorError) -> &'static str {
        match err {
            NavigatorError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_top_facets_defaults() {
        let params = validator()
            .top_facets(&TopFacetsRequest {
                tapestry_id: "t1".to_string(),
                facet_type: "Topics".to_string(),
                top_k: None,
            })
            .unwrap();
        assert_eq!(params.facet_type, FacetType::Topics);
        assert_eq!(params.top_k, 10);
    }

    #[test]
    fn test_missing_tapestry_and_bad_counts() {
        let v = validator();
        let missing = v.top_facets(&TopFacetsRequest {
            facet_type: "topics".to_string(),
            ..Default::default()
        });
        assert_eq!(field_of(missing.unwrap_err()), "tapestry_id");

        for bad in [0, -3, 1001] {
            let err = v
                .top_facets(&TopFacetsRequest {
                    tapestry_id: "t".to_string(),
                    facet_type: "topics".to_string(),
                    top_k: Some(bad),
                })
                .unwrap_err();
            assert_eq!(field_of(err), "top_k");
        }
    }

    #[test]
    fn test_unknown_facet_type() {
        let err = validator()
            .top_facets(&TopFacetsRequest {
                tapestry_id: "t".to_string(),
                facet_type: "colours".to_string(),
                top_k: None,
            })
            .unwrap_err();
        assert_eq!(field_of(err), "facet_type");
    }

    #[test]
    fn test_search_mode_presets_and_overrides() {
        let v = validator();
        let base = SearchFacetsRequest {
            tapestry_id: "t".to_string(),
            text: "fashion".to_string(),
            facet_type: "companies".to_string(),
            ..Default::default()
        };

        let plain = v.search_facets(&base).unwrap();
        assert_eq!(plain.threshold, -1.0);
        assert_eq!(plain.top_k, 10);

        let precise = v
            .search_facets(&SearchFacetsRequest {
                search_mode: Some("precise".to_string()),
                ..base.clone()
            })
            .unwrap();
        assert_eq!(precise.threshold, 0.80);
        assert_eq!(precise.top_k, 3);

        let overridden = v
            .search_facets(&SearchFacetsRequest {
                search_mode: Some("explore".to_string()),
                threshold: Some(0.5),
                top_k: Some(7),
                ..base.clone()
            })
            .unwrap();
        assert_eq!(overridden.threshold, 0.5);
        assert_eq!(overridden.top_k, 7);

        let blank_text = v.search_facets(&SearchFacetsRequest {
            text: "   ".to_string(),
            ..base
        });
        assert_eq!(field_of(blank_text.unwrap_err()), "text");
    }

    #[test]
    fn test_facet_links_dates() {
        let v = validator();
        let ok = v
            .facet_links(&FacetLinksRequest {
                tapestry_id: "t".to_string(),
                facet_id: "f".to_string(),
                limit: Some(5),
                from_date: Some("2024-01-01T00:00:00Z".to_string()),
                to_date: None,
            })
            .unwrap();
        assert_eq!(ok.limit, 5);
        assert!(ok.range.from.is_some() && ok.range.to.is_none());

        let bad = v.facet_links(&FacetLinksRequest {
            tapestry_id: "t".to_string(),
            facet_id: "f".to_string(),
            from_date: Some("last tuesday".to_string()),
            ..Default::default()
        });
        assert_eq!(field_of(bad.unwrap_err()), "from_date");

        let inverted = v.facet_links(&FacetLinksRequest {
            tapestry_id: "t".to_string(),
            facet_id: "f".to_string(),
            from_date: Some("2024-03-01T00:00:00Z".to_string()),
            to_date: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        });
        assert!(inverted.is_err());
    }

    #[test]
    fn test_related_facets_type_and_mode() {
        let v = validator();
        let params = v
            .related_facets(&RelatedFacetsRequest {
                tapestry_id: "t".to_string(),
                facet_id: "f".to_string(),
                neighbour_type: "people".to_string(),
                search_mode: Some("precise".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(params.neighbour_type, FacetType::People);
        assert_eq!(params.top_k, 5);

        let err = v
            .related_facets(&RelatedFacetsRequest {
                tapestry_id: "t".to_string(),
                facet_id: "f".to_string(),
                neighbour_type: "pets".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(field_of(err), "neighbour_type");
    }
}
