// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod validation;
pub mod navigator_service;
pub mod engine_factory;

pub use validation::{
    FacetLinksParams, RelatedFacetsParams, RelatedMemoriesParams, RequestValidator, SearchFacetsParams,
    TopFacetsParams,
};
pub use navigator_service::{NavigatorService, QueryOptions, StandardNavigatorService};
pub use engine_factory::{create_embedding_provider, TapestryEngine};
