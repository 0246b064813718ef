// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tapestry Engine
//!
//! Tenant-scoped facet graph retrieval: canonical facet catalogue, ranked
//! top facets, semantic facet search, and neighbour traversal between
//! facets, threads and memories.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Hosts the domain model, the query facade and the in-memory
//!   graph/index infrastructure behind it

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::{NavigatorService, QueryOptions, StandardNavigatorService, TapestryEngine};
