// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model of the tapestry navigator
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Entities, identifiers, query shapes, ranking rules and configuration

pub mod ids;
pub mod facet;
pub mod entities;
pub mod time_range;
pub mod ranking;
pub mod errors;
pub mod config;
pub mod embedding;
pub mod query;

pub use ids::*;
pub use facet::*;
pub use entities::*;
pub use time_range::*;
pub use ranking::*;
pub use errors::*;
pub use embedding::*;
pub use query::*;
