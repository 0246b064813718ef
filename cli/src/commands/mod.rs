// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Tapestry CLI

pub mod config;
pub mod query;

pub use self::config::ConfigCommand;
pub use self::query::QueryCommand;
