// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error taxonomy for navigator queries and ingestion.
//!
//! Every error is scoped to the single query (or ingestion call) that raised
//! it. Stale similarity-index entries are not errors at all: they are
//! recorded by [`crate::infrastructure::StaleIndexLog`] and the facet simply
//! drops out of that query's candidate set.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the query facade and the components behind it
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// Malformed parameters. Never retried.
    #[error("Invalid parameter '{field}': {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// Referenced id is absent or belongs to another tapestry
    #[error("{kind} not found: {id}")]
    NotFound {
        kind: EntityKind,
        id: String,
    },

    /// Query exceeded its budget; partial work was discarded
    #[error("Query '{operation}' timed out after {}ms", .budget.as_millis())]
    Timeout {
        operation: &'static str,
        budget: Duration,
    },

    /// Caller cancelled the query between component calls
    #[error("Query '{operation}' was cancelled")]
    Cancelled {
        operation: &'static str,
    },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Ingestion would break a graph invariant (dangling edge, facet type change)
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl NavigatorError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether a caller may reasonably retry the same query
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Embedding(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Embedding(_) => "embedding",
            Self::Integrity(_) => "integrity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Facet,
    Memory,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Facet => "Facet",
            Self::Memory => "Memory",
        };
        f.write_str(name)
    }
}

/// Errors from an embedding provider
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot embed empty text")]
    EmptyInput,
}

impl EmbeddingError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

pub type NavigatorResult<T> = Result<T, NavigatorError>;
