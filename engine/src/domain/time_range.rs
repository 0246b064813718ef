// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Inclusive time window used to filter thread timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{NavigatorError, NavigatorResult};

/// `[from, to]`, inclusive on both ends. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> NavigatorResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(NavigatorError::validation(
                    "from_date",
                    format!("from_date {} is after to_date {}", from.to_rfc3339(), to.to_rfc3339()),
                ));
            }
        }
        Ok(Self { from, to })
    }

    /// Parse ISO-8601 bounds. Timestamps must carry an explicit offset.
    pub fn parse(from_date: Option<&str>, to_date: Option<&str>) -> NavigatorResult<Self> {
        let from = parse_bound("from_date", from_date)?;
        let to = parse_bound("to_date", to_date)?;
        Self::new(from, to)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn parse_bound(field: &'static str, raw: Option<&str>) -> NavigatorResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|e| {
                NavigatorError::validation(
                    field,
                    format!("'{}' is not an ISO-8601 timestamp with timezone: {}", value, e),
                )
            }),
    }
}
