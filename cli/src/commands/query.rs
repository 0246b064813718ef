// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Navigator query commands
//!
//! Each command maps onto one navigator operation. The engine is built from
//! configuration, the snapshot is loaded, the query runs once under the
//! configured budget, and the result is printed.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tapestry_engine::application::{QueryOptions, TapestryEngine};
use tapestry_engine::domain::config::NavigatorConfig;
use tapestry_engine::domain::{
    FacetLinksRequest, NavigatorQuery, RelatedFacetsRequest, RelatedMemoriesRequest, SearchFacetsRequest,
    TopFacetsRequest,
};

use crate::output::{print_response, OutputFormat};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum QueryCommand {
    /// List facet types and their descriptions
    FacetTypes,

    /// Top facets of a type by number of referencing threads
    Top {
        #[arg(short, long)]
        tapestry: String,

        /// Facet type (topics, entities, people, companies, locations, products, things)
        #[arg(value_name = "FACET_TYPE")]
        facet_type: String,

        #[arg(short = 'k', long)]
        top_k: Option<i64>,
    },

    /// Semantic search over facet labels
    Search {
        #[arg(short, long)]
        tapestry: String,

        #[arg(value_name = "FACET_TYPE")]
        facet_type: String,

        /// Text to match against facet labels
        #[arg(value_name = "TEXT")]
        text: String,

        #[arg(short = 'k', long)]
        top_k: Option<i64>,

        /// Minimum cosine similarity
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,

        /// precise or explore
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Threads referencing a facet, most recent first
    Threads(FacetLinkArgs),

    /// Memories reachable from a facet through its threads
    Memories(FacetLinkArgs),

    /// Facets of another type co-occurring with a facet
    RelatedFacets {
        #[arg(short, long)]
        tapestry: String,

        #[arg(value_name = "FACET_ID")]
        facet_id: String,

        /// Type of the neighbouring facets
        #[arg(value_name = "RELATED_TYPE")]
        related_type: String,

        #[arg(short = 'k', long)]
        top_k: Option<i64>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// precise or explore
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Memories sharing facets of a type with a memory
    RelatedMemories {
        #[arg(short, long)]
        tapestry: String,

        #[arg(value_name = "MEMORY_ID")]
        memory_id: String,

        #[arg(value_name = "FACET_TYPE")]
        facet_type: String,

        #[arg(short = 'k', long)]
        top_k: Option<i64>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FacetLinkArgs {
    #[arg(short, long)]
    pub tapestry: String,

    #[arg(value_name = "FACET_ID")]
    pub facet_id: String,

    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Inclusive lower bound (RFC 3339, e.g. 2024-01-01T00:00:00Z)
    #[arg(long)]
    pub from: Option<String>,

    /// Inclusive upper bound (RFC 3339)
    #[arg(long)]
    pub to: Option<String>,
}

impl FacetLinkArgs {
    fn into_request(self) -> FacetLinksRequest {
        FacetLinksRequest {
            tapestry_id: self.tapestry,
            facet_id: self.facet_id,
            limit: self.limit,
            from_date: self.from,
            to_date: self.to,
        }
    }
}

impl QueryCommand {
    /// The navigator query this command runs. Values are passed through
    /// unvalidated; the engine rejects bad ones.
    pub fn into_query(self) -> NavigatorQuery {
        match self {
            Self::FacetTypes => NavigatorQuery::ListFacetTypes,
            Self::Top {
                tapestry,
                facet_type,
                top_k,
            } => NavigatorQuery::GetTopFacets(TopFacetsRequest {
                tapestry_id: tapestry,
                facet_type,
                top_k,
            }),
            Self::Search {
                tapestry,
                facet_type,
                text,
                top_k,
                threshold,
                mode,
            } => NavigatorQuery::SearchFacets(SearchFacetsRequest {
                tapestry_id: tapestry,
                text,
                facet_type,
                top_k,
                threshold,
                search_mode: mode,
            }),
            Self::Threads(args) => NavigatorQuery::GetFacetThreads(args.into_request()),
            Self::Memories(args) => NavigatorQuery::GetFacetMemories(args.into_request()),
            Self::RelatedFacets {
                tapestry,
                facet_id,
                related_type,
                top_k,
                from,
                to,
                mode,
            } => NavigatorQuery::FindRelatedFacets(RelatedFacetsRequest {
                tapestry_id: tapestry,
                facet_id,
                neighbour_type: related_type,
                top_k,
                from_date: from,
                to_date: to,
                search_mode: mode,
            }),
            Self::RelatedMemories {
                tapestry,
                memory_id,
                facet_type,
                top_k,
            } => NavigatorQuery::FindRelatedMemories(RelatedMemoriesRequest {
                tapestry_id: tapestry,
                memory_id,
                facet_type,
                top_k,
            }),
        }
    }
}

/// Global flags that shape a query run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub output: OutputFormat,
}

pub async fn handle_command(command: QueryCommand, options: RunOptions) -> Result<()> {
    let config = NavigatorConfig::load_or_default(options.config_path).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let engine = TapestryEngine::from_config(&config);

    let snapshot = options
        .snapshot
        .or_else(|| config.snapshot.as_ref().map(|s| s.path.clone()));
    match snapshot {
        Some(path) => {
            let report = engine.load_snapshot_file(&path).await?;
            info!(
                facets = report.facets_created,
                threads = report.threads,
                memories = report.memories,
                "Snapshot ready"
            );
            for tapestry_id in engine.store.tapestry_ids().await {
                let stats = engine.store.stats(&tapestry_id).await;
                let edges = engine.graph.edge_count(&tapestry_id).await;
                debug!(
                    tapestry_id = %tapestry_id,
                    facets = stats.facets,
                    threads = stats.threads,
                    memories = stats.memories,
                    edges,
                    "Tapestry loaded"
                );
            }
        }
        None if command != QueryCommand::FacetTypes => {
            warn!("No snapshot configured; querying an empty engine");
        }
        None => {}
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let query = command.into_query();
    let operation = query.operation();
    let response = engine
        .service
        .dispatch(
            query,
            QueryOptions {
                timeout: options.timeout_ms.map(Duration::from_millis),
                cancel: Some(cancel),
            },
        )
        .await
        .with_context(|| format!("Query '{}' failed", operation))?;

    print_response(&response, options.output)
}
