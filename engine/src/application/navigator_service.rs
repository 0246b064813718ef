// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # NavigatorService: the query facade
//!
//! Composes the facet index, the link graph and the ranking engine into the
//! seven navigator operations. The service holds no query state of its own;
//! each call validates its request, delegates to the components and returns
//! their ranked output.
//!
//! ## Budgets
//!
//! Every operation runs under a timeout (caller-supplied or
//! `query.timeout_ms`). On expiry the in-flight future is dropped with
//! whatever partial result it held and [`NavigatorError::Timeout`] is
//! returned.
//!
//! ## Cancellation
//!
//! Cooperative only: a [`CancellationToken`] is checked before validation
//! and between component calls, never inside one.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::validation::RequestValidator;
use crate::domain::config::NavigatorConfig;
use crate::domain::entities::{Memory, Thread};
use crate::domain::errors::{NavigatorError, NavigatorResult};
use crate::domain::facet::FacetType;
use crate::domain::query::{
    FacetCount, FacetLinksRequest, FacetNeighbour, MemoryNeighbour, NavigatorQuery, NavigatorResponse,
    RelatedFacetsRequest, RelatedMemoriesRequest, ScoredFacet, SearchFacetsRequest, TopFacetsRequest,
};
use crate::infrastructure::facet_index::FacetIndex;
use crate::infrastructure::link_graph::LinkGraph;

/// Per-call overrides for [`StandardNavigatorService::dispatch`]
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Replaces the configured budget for this call
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

/// Query facade interface
#[async_trait]
pub trait NavigatorService: Send + Sync {
    /// Facet type name → description
    async fn list_facet_types(&self) -> BTreeMap<String, String>;

    async fn top_facets(&self, req: TopFacetsRequest) -> NavigatorResult<Vec<FacetCount>>;

    async fn search_facets(&self, req: SearchFacetsRequest) -> NavigatorResult<Vec<ScoredFacet>>;

    async fn facet_threads(&self, req: FacetLinksRequest) -> NavigatorResult<Vec<Thread>>;

    async fn facet_memories(&self, req: FacetLinksRequest) -> NavigatorResult<Vec<Memory>>;

    async fn related_facets(&self, req: RelatedFacetsRequest) -> NavigatorResult<Vec<FacetNeighbour>>;

    async fn related_memories(&self, req: RelatedMemoriesRequest) -> NavigatorResult<Vec<MemoryNeighbour>>;

    /// Run any operation from its serialized form
    async fn execute(&self, query: NavigatorQuery) -> NavigatorResult<NavigatorResponse>;
}

struct QueryContext {
    operation: &'static str,
    cancel: CancellationToken,
}

impl QueryContext {
    fn checkpoint(&self) -> NavigatorResult<()> {
        if self.cancel.is_cancelled() {
            return Err(NavigatorError::Cancelled {
                operation: self.operation,
            });
        }
        Ok(())
    }
}

/// Standard implementation of NavigatorService
pub struct StandardNavigatorService {
    index: Arc<FacetIndex>,
    graph: Arc<LinkGraph>,
    validator: RequestValidator,
    default_timeout: Duration,
}

impl StandardNavigatorService {
    pub fn new(index: Arc<FacetIndex>, graph: Arc<LinkGraph>, config: &NavigatorConfig) -> Self {
        Self {
            index,
            graph,
            validator: RequestValidator::new(config.query.clone(), config.search.clone()),
            default_timeout: config.query.timeout(),
        }
    }

    /// Execute `query` under the given options
    pub async fn dispatch(&self, query: NavigatorQuery, options: QueryOptions) -> NavigatorResult<NavigatorResponse> {
        let ctx = QueryContext {
            operation: query.operation(),
            cancel: options.cancel.unwrap_or_default(),
        };
        let budget = options.timeout.unwrap_or(self.default_timeout);
        self.guarded(&ctx, budget, self.run(query, &ctx)).await
    }

    async fn run(&self, query: NavigatorQuery, ctx: &QueryContext) -> NavigatorResult<NavigatorResponse> {
        Ok(match query {
            NavigatorQuery::ListFacetTypes => NavigatorResponse::FacetTypes(facet_type_catalogue()),
            NavigatorQuery::GetTopFacets(req) => NavigatorResponse::TopFacets(self.run_top_facets(&req, ctx).await?),
            NavigatorQuery::SearchFacets(req) => {
                NavigatorResponse::SearchFacets(self.run_search_facets(&req, ctx).await?)
            }
            NavigatorQuery::GetFacetThreads(req) => {
                NavigatorResponse::FacetThreads(self.run_facet_threads(&req, ctx).await?)
            }
            NavigatorQuery::GetFacetMemories(req) => {
                NavigatorResponse::FacetMemories(self.run_facet_memories(&req, ctx).await?)
            }
            NavigatorQuery::FindRelatedFacets(req) => {
                NavigatorResponse::RelatedFacets(self.run_related_facets(&req, ctx).await?)
            }
            NavigatorQuery::FindRelatedMemories(req) => {
                NavigatorResponse::RelatedMemories(self.run_related_memories(&req, ctx).await?)
            }
        })
    }

    /// Apply the budget, record metrics, log the outcome
    async fn guarded<T, F>(&self, ctx: &QueryContext, budget: Duration, work: F) -> NavigatorResult<T>
    where
        F: Future<Output = NavigatorResult<T>>,
    {
        let operation = ctx.operation;
        let started = Instant::now();
        metrics::counter!("tapestry_queries_total", "operation" => operation).increment(1);

        let result = match tokio::time::timeout(budget, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, budget_ms = budget.as_millis() as u64, "Query exceeded its budget");
                Err(NavigatorError::Timeout { operation, budget })
            }
        };

        let elapsed = started.elapsed();
        metrics::histogram!("tapestry_query_duration_seconds", "operation" => operation)
            .record(elapsed.as_secs_f64());

        match &result {
            Ok(_) => debug!(operation, elapsed_ms = elapsed.as_millis() as u64, "Query completed"),
            Err(e) => {
                metrics::counter!(
                    "tapestry_query_errors_total",
                    "operation" => operation,
                    "kind" => e.kind()
                )
                .increment(1);
                debug!(operation, kind = e.kind(), error = %e, "Query failed");
            }
        }
        result
    }

    fn context(operation: &'static str) -> QueryContext {
        QueryContext {
            operation,
            cancel: CancellationToken::new(),
        }
    }

    async fn run_top_facets(&self, req: &TopFacetsRequest, ctx: &QueryContext) -> NavigatorResult<Vec<FacetCount>> {
        ctx.checkpoint()?;
        let params = self.validator.top_facets(req)?;
        debug!(tapestry_id = %params.tapestry_id, facet_type = %params.facet_type, top_k = params.top_k, "Ranking facets by thread count");

        let results = self
            .index
            .top_by_thread_count(&params.tapestry_id, params.facet_type, params.top_k)
            .await;
        ctx.checkpoint()?;
        Ok(results)
    }

    async fn run_search_facets(
        &self,
        req: &SearchFacetsRequest,
        ctx: &QueryContext,
    ) -> NavigatorResult<Vec<ScoredFacet>> {
        ctx.checkpoint()?;
        let params = self.validator.search_facets(req)?;
        debug!(
            tapestry_id = %params.tapestry_id,
            facet_type = %params.facet_type,
            top_k = params.top_k,
            threshold = params.threshold,
            "Searching facets"
        );

        let results = self
            .index
            .search(&params.tapestry_id, params.facet_type, &params.text, params.top_k, params.threshold)
            .await?;
        ctx.checkpoint()?;
        Ok(results)
    }

    async fn run_facet_threads(&self, req: &FacetLinksRequest, ctx: &QueryContext) -> NavigatorResult<Vec<Thread>> {
        ctx.checkpoint()?;
        let params = self.validator.facet_links(req)?;
        debug!(tapestry_id = %params.tapestry_id, facet_id = %params.facet_id, limit = params.limit, "Fetching facet threads");

        let results = self
            .graph
            .threads_for_facet(&params.facet_id, &params.tapestry_id, params.limit, params.range)
            .await?;
        ctx.checkpoint()?;
        Ok(results)
    }

    async fn run_facet_memories(&self, req: &FacetLinksRequest, ctx: &QueryContext) -> NavigatorResult<Vec<Memory>> {
        ctx.checkpoint()?;
        let params = self.validator.facet_links(req)?;
        debug!(tapestry_id = %params.tapestry_id, facet_id = %params.facet_id, limit = params.limit, "Fetching facet memories");

        let results = self
            .graph
            .memories_for_facet(&params.facet_id, &params.tapestry_id, params.limit, params.range)
            .await?;
        ctx.checkpoint()?;
        Ok(results)
    }

    async fn run_related_facets(
        &self,
        req: &RelatedFacetsRequest,
        ctx: &QueryContext,
    ) -> NavigatorResult<Vec<FacetNeighbour>> {
        ctx.checkpoint()?;
        let params = self.validator.related_facets(req)?;
        debug!(
            tapestry_id = %params.tapestry_id,
            facet_id = %params.facet_id,
            neighbour_type = %params.neighbour_type,
            top_k = params.top_k,
            "Finding related facets"
        );

        let results = self
            .graph
            .neighbour_facets(
                &params.facet_id,
                params.neighbour_type,
                &params.tapestry_id,
                params.top_k,
                params.range,
            )
            .await?;
        ctx.checkpoint()?;
        Ok(results)
    }

    async fn run_related_memories(
        &self,
        req: &RelatedMemoriesRequest,
        ctx: &QueryContext,
    ) -> NavigatorResult<Vec<MemoryNeighbour>> {
        ctx.checkpoint()?;
        let params = self.validator.related_memories(req)?;
        debug!(
            tapestry_id = %params.tapestry_id,
            memory_id = %params.memory_id,
            facet_type = %params.facet_type,
            top_k = params.top_k,
            "Finding related memories"
        );

        let results = self
            .graph
            .neighbour_memories(&params.memory_id, params.facet_type, &params.tapestry_id, params.top_k)
            .await?;
        ctx.checkpoint()?;
        Ok(results)
    }
}

#[async_trait]
impl NavigatorService for StandardNavigatorService {
    async fn list_facet_types(&self) -> BTreeMap<String, String> {
        facet_type_catalogue()
    }

    async fn top_facets(&self, req: TopFacetsRequest) -> NavigatorResult<Vec<FacetCount>> {
        let ctx = Self::context("get_top_facets");
        self.guarded(&ctx, self.default_timeout, self.run_top_facets(&req, &ctx)).await
    }

    async fn search_facets(&self, req: SearchFacetsRequest) -> NavigatorResult<Vec<ScoredFacet>> {
        let ctx = Self::context("search_facets");
        self.guarded(&ctx, self.default_timeout, self.run_search_facets(&req, &ctx)).await
    }

    async fn facet_threads(&self, req: FacetLinksRequest) -> NavigatorResult<Vec<Thread>> {
        let ctx = Self::context("get_facet_threads");
        self.guarded(&ctx, self.default_timeout, self.run_facet_threads(&req, &ctx)).await
    }

    async fn facet_memories(&self, req: FacetLinksRequest) -> NavigatorResult<Vec<Memory>> {
        let ctx = Self::context("get_facet_memories");
        self.guarded(&ctx, self.default_timeout, self.run_facet_memories(&req, &ctx)).await
    }

    async fn related_facets(&self, req: RelatedFacetsRequest) -> NavigatorResult<Vec<FacetNeighbour>> {
        let ctx = Self::context("find_related_facets");
        self.guarded(&ctx, self.default_timeout, self.run_related_facets(&req, &ctx)).await
    }

    async fn related_memories(&self, req: RelatedMemoriesRequest) -> NavigatorResult<Vec<MemoryNeighbour>> {
        let ctx = Self::context("find_related_memories");
        self.guarded(&ctx, self.default_timeout, self.run_related_memories(&req, &ctx)).await
    }

    async fn execute(&self, query: NavigatorQuery) -> NavigatorResult<NavigatorResponse> {
        self.dispatch(query, QueryOptions::default()).await
    }
}

fn facet_type_catalogue() -> BTreeMap<String, String> {
    FacetType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), t.description().to_string()))
        .collect()
}
