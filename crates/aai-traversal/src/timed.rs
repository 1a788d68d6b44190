// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wall-clock limits for whole queries.
//!
//! Queries run on a bounded blocking pool. When the limit elapses the caller
//! gets [`TraversalError::QueryTimeout`] and the computation is abandoned: it
//! keeps running on its worker until it finishes, but nobody waits for it.

use std::sync::Arc;

use aai_app_core::EngineConfig;
use aai_graph::{EdgeRules, GraphAccess, SchemaIntrospector};
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::TraversalError;
use crate::named_query::NamedQueryRequest;
use crate::query::ModelQuery;
use crate::result_set::ResultSet;

/// Shared, thread-safe collaborators for timed queries.
pub struct TimedQueryService {
    graph: Arc<dyn GraphAccess + Send + Sync>,
    schema: Arc<dyn SchemaIntrospector + Send + Sync>,
    rules: Arc<dyn EdgeRules + Send + Sync>,
    config: EngineConfig,
    runtime: Option<Runtime>,
}

impl TimedQueryService {
    /// Builds the service and its worker pool.
    ///
    /// Must not be called from inside an async runtime.
    pub fn new(
        graph: Arc<dyn GraphAccess + Send + Sync>,
        schema: Arc<dyn SchemaIntrospector + Send + Sync>,
        rules: Arc<dyn EdgeRules + Send + Sync>,
        config: EngineConfig,
    ) -> Result<Self, TraversalError> {
        config
            .validate()
            .map_err(|e| TraversalError::BadInput(e.to_string()))?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_blocking_threads)
            .thread_name("aai-walk-query")
            .enable_time()
            .build()
            .map_err(|e| TraversalError::Runtime(e.to_string()))?;
        info!(
            timeout = ?config.query_timeout(),
            workers = config.max_blocking_threads,
            "timed query service ready"
        );
        Ok(Self {
            graph,
            schema,
            rules,
            config,
            runtime: Some(runtime),
        })
    }

    /// Settings in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// [`Engine::query_by_model`] under the configured time limit.
    pub fn query_by_model(&self, request: ModelQuery) -> Result<Vec<ResultSet>, TraversalError> {
        self.run(move |engine| engine.query_by_model(&request))
    }

    /// [`Engine::query_by_named_query`] under the configured time limit.
    pub fn query_by_named_query(
        &self,
        request: NamedQueryRequest,
    ) -> Result<Vec<ResultSet>, TraversalError> {
        self.run(move |engine| engine.query_by_named_query(&request))
    }

    fn run<T, F>(&self, job: F) -> Result<T, TraversalError>
    where
        F: FnOnce(&Engine<'_>) -> Result<T, TraversalError> + Send + 'static,
        T: Send + 'static,
    {
        let graph = Arc::clone(&self.graph);
        let schema = Arc::clone(&self.schema);
        let rules = Arc::clone(&self.rules);
        let config = self.config.clone();
        let work = move || {
            let engine = Engine::new(&*graph, &*schema, &*rules).with_config(config);
            job(&engine)
        };
        let (Some(limit), Some(runtime)) = (self.config.query_timeout(), self.runtime.as_ref())
        else {
            return work();
        };
        runtime.block_on(async move {
            match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
                Ok(Ok(result)) => result,
                Ok(Err(join)) => Err(TraversalError::Runtime(join.to_string())),
                Err(_) => {
                    warn!(?limit, "query exceeded its time limit; abandoning");
                    Err(TraversalError::QueryTimeout(limit))
                }
            }
        })
    }
}

impl Drop for TimedQueryService {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
