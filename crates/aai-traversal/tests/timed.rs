// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Wall-clock limits on queries.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use aai_app_core::EngineConfig;
use aai_graph::{Direction, EdgeClass, GraphAccess, GraphStore, VertexId, VertexRecord};
use aai_traversal::{ModelQuery, ModelSelector, TimedQueryService, TraversalError};
use common::{filter, vnf_instance, vnf_model, World};

/// Store whose neighbour walks stall.
struct SlowGraph {
    inner: GraphStore,
    delay: Duration,
}

impl GraphAccess for SlowGraph {
    fn vertex(&self, id: VertexId) -> Option<&VertexRecord> {
        self.inner.vertex(id)
    }

    fn find_by_property(&self, node_type: &str, property: &str, value: &str) -> Vec<VertexId> {
        self.inner.find_by_property(node_type, property, value)
    }

    fn vertices_of_type(&self, node_type: &str) -> Vec<VertexId> {
        self.inner.vertices_of_type(node_type)
    }

    fn incident(
        &self,
        id: VertexId,
        class: Option<EdgeClass>,
        direction: Direction,
        neighbor_types: &[&str],
    ) -> Vec<VertexId> {
        thread::sleep(self.delay);
        self.inner.incident(id, class, direction, neighbor_types)
    }

    fn all_vertices(&self) -> Vec<VertexId> {
        self.inner.all_vertices()
    }
}

fn populated() -> World {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    world
}

fn vnf_query() -> ModelQuery {
    ModelQuery {
        selector: ModelSelector::by_version("vnf-ver-1"),
        start_filters: vec![filter("generic-vnf.vnf-id", "vnf-1")],
        ..ModelQuery::default()
    }
}

fn limited(secs: u64) -> EngineConfig {
    EngineConfig {
        query_timeout_secs: secs,
        ..EngineConfig::default()
    }
}

#[test]
fn slow_query_is_abandoned_at_the_limit() {
    let World {
        store,
        schema,
        rules,
        ..
    } = populated();
    let graph = SlowGraph {
        inner: store,
        delay: Duration::from_secs(3),
    };
    let service = TimedQueryService::new(
        Arc::new(graph),
        Arc::new(schema),
        Arc::new(rules),
        limited(1),
    )
    .expect("service starts");

    let started = Instant::now();
    let err = service.query_by_model(vnf_query()).unwrap_err();
    assert_eq!(err, TraversalError::QueryTimeout(Duration::from_secs(1)));
    assert_eq!(err.code(), "AAI_6140");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn fast_query_finishes_under_the_limit() {
    let World {
        store,
        schema,
        rules,
        ..
    } = populated();
    let service = TimedQueryService::new(
        Arc::new(store),
        Arc::new(schema),
        Arc::new(rules),
        limited(30),
    )
    .expect("service starts");
    let results = service.query_by_model(vnf_query()).expect("query runs");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].size(), 4);
}

#[test]
fn no_limit_runs_inline() {
    let World {
        store,
        schema,
        rules,
        ..
    } = populated();
    let service = TimedQueryService::new(
        Arc::new(store),
        Arc::new(schema),
        Arc::new(rules),
        EngineConfig::default(),
    )
    .expect("service starts");
    assert!(service.config().query_timeout().is_none());
    let results = service.query_by_model(vnf_query()).expect("query runs");
    assert_eq!(results.len(), 1);
}

#[test]
fn errors_pass_through_the_worker() {
    let World {
        store,
        schema,
        rules,
        ..
    } = populated();
    let service = TimedQueryService::new(
        Arc::new(store),
        Arc::new(schema),
        Arc::new(rules),
        limited(30),
    )
    .expect("service starts");
    let err = service
        .query_by_model(ModelQuery {
            selector: ModelSelector::by_version("missing"),
            ..ModelQuery::default()
        })
        .unwrap_err();
    assert!(matches!(err, TraversalError::NotFound(_)), "{err:?}");
}

#[test]
fn invalid_settings_are_rejected() {
    let World {
        store,
        schema,
        rules,
        ..
    } = World::new();
    let config = EngineConfig {
        max_blocking_threads: 0,
        ..EngineConfig::default()
    };
    let result = TimedQueryService::new(Arc::new(store), Arc::new(schema), Arc::new(rules), config);
    assert!(matches!(result, Err(TraversalError::BadInput(_))));
}
