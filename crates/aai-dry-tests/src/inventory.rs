// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A small inventory schema, its edge rules and instance helpers.

use aai_graph::{EdgeRuleSet, GraphStore, StaticSchema, VertexId, VertexRecord};

use crate::models::ModelHandle;

/// Schema for the fixture inventory. `service-instance`, `generic-vnf` and
/// `vf-module` support persona; everything else does not.
pub fn inventory_schema() -> StaticSchema {
    let mut schema = StaticSchema::new();
    schema
        .declare_with_persona("service-instance", ["service-instance-id"])
        .declare_with_persona("generic-vnf", ["vnf-id", "vnf-name", "resource-version"])
        .declare_with_persona("vf-module", ["vf-module-id"])
        .declare("vserver", ["vserver-id", "vserver-name", "resource-version"])
        .declare("tenant", ["tenant-id", "tenant-name"])
        .declare("cloud-region", ["cloud-owner", "cloud-region-id", "region-name"])
        .declare("complex", ["physical-location-id", "region"])
        .declare("pserver", ["hostname"])
        .declare("p-interface", ["interface-name"])
        .declare("l-interface", ["interface-name"])
        .declare("image", ["image-id"])
        .declare("flavor", ["flavor-id"]);
    schema
}

/// Edge rules between the fixture node types.
pub fn inventory_edge_rules() -> EdgeRuleSet {
    let mut rules = EdgeRuleSet::new();
    for (a, b) in [
        ("service-instance", "generic-vnf"),
        ("generic-vnf", "vserver"),
        ("generic-vnf", "vf-module"),
        ("generic-vnf", "l-interface"),
        ("generic-vnf", "pserver"),
        ("vf-module", "vserver"),
        ("vserver", "tenant"),
        ("vserver", "pserver"),
        ("vserver", "l-interface"),
        ("vserver", "image"),
        ("vserver", "flavor"),
        ("tenant", "cloud-region"),
        ("cloud-region", "complex"),
        ("pserver", "complex"),
        ("pserver", "p-interface"),
        ("p-interface", "l-interface"),
    ] {
        rules.allow(a, b);
    }
    rules
}

/// Writes instance vertices into a store.
pub struct Inventory<'g> {
    store: &'g mut GraphStore,
}

impl<'g> Inventory<'g> {
    /// Helper writing into `store`.
    pub fn new(store: &'g mut GraphStore) -> Self {
        Self { store }
    }

    /// Adds an instance of `node_type` with `props`.
    pub fn add(&mut self, node_type: &str, props: &[(&str, &str)]) -> VertexId {
        let record = props
            .iter()
            .fold(VertexRecord::new(node_type), |r, (k, v)| r.with(*k, *v));
        self.store.add_vertex(record)
    }

    /// Adds an instance stamped with the persona of `model`.
    pub fn stamped(&mut self, node_type: &str, props: &[(&str, &str)], model: &ModelHandle) -> VertexId {
        let v = self.add(node_type, props);
        self.stamp(v, &model.invariant_id, &model.version_id);
        v
    }

    /// Stamps an existing vertex with a persona.
    #[allow(clippy::expect_used)]
    pub fn stamp(&mut self, vertex: VertexId, invariant_id: &str, version_id: &str) {
        self.store
            .set_property(vertex, "model-invariant-id-local", invariant_id)
            .expect("vertex exists");
        self.store
            .set_property(vertex, "model-version-id-local", version_id)
            .expect("vertex exists");
    }

    /// Parent→child tree edge.
    #[allow(clippy::expect_used)]
    pub fn link(&mut self, parent: VertexId, child: VertexId) {
        self.store
            .add_tree_edge(parent, child)
            .expect("instance vertices exist");
    }

    /// Reference edge.
    #[allow(clippy::expect_used)]
    pub fn relate(&mut self, from: VertexId, to: VertexId) {
        self.store
            .add_cousin_edge(from, to)
            .expect("instance vertices exist");
    }
}
