// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builders for model and named-query definitions.
//!
//! Definitions live in the same [`GraphStore`] as instance data. The builder
//! lays down the vertices and the tree/cousin edges the walker expects:
//!
//! ```text
//! model ─tree→ model-ver ─tree→ model-element ─cousin→ model-ver
//! model-element ─tree→ model-element | constrained-element-set | model-constraint
//! constrained-element-set ─tree→ element-choice-set ─tree→ model-element
//! named-query ─tree→ named-query-element ─cousin→ model
//! ```

use aai_graph::{GraphStore, VertexId, VertexRecord};

/// A widget model and its single version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetModel {
    /// The model vertex.
    pub model: VertexId,
    /// The model-ver vertex.
    pub ver: VertexId,
    /// Node type the widget maps to.
    pub node_type: String,
}

/// A resource or service model and one of its versions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelHandle {
    /// The model vertex.
    pub model: VertexId,
    /// The model-ver vertex.
    pub ver: VertexId,
    /// `model-invariant-id`.
    pub invariant_id: String,
    /// `model-version-id`.
    pub version_id: String,
}

/// Writes definition vertices into a store.
pub struct DefinitionBuilder<'g> {
    store: &'g mut GraphStore,
}

impl<'g> DefinitionBuilder<'g> {
    /// Builder writing into `store`.
    pub fn new(store: &'g mut GraphStore) -> Self {
        Self { store }
    }

    #[allow(clippy::expect_used)]
    fn tree(&mut self, parent: VertexId, child: VertexId) {
        self.store
            .add_tree_edge(parent, child)
            .expect("definition vertices exist");
    }

    #[allow(clippy::expect_used)]
    fn cousin(&mut self, from: VertexId, to: VertexId) {
        self.store
            .add_cousin_edge(from, to)
            .expect("definition vertices exist");
    }

    /// Widget model for `node_type` with invariant `<type>-widget-inv` and
    /// version `<type>-widget-ver`.
    pub fn widget(&mut self, node_type: &str) -> WidgetModel {
        let model = self.store.add_vertex(
            VertexRecord::new("model")
                .with("model-type", "widget")
                .with("model-invariant-id", format!("{node_type}-widget-inv")),
        );
        let ver = self.store.add_vertex(
            VertexRecord::new("model-ver")
                .with("model-version-id", format!("{node_type}-widget-ver"))
                .with("model-version", "1.0")
                .with("model-name", node_type),
        );
        self.tree(model, ver);
        WidgetModel {
            model,
            ver,
            node_type: node_type.to_owned(),
        }
    }

    /// Resource/service model (`kind`) with one version.
    pub fn model(&mut self, kind: &str, invariant_id: &str, version_id: &str, name: &str) -> ModelHandle {
        let model = self.store.add_vertex(
            VertexRecord::new("model")
                .with("model-type", kind)
                .with("model-invariant-id", invariant_id),
        );
        let mut handle = ModelHandle {
            model,
            ver: model,
            invariant_id: invariant_id.to_owned(),
            version_id: version_id.to_owned(),
        };
        handle.ver = self.version(&handle, version_id, name);
        handle
    }

    /// Adds another version to an existing model.
    pub fn version(&mut self, of: &ModelHandle, version_id: &str, name: &str) -> VertexId {
        let ver = self.store.add_vertex(
            VertexRecord::new("model-ver")
                .with("model-version-id", version_id)
                .with("model-version", "1.0")
                .with("model-name", name),
        );
        self.tree(of.model, ver);
        ver
    }

    /// Model-element under `parent` (a model-ver, model-element or
    /// element-choice-set) representing the model-ver `represents`.
    pub fn element(&mut self, parent: VertexId, represents: VertexId, del_flag: &str) -> VertexId {
        let n = self.store.vertex_count();
        let element = self.store.add_vertex(
            VertexRecord::new("model-element")
                .with("model-element-uuid", format!("me-{n}"))
                .with("new-data-del-flag", del_flag),
        );
        self.tree(parent, element);
        self.cousin(element, represents);
        element
    }

    /// Model-element carrying `linkage-points`.
    pub fn linkage_element(
        &mut self,
        parent: VertexId,
        represents: VertexId,
        linkage_points: &str,
        del_flag: &str,
    ) -> VertexId {
        let element = self.element(parent, represents, del_flag);
        self.set(element, "linkage-points", linkage_points);
        element
    }

    /// Constrained-element-set under `parent` (a model-element or model-constraint).
    pub fn constrained_set(&mut self, parent: VertexId, uuid: &str) -> VertexId {
        let set = self.store.add_vertex(
            VertexRecord::new("constrained-element-set").with("constrained-element-set-uuid", uuid),
        );
        self.tree(parent, set);
        set
    }

    /// Element-choice-set under a constrained-element-set.
    pub fn choice_set(&mut self, set: VertexId) -> VertexId {
        let choice = self.store.add_vertex(VertexRecord::new("element-choice-set"));
        self.tree(set, choice);
        choice
    }

    /// Model-constraint on `owner` replacing the set named `uuid_to_replace`.
    /// Attach the replacement with [`constrained_set`](Self::constrained_set).
    pub fn model_constraint(&mut self, owner: VertexId, uuid_to_replace: &str) -> VertexId {
        let constraint = self.store.add_vertex(
            VertexRecord::new("model-constraint")
                .with("constrained-element-set-uuid-to-replace", uuid_to_replace),
        );
        self.tree(owner, constraint);
        constraint
    }

    /// Named-query with `named-query-uuid`.
    pub fn named_query(&mut self, uuid: &str) -> VertexId {
        self.store
            .add_vertex(VertexRecord::new("named-query").with("named-query-uuid", uuid))
    }

    /// Named-query-element under `parent` matching `widget`.
    pub fn nq_element(&mut self, parent: VertexId, widget: &WidgetModel) -> VertexId {
        let n = self.store.vertex_count();
        let element = self.store.add_vertex(
            VertexRecord::new("named-query-element")
                .with("named-query-element-uuid", format!("nqe-{n}")),
        );
        self.tree(parent, element);
        self.cousin(element, widget.model);
        element
    }

    /// Property-constraint (`EQUALS` / `NOT-EQUALS`) on a named-query-element.
    pub fn property_constraint(
        &mut self,
        element: VertexId,
        constraint_type: &str,
        property: &str,
        value: &str,
    ) -> VertexId {
        let c = self.store.add_vertex(
            VertexRecord::new("property-constraint")
                .with("constraint-type", constraint_type)
                .with("property-name", property)
                .with("property-value", value),
        );
        self.tree(element, c);
        c
    }

    /// Related-lookup on a named-query-element.
    pub fn related_lookup(
        &mut self,
        element: VertexId,
        source: (&str, &str),
        target: (&str, &str),
        collect: &str,
    ) -> VertexId {
        let l = self.store.add_vertex(
            VertexRecord::new("related-lookup")
                .with("source-node-type", source.0)
                .with("source-node-property", source.1)
                .with("target-node-type", target.0)
                .with("target-node-property", target.1)
                .with("property-collect-list", collect),
        );
        self.tree(element, l);
        l
    }

    /// Sets one property on an existing vertex.
    #[allow(clippy::expect_used)]
    pub fn set(&mut self, vertex: VertexId, name: &str, value: &str) -> &mut Self {
        self.store
            .set_property(vertex, name, value)
            .expect("vertex exists");
        self
    }
}
