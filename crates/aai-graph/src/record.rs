// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph record types: vertices and edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::{EdgeId, VertexId};

/// Reserved property naming a vertex's node type.
pub const NODE_TYPE_PROPERTY: &str = "aai-node-type";

/// Property carrying the optimistic-concurrency token of a vertex.
pub const RESOURCE_VERSION_PROPERTY: &str = "resource-version";

/// Materialised record for a single vertex stored in the graph.
///
/// Invariants
/// - `node_type` mirrors the reserved [`NODE_TYPE_PROPERTY`]; it is never
///   duplicated inside `properties`.
/// - The vertex identifier is not embedded here; the store supplies it externally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Node type (e.g. `generic-vnf`, `model-ver`).
    pub node_type: String,
    /// Scalar properties keyed by name.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl VertexRecord {
    /// Creates a record of `node_type` with no properties.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the property value for `name`, treating the reserved node-type
    /// key as a regular property.
    pub fn property(&self, name: &str) -> Option<&str> {
        if name == NODE_TYPE_PROPERTY {
            return Some(self.node_type.as_str());
        }
        self.properties.get(name).map(String::as_str)
    }

    /// Like [`property`](Self::property) but treats empty strings as absent.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.property(name).filter(|v| !v.is_empty())
    }
}

/// Edge classification.
///
/// `Tree` edges are structural parent→child containment, `Cousin` edges are
/// references between otherwise independent vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    /// Parent→child containment edge.
    Tree,
    /// Reference edge.
    Cousin,
}

/// Direction of an incident-edge walk relative to the anchor vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges whose `out_v` is the anchor.
    Out,
    /// Follow edges whose `in_v` is the anchor.
    In,
    /// Follow edges in either direction.
    Both,
}

/// Materialised record for a single edge stored in the graph.
///
/// Invariants
/// - `out_v` and `in_v` reference existing vertices in the same store.
/// - For `Tree` edges `out_v` is the parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Stable identifier for the edge.
    pub id: EdgeId,
    /// Source vertex.
    pub out_v: VertexId,
    /// Destination vertex.
    pub in_v: VertexId,
    /// Edge label (e.g. `has`, `isA`, `uses`).
    pub label: String,
    /// Tree or cousin classification.
    pub class: EdgeClass,
}

impl EdgeRecord {
    /// Returns the endpoint opposite `anchor`, if `anchor` is an endpoint.
    pub fn other_end(&self, anchor: VertexId) -> Option<VertexId> {
        if self.out_v == anchor {
            Some(self.in_v)
        } else if self.in_v == anchor {
            Some(self.out_v)
        } else {
            None
        }
    }
}
