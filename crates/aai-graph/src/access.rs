// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only graph access port consumed by the model walker.
//!
//! [`GraphAccess`] is the only way traversal code observes the graph. It
//! exposes lookups and incident-vertex walks; mutation goes through
//! [`Serializer`](crate::Serializer) instead.

use crate::ident::VertexId;
use crate::record::{Direction, EdgeClass, VertexRecord};

/// Read-only view over an inventory graph.
///
/// Every method that returns several vertices yields them in ascending
/// [`VertexId`] order without duplicates, so walks are deterministic across
/// store implementations.
pub trait GraphAccess {
    /// Returns the record for `id` when the vertex exists.
    fn vertex(&self, id: VertexId) -> Option<&VertexRecord>;

    /// Vertices of `node_type` whose `property` equals `value`.
    fn find_by_property(&self, node_type: &str, property: &str, value: &str) -> Vec<VertexId>;

    /// All vertices of `node_type`.
    fn vertices_of_type(&self, node_type: &str) -> Vec<VertexId>;

    /// Neighbours of `id` reached over edges matching `class` (any class when
    /// `None`) and `direction`, restricted to `neighbor_types` (any type when
    /// empty).
    fn incident(
        &self,
        id: VertexId,
        class: Option<EdgeClass>,
        direction: Direction,
        neighbor_types: &[&str],
    ) -> Vec<VertexId>;

    /// Every vertex id in the graph.
    fn all_vertices(&self) -> Vec<VertexId>;

    /// Convenience accessor for one property of one vertex.
    fn property(&self, id: VertexId, name: &str) -> Option<&str> {
        self.vertex(id).and_then(|v| v.property(name))
    }

    /// Convenience accessor for a vertex's node type.
    fn node_type(&self, id: VertexId) -> Option<&str> {
        self.vertex(id).map(|v| v.node_type.as_str())
    }
}
