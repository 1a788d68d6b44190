// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal in-memory graph store used by the walker, the CLI and tests.
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::access::GraphAccess;
use crate::ident::{EdgeId, VertexId};
use crate::record::{Direction, EdgeClass, EdgeRecord, VertexRecord};

/// Error returned by structural mutations of a [`GraphStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The vertex does not exist in the store.
    #[error("vertex not found: {0}")]
    VertexNotFound(VertexId),
    /// A vertex with this id is already present.
    #[error("duplicate vertex id: {0}")]
    DuplicateVertex(VertexId),
}

/// In-memory property graph.
///
/// Vertices and edges live in ordered maps so iteration is deterministic.
/// A per-type index backs [`GraphAccess::vertices_of_type`] and
/// [`GraphAccess::find_by_property`].
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Mapping from vertex identifiers to their records.
    pub(crate) vertices: BTreeMap<VertexId, VertexRecord>,
    /// All edges keyed by id.
    pub(crate) edges: BTreeMap<EdgeId, EdgeRecord>,
    /// Outbound adjacency: vertex → edges whose `out_v` is the vertex.
    pub(crate) edges_out: BTreeMap<VertexId, Vec<EdgeId>>,
    /// Inbound adjacency: vertex → edges whose `in_v` is the vertex.
    pub(crate) edges_in: BTreeMap<VertexId, Vec<EdgeId>>,
    /// Node type → vertices of that type.
    pub(crate) by_type: FxHashMap<String, BTreeSet<VertexId>>,
    next_vertex: u64,
    next_edge: u64,
}

impl GraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices currently stored.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges currently stored.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over all vertices (id, record) in ascending id order.
    pub fn iter_vertices(&self) -> impl Iterator<Item = (&VertexId, &VertexRecord)> {
        self.vertices.iter()
    }

    /// Iterate over all edges in ascending id order.
    pub fn iter_edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.edges.values()
    }

    /// Adds a vertex under a freshly allocated id.
    pub fn add_vertex(&mut self, record: VertexRecord) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        self.index_and_insert(id, record);
        id
    }

    /// Inserts a vertex under a caller-chosen id.
    pub fn insert_vertex(&mut self, id: VertexId, record: VertexRecord) -> Result<(), GraphError> {
        if self.vertices.contains_key(&id) {
            return Err(GraphError::DuplicateVertex(id));
        }
        self.next_vertex = self.next_vertex.max(id.0 + 1);
        self.index_and_insert(id, record);
        Ok(())
    }

    fn index_and_insert(&mut self, id: VertexId, record: VertexRecord) {
        self.by_type
            .entry(record.node_type.clone())
            .or_default()
            .insert(id);
        self.vertices.insert(id, record);
    }

    /// Sets (or replaces) one property on an existing vertex.
    pub fn set_property(
        &mut self,
        id: VertexId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), GraphError> {
        let record = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound(id))?;
        record.properties.insert(name.into(), value.into());
        Ok(())
    }

    /// Adds a directed edge `out_v → in_v`.
    ///
    /// Both endpoints must exist. Parallel edges are allowed.
    pub fn add_edge(
        &mut self,
        out_v: VertexId,
        in_v: VertexId,
        label: impl Into<String>,
        class: EdgeClass,
    ) -> Result<EdgeId, GraphError> {
        for v in [out_v, in_v] {
            if !self.vertices.contains_key(&v) {
                return Err(GraphError::VertexNotFound(v));
            }
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            id,
            EdgeRecord {
                id,
                out_v,
                in_v,
                label: label.into(),
                class,
            },
        );
        self.edges_out.entry(out_v).or_default().push(id);
        self.edges_in.entry(in_v).or_default().push(id);
        Ok(id)
    }

    /// Convenience for a parent→child `Tree` edge.
    pub fn add_tree_edge(&mut self, parent: VertexId, child: VertexId) -> Result<EdgeId, GraphError> {
        self.add_edge(parent, child, "has", EdgeClass::Tree)
    }

    /// Convenience for a `Cousin` reference edge.
    pub fn add_cousin_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId, GraphError> {
        self.add_edge(from, to, "isA", EdgeClass::Cousin)
    }

    /// Deletes a vertex together with all incident edges.
    ///
    /// Returns `true` if the vertex existed and was removed.
    pub fn delete_vertex_cascade(&mut self, id: VertexId) -> bool {
        let Some(record) = self.vertices.remove(&id) else {
            return false;
        };
        if let Some(set) = self.by_type.get_mut(&record.node_type) {
            set.remove(&id);
            if set.is_empty() {
                self.by_type.remove(&record.node_type);
            }
        }
        let mut incident: Vec<EdgeId> = Vec::new();
        incident.extend(self.edges_out.remove(&id).unwrap_or_default());
        incident.extend(self.edges_in.remove(&id).unwrap_or_default());
        for edge_id in incident {
            let Some(edge) = self.edges.remove(&edge_id) else {
                // Self-loops appear in both buckets.
                continue;
            };
            let other = if edge.out_v == id { edge.in_v } else { edge.out_v };
            if let Some(bucket) = self.edges_in.get_mut(&other) {
                bucket.retain(|e| *e != edge_id);
            }
            if let Some(bucket) = self.edges_out.get_mut(&other) {
                bucket.retain(|e| *e != edge_id);
            }
        }
        true
    }

    fn edge_matches(
        &self,
        edge_id: &EdgeId,
        anchor: VertexId,
        class: Option<EdgeClass>,
        neighbor_types: &[&str],
    ) -> Option<VertexId> {
        let edge = self.edges.get(edge_id)?;
        if class.is_some_and(|c| c != edge.class) {
            return None;
        }
        let other = edge.other_end(anchor)?;
        if neighbor_types.is_empty() {
            return Some(other);
        }
        let ty = self.vertices.get(&other)?.node_type.as_str();
        neighbor_types.contains(&ty).then_some(other)
    }
}

impl GraphAccess for GraphStore {
    fn vertex(&self, id: VertexId) -> Option<&VertexRecord> {
        self.vertices.get(&id)
    }

    fn find_by_property(&self, node_type: &str, property: &str, value: &str) -> Vec<VertexId> {
        self.by_type
            .get(node_type)
            .into_iter()
            .flatten()
            .filter(|id| {
                self.vertices
                    .get(id)
                    .and_then(|v| v.property(property))
                    .is_some_and(|v| v == value)
            })
            .copied()
            .collect()
    }

    fn vertices_of_type(&self, node_type: &str) -> Vec<VertexId> {
        self.by_type
            .get(node_type)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn incident(
        &self,
        id: VertexId,
        class: Option<EdgeClass>,
        direction: Direction,
        neighbor_types: &[&str],
    ) -> Vec<VertexId> {
        let mut out = BTreeSet::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            for e in self.edges_out.get(&id).into_iter().flatten() {
                if let Some(v) = self.edge_matches(e, id, class, neighbor_types) {
                    out.insert(v);
                }
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            for e in self.edges_in.get(&id).into_iter().flatten() {
                if let Some(v) = self.edge_matches(e, id, class, neighbor_types) {
                    out.insert(v);
                }
            }
        }
        out.into_iter().collect()
    }

    fn all_vertices(&self) -> Vec<VertexId> {
        self.vertices.keys().copied().collect()
    }
}
