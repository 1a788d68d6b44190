// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! aai-graph: the graph access facade consumed by the AAI model walker.
//!
//! The walker never talks to a storage engine directly. It reads through
//! [`GraphAccess`], asks [`SchemaIntrospector`] and [`EdgeRules`] about node
//! types, and deletes through [`Serializer`]. This crate defines those ports
//! and ships an in-memory reference implementation of each.
#![forbid(unsafe_code)]

mod access;
mod document;
mod edge_rules;
mod graph;
mod ident;
mod record;
mod schema;
mod serializer;

/// Read-only graph port.
pub use access::GraphAccess;
/// JSON snapshot documents.
pub use document::{DocumentEdge, DocumentError, DocumentVertex, GraphDocument, LoadedGraph};
/// Edge-rule port and the in-memory rule set.
pub use edge_rules::{EdgeRuleSet, EdgeRules};
/// In-memory graph store.
pub use graph::{GraphError, GraphStore};
/// Vertex and edge identifiers.
pub use ident::{EdgeId, VertexId};
/// Vertex/edge records and traversal enums.
pub use record::{
    Direction, EdgeClass, EdgeRecord, VertexRecord, NODE_TYPE_PROPERTY, RESOURCE_VERSION_PROPERTY,
};
/// Schema port and the static schema table.
pub use schema::{SchemaIntrospector, StaticSchema, MODEL_INVARIANT_ID, MODEL_VERSION_ID};
/// Delete port.
pub use serializer::{DeleteError, Serializer};
