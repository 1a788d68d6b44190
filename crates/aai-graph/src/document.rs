// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON graph documents: a portable snapshot of vertices, edges, schema and
//! edge rules used by the CLI and fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge_rules::EdgeRuleSet;
use crate::graph::{GraphError, GraphStore};
use crate::ident::VertexId;
use crate::record::{EdgeClass, VertexRecord};
use crate::schema::StaticSchema;

/// Error type for document load/save.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The document references vertices inconsistently.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

/// One vertex entry in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVertex {
    /// Pinned vertex id.
    pub id: VertexId,
    /// Node type.
    pub node_type: String,
    /// Scalar properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// One edge entry in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEdge {
    /// Source vertex (parent for tree edges).
    #[serde(rename = "out")]
    pub out_v: VertexId,
    /// Destination vertex.
    #[serde(rename = "in")]
    pub in_v: VertexId,
    /// Edge label.
    #[serde(default = "default_label")]
    pub label: String,
    /// Tree or cousin.
    pub class: EdgeClass,
}

fn default_label() -> String {
    "has".to_owned()
}

/// Serialisable graph snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Node-type schema.
    #[serde(default)]
    pub schema: StaticSchema,
    /// Allowed node-type pairs.
    #[serde(default)]
    pub edge_rules: EdgeRuleSet,
    /// Vertices with pinned ids.
    #[serde(default)]
    pub vertices: Vec<DocumentVertex>,
    /// Edges between pinned vertex ids.
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

/// The three collaborators materialised from a document.
#[derive(Debug, Clone, Default)]
pub struct LoadedGraph {
    /// Vertex/edge storage.
    pub store: GraphStore,
    /// Node-type schema.
    pub schema: StaticSchema,
    /// Edge rules.
    pub edge_rules: EdgeRuleSet,
}

impl GraphDocument {
    /// Parses a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a document from `path`.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Writes the document as pretty JSON to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), DocumentError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Builds the in-memory collaborators.
    pub fn load(self) -> Result<LoadedGraph, DocumentError> {
        let mut store = GraphStore::new();
        for v in self.vertices {
            store.insert_vertex(
                v.id,
                VertexRecord {
                    node_type: v.node_type,
                    properties: v.properties,
                },
            )?;
        }
        for e in self.edges {
            store.add_edge(e.out_v, e.in_v, e.label, e.class)?;
        }
        Ok(LoadedGraph {
            store,
            schema: self.schema,
            edge_rules: self.edge_rules,
        })
    }

    /// Snapshots the collaborators back into a document.
    pub fn capture(store: &GraphStore, schema: &StaticSchema, edge_rules: &EdgeRuleSet) -> Self {
        Self {
            schema: schema.clone(),
            edge_rules: edge_rules.clone(),
            vertices: store
                .iter_vertices()
                .map(|(id, rec)| DocumentVertex {
                    id: *id,
                    node_type: rec.node_type.clone(),
                    properties: rec.properties.clone(),
                })
                .collect(),
            edges: store
                .iter_edges()
                .map(|e| DocumentEdge {
                    out_v: e.out_v,
                    in_v: e.in_v,
                    label: e.label.clone(),
                    class: e.class,
                })
                .collect(),
        }
    }
}
