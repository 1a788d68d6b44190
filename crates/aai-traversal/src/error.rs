// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Coded errors surfaced by every traversal operation.

use std::time::Duration;

use aai_graph::VertexId;
use thiserror::Error;

/// Error returned by topology compilation, collection, resolution and delete.
///
/// Each variant maps to a stable `AAI_61xx` code via [`TraversalError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// Missing, blank or conflicting request identifiers; malformed filter keys.
    #[error("bad input: {0}")]
    BadInput(String),
    /// No vertex matched a lookup or start-node filter.
    #[error("not found: {0}")]
    NotFound(String),
    /// More than one vertex matched where exactly one was required.
    #[error("ambiguous: {0}")]
    Ambiguous(String),
    /// A start vertex's stamped persona contradicts the requested model.
    #[error("persona mismatch on vertex {vertex}: {detail}")]
    PersonaMismatch {
        /// Offending start vertex.
        vertex: VertexId,
        /// Which identifier disagreed.
        detail: String,
    },
    /// Node type not declared by the schema.
    #[error("unrecognized node type: {0}")]
    UnknownNodeType(String),
    /// No edge rule connects the two node types.
    #[error("no edge rule between {from} and {to}")]
    MissingEdgeRule {
        /// Parent node type.
        from: String,
        /// Child node type.
        to: String,
    },
    /// Model / model-ver / model-element definition is unusable.
    #[error("malformed model definition: {0}")]
    MalformedModel(String),
    /// A model-element vertex was revisited on one branch.
    #[error("looping model-element {0} detected")]
    LoopingModelElement(VertexId),
    /// Named-query definition is unusable.
    #[error("malformed named query: {0}")]
    MalformedNamedQuery(String),
    /// Recursion went deeper than the configured ceiling.
    #[error("traversal depth exceeded the limit of {max} levels")]
    DepthExceeded {
        /// Configured ceiling.
        max: usize,
    },
    /// Resource-version check failed on the checked top vertex.
    #[error("resource-version mismatch on vertex {vertex}: expected {expected:?}, found {found:?}")]
    ResourceVersionMismatch {
        /// Vertex whose version was checked.
        vertex: VertexId,
        /// Version supplied by the caller.
        expected: Option<String>,
        /// Version stored on the vertex.
        found: Option<String>,
    },
    /// The whole query ran longer than the configured limit.
    #[error("query exceeded the time limit of {0:?}")]
    QueryTimeout(Duration),
    /// More start nodes than the configured result-set cap.
    #[error("{found} result sets exceed the maximum of {max}")]
    TooManyResultSets {
        /// Number of start nodes found.
        found: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Worker pool or task failure in the timed query service.
    #[error("query runtime failure: {0}")]
    Runtime(String),
}

impl TraversalError {
    /// Stable error code for callers that map errors onto responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ambiguous(_) => "AAI_6112",
            Self::NotFound(_) | Self::PersonaMismatch { .. } => "AAI_6114",
            Self::UnknownNodeType(_) => "AAI_6115",
            Self::BadInput(_) => "AAI_6118",
            Self::MissingEdgeRule { .. } => "AAI_6120",
            Self::DepthExceeded { .. } => "AAI_6125",
            Self::ResourceVersionMismatch { .. } => "AAI_6130",
            Self::MalformedModel(_) | Self::LoopingModelElement(_) => "AAI_6132",
            Self::MalformedNamedQuery(_) => "AAI_6133",
            Self::QueryTimeout(_) => "AAI_6140",
            Self::TooManyResultSets { .. } => "AAI_6141",
            Self::Runtime(_) => "AAI_4000",
        }
    }
}
