// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Serializer port: the only mutation the walker performs is vertex deletion.

use thiserror::Error;

use crate::graph::GraphStore;
use crate::ident::VertexId;
use crate::record::RESOURCE_VERSION_PROPERTY;

/// Failure reported by [`Serializer::delete`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    /// The caller's resource-version does not match the stored one.
    #[error("resource-version mismatch on vertex {vertex}: expected {expected:?}, found {found:?}")]
    VersionMismatch {
        /// Vertex whose version was checked.
        vertex: VertexId,
        /// Version supplied by the caller.
        expected: Option<String>,
        /// Version stored on the vertex.
        found: Option<String>,
    },
    /// The vertex is already gone.
    #[error("vertex {0} not found")]
    NotFound(VertexId),
    /// Any other storage failure.
    #[error("delete failed: {0}")]
    Other(String),
}

/// Performs deletes on behalf of the walker.
pub trait Serializer {
    /// Deletes `vertex` (and its incident edges).
    ///
    /// When `require_version_check` is set, the stored `resource-version` must
    /// equal `expected_resource_version`.
    fn delete(
        &mut self,
        vertex: VertexId,
        expected_resource_version: Option<&str>,
        require_version_check: bool,
    ) -> Result<(), DeleteError>;
}

impl Serializer for GraphStore {
    fn delete(
        &mut self,
        vertex: VertexId,
        expected_resource_version: Option<&str>,
        require_version_check: bool,
    ) -> Result<(), DeleteError> {
        let record = self
            .vertices
            .get(&vertex)
            .ok_or(DeleteError::NotFound(vertex))?;
        if require_version_check {
            let found = record.non_empty(RESOURCE_VERSION_PROPERTY);
            if found.is_none() || found != expected_resource_version {
                return Err(DeleteError::VersionMismatch {
                    vertex,
                    expected: expected_resource_version.map(str::to_owned),
                    found: found.map(str::to_owned),
                });
            }
        }
        if self.delete_vertex_cascade(vertex) {
            Ok(())
        } else {
            Err(DeleteError::NotFound(vertex))
        }
    }
}
