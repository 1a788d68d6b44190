// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier types for vertices and edges.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Strongly typed identifier for a vertex in the inventory graph.
///
/// Ids are opaque and stable for the lifetime of a store. The in-memory
/// [`GraphStore`](crate::GraphStore) hands them out sequentially, documents may
/// pin them explicitly.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u64);

impl VertexId {
    /// Returns the raw numeric value of this id.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a directed edge within the graph.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// Returns the raw numeric value of this id.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn vertex_id_displays_raw_value() {
        assert_eq!(VertexId(42).to_string(), "42");
        assert_eq!(VertexId(7).value(), 7);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&VertexId(9)).unwrap();
        assert_eq!(json, "9");
        let back: EdgeId = serde_json::from_str("11").unwrap();
        assert_eq!(back, EdgeId(11));
    }
}
