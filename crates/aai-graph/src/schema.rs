// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema/type port: which node types exist and which properties they declare.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Schema property naming the model a vertex was created under.
pub const MODEL_INVARIANT_ID: &str = "model-invariant-id";
/// Schema property naming the model version a vertex was created under.
pub const MODEL_VERSION_ID: &str = "model-version-id";

/// Introspection over the node-type schema.
pub trait SchemaIntrospector {
    /// Declared property names of `node_type`, or `None` for an unknown type.
    fn property_set(&self, node_type: &str) -> Option<BTreeSet<String>>;

    /// Whether `node_type` is declared at all.
    fn is_known_type(&self, node_type: &str) -> bool {
        self.property_set(node_type).is_some()
    }
}

/// Schema backed by a static table of node types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticSchema {
    types: BTreeMap<String, BTreeSet<String>>,
}

impl StaticSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `node_type` with the given properties (merging on repeat).
    pub fn declare<I, P>(&mut self, node_type: &str, properties: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.types
            .entry(node_type.to_owned())
            .or_default()
            .extend(properties.into_iter().map(Into::into));
        self
    }

    /// Declares `node_type` carrying the two persona properties in addition
    /// to `properties`.
    pub fn declare_with_persona<I, P>(&mut self, node_type: &str, properties: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.declare(node_type, properties)
            .declare(node_type, [MODEL_INVARIANT_ID, MODEL_VERSION_ID])
    }

    /// Iterate over declared node types.
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl SchemaIntrospector for StaticSchema {
    fn property_set(&self, node_type: &str) -> Option<BTreeSet<String>> {
        self.types.get(node_type).cloned()
    }

    fn is_known_type(&self, node_type: &str) -> bool {
        self.types.contains_key(node_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_declaration_adds_both_ids() {
        let mut schema = StaticSchema::new();
        schema.declare_with_persona("generic-vnf", ["vnf-id"]);
        let props = schema.property_set("generic-vnf").unwrap_or_default();
        assert!(props.contains(MODEL_INVARIANT_ID));
        assert!(props.contains(MODEL_VERSION_ID));
        assert!(props.contains("vnf-id"));
        assert!(!schema.is_known_type("pserver"));
    }
}
