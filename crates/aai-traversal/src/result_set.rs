// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Result trees produced by the instance collector.

use std::collections::BTreeMap;

use aai_graph::VertexId;
use serde::Serialize;

use crate::delete_keys::DeleteFlag;
use crate::trail::Trail;

/// How much of a vertex a caller wants rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyLimitDesc {
    /// Every property.
    ShowAll,
    /// No properties.
    ShowNone,
    /// Node type and key properties only.
    NameAndKeysOnly,
}

impl PropertyLimitDesc {
    /// Parses the stored descriptor (`SHOW_ALL`, `SHOW_NONE`, `NAME_AND_KEYS_ONLY`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SHOW_ALL" => Some(Self::ShowAll),
            "SHOW_NONE" => Some(Self::ShowNone),
            "NAME_AND_KEYS_ONLY" => Some(Self::NameAndKeysOnly),
            _ => None,
        }
    }
}

/// One node of a result tree.
///
/// `vertex` is `None` only for the placeholder returned when a named-query
/// constraint stops collection; placeholders are never attached to a parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    /// Live vertex wrapped by this node.
    pub vertex: Option<VertexId>,
    /// Node type of `vertex`.
    pub node_type: String,
    /// Position in the topology.
    pub trail: Trail,
    /// Delete eligibility.
    pub delete_flag: DeleteFlag,
    /// Hidden by a named-query element; removed by collapsing.
    pub do_not_output: bool,
    /// Rendering limit from the named-query element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_limit: Option<PropertyLimitDesc>,
    /// Projection of the vertex's properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_overrides: Option<BTreeMap<String, String>>,
    /// Properties gathered from a related lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_properties: Option<BTreeMap<String, String>>,
    /// Collected children, in walk order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResultSet>,
}

impl ResultSet {
    /// Empty node for `vertex` at `trail`.
    pub fn new(vertex: VertexId, node_type: impl Into<String>, trail: Trail) -> Self {
        Self {
            vertex: Some(vertex),
            node_type: node_type.into(),
            trail,
            delete_flag: DeleteFlag::Keep,
            do_not_output: false,
            property_limit: None,
            property_overrides: None,
            extra_properties: None,
            children: Vec::new(),
        }
    }

    /// Placeholder for a subtree that contributes nothing.
    pub fn placeholder(node_type: impl Into<String>, trail: Trail) -> Self {
        Self {
            vertex: None,
            ..Self::new(VertexId(0), node_type, trail)
        }
    }

    /// `true` for the constraint-stop placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.vertex.is_none()
    }

    /// Copy of this node without children.
    #[must_use]
    pub fn shallow(&self) -> Self {
        Self {
            vertex: self.vertex,
            node_type: self.node_type.clone(),
            trail: self.trail.clone(),
            delete_flag: self.delete_flag,
            do_not_output: self.do_not_output,
            property_limit: self.property_limit,
            property_overrides: self.property_overrides.clone(),
            extra_properties: self.extra_properties.clone(),
            children: Vec::new(),
        }
    }

    /// Vertices in this tree, children before parents.
    pub fn post_order(&self) -> Vec<&ResultSet> {
        let mut out = Vec::new();
        self.push_post_order(&mut out);
        out
    }

    fn push_post_order<'a>(&'a self, out: &mut Vec<&'a ResultSet>) {
        for child in &self.children {
            child.push_post_order(out);
        }
        out.push(self);
    }

    /// Number of nodes in this tree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ResultSet::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::StepKey;

    #[test]
    fn post_order_visits_children_first() {
        let root_trail = Trail::root(StepKey::plain("generic-vnf"));
        let mut root = ResultSet::new(VertexId(1), "generic-vnf", root_trail.clone());
        let mut vs = ResultSet::new(
            VertexId(2),
            "vserver",
            root_trail.child(StepKey::plain("vserver")),
        );
        vs.children.push(ResultSet::new(
            VertexId(3),
            "tenant",
            vs.trail.child(StepKey::plain("tenant")),
        ));
        root.children.push(vs);
        let order: Vec<_> = root.post_order().iter().filter_map(|r| r.vertex).collect();
        assert_eq!(order, vec![VertexId(3), VertexId(2), VertexId(1)]);
        assert_eq!(root.size(), 3);
    }

    #[test]
    fn property_limit_parses_known_values() {
        assert_eq!(PropertyLimitDesc::parse("show_none"), Some(PropertyLimitDesc::ShowNone));
        assert_eq!(PropertyLimitDesc::parse("bogus"), None);
    }
}
