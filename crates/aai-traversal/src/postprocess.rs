// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Result-set post-processing: secondary-filter pruning and do-not-output
//! collapsing. Both build new trees.

use aai_graph::GraphAccess;
use tracing::debug;

use crate::error::TraversalError;
use crate::result_set::ResultSet;
use crate::start_nodes::{parse_filter_key, FilterHash};

/// Drops subtrees rooted at `cut_point` nodes that do not satisfy `filters`.
///
/// A cut-point node is kept when every `node-type.property = value` filter is
/// met by the node itself or by a node of its already-pruned subtree. Other
/// nodes are kept with their children pruned. Returns `None` when the root
/// itself is dropped. Applying the same pruning twice changes nothing.
pub fn prune_by_secondary_filter(
    graph: &dyn GraphAccess,
    rs: &ResultSet,
    cut_point: &str,
    filters: &FilterHash,
) -> Result<Option<ResultSet>, TraversalError> {
    let mut parsed = Vec::with_capacity(filters.len());
    for (key, value) in filters {
        let (node_type, property) = parse_filter_key(key)?;
        parsed.push((node_type, property, value.as_str()));
    }
    Ok(prune(graph, rs, cut_point, &parsed))
}

fn prune(
    graph: &dyn GraphAccess,
    rs: &ResultSet,
    cut_point: &str,
    filters: &[(&str, &str, &str)],
) -> Option<ResultSet> {
    let mut kept = rs.shallow();
    kept.children = rs
        .children
        .iter()
        .filter_map(|child| prune(graph, child, cut_point, filters))
        .collect();
    if rs.node_type == cut_point {
        let satisfied = filters
            .iter()
            .all(|&(node_type, property, value)| subtree_has(graph, &kept, node_type, property, value));
        if !satisfied {
            debug!(vertex = ?rs.vertex, cut_point, "subtree pruned by secondary filter");
            return None;
        }
    }
    Some(kept)
}

fn subtree_has(
    graph: &dyn GraphAccess,
    rs: &ResultSet,
    node_type: &str,
    property: &str,
    value: &str,
) -> bool {
    let here = rs.node_type == node_type
        && rs
            .vertex
            .and_then(|v| graph.property(v, property))
            .is_some_and(|actual| actual == value);
    here || rs
        .children
        .iter()
        .any(|child| subtree_has(graph, child, node_type, property, value))
}

/// Splices out do-not-output nodes, lifting their collapsed children into
/// their place. A hidden root yields several sibling trees.
pub fn collapse_do_not_output(rs: ResultSet) -> Vec<ResultSet> {
    let mut rs = rs;
    let children = std::mem::take(&mut rs.children);
    let collapsed: Vec<ResultSet> = children.into_iter().flat_map(collapse_do_not_output).collect();
    if rs.do_not_output {
        collapsed
    } else {
        rs.children = collapsed;
        vec![rs]
    }
}
