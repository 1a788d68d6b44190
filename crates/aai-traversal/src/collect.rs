// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instance collector: walks live vertices along a compiled topology.

use std::collections::{BTreeMap, BTreeSet};

use aai_graph::{Direction, VertexId, VertexRecord};
use tracing::debug;

use crate::delete_keys::{DeleteFlag, DeleteKeys};
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::named_query::{NqElementMap, RelatedLookup};
use crate::result_set::ResultSet;
use crate::topology::Topology;
use crate::trail::{StepKey, Trail};

/// What to follow while collecting, and what to stamp on the results.
#[derive(Clone, Copy, Debug)]
pub struct CollectPlan<'p> {
    /// Next steps per trail.
    pub topology: &'p Topology,
    /// Delete flags per trail; absent means every node is `Keep`.
    pub delete_keys: Option<&'p DeleteKeys>,
    /// Named-query elements per trail, in named-query mode.
    pub nq_elements: Option<&'p NqElementMap>,
}

impl<'p> CollectPlan<'p> {
    /// Plain model walk over `topology`.
    pub fn new(topology: &'p Topology) -> Self {
        Self {
            topology,
            delete_keys: None,
            nq_elements: None,
        }
    }

    /// Stamp delete flags from `keys`.
    pub fn with_delete_keys(mut self, keys: &'p DeleteKeys) -> Self {
        self.delete_keys = Some(keys);
        self
    }

    /// Apply named-query elements from `elements`.
    pub fn with_nq_elements(mut self, elements: &'p NqElementMap) -> Self {
        self.nq_elements = Some(elements);
        self
    }
}

impl Engine<'_> {
    /// Collects the result tree rooted at `start`, which sits at `trail`.
    ///
    /// Returns a placeholder (no vertex) when a named-query constraint on the
    /// start step is not met.
    pub fn collect_instance_data(
        &self,
        start: VertexId,
        trail: &Trail,
        plan: CollectPlan<'_>,
    ) -> Result<ResultSet, TraversalError> {
        let mut path = Vec::new();
        self.collect(start, trail, plan, &mut path, 0)
    }

    fn collect(
        &self,
        start: VertexId,
        trail: &Trail,
        plan: CollectPlan<'_>,
        path: &mut Vec<VertexId>,
        depth: usize,
    ) -> Result<ResultSet, TraversalError> {
        self.check_depth(depth)?;
        let record = self
            .graph
            .vertex(start)
            .ok_or_else(|| TraversalError::NotFound(format!("vertex {start}")))?;
        let mut rs = ResultSet::new(start, record.node_type.clone(), trail.clone());

        if let Some(element) = plan.nq_elements.and_then(|m| m.get(trail)) {
            rs.do_not_output = element.do_not_output;
            if let Some(unmet) = element.constraints.iter().find(|c| !c.is_met(record)) {
                debug!(vertex = %start, property = %unmet.property, "named-query constraint not met");
                return Ok(ResultSet::placeholder(record.node_type.clone(), trail.clone()));
            }
            rs.property_limit = element.property_limit;
            rs.property_overrides = element
                .collect
                .as_ref()
                .map(|names| project(record, names.iter().map(String::as_str)));
            rs.extra_properties = self.related_lookups(start, record, &element.lookups);
        }
        rs.delete_flag = plan
            .delete_keys
            .map_or(DeleteFlag::Keep, |keys| keys.flag_for(trail));

        let Some(next) = plan.topology.get(trail) else {
            return Ok(rs);
        };
        let steps: BTreeSet<&StepKey> = next.iter().collect();
        path.push(start);
        for step in steps {
            let child_trail = trail.child(step.clone());
            for neighbor in
                self.graph
                    .incident(start, None, Direction::Both, &[step.node_type.as_str()])
            {
                if path.contains(&neighbor) || !self.persona_matches(neighbor, step) {
                    continue;
                }
                let child = self.collect(neighbor, &child_trail, plan, path, depth + 1)?;
                if !child.is_placeholder() {
                    rs.children.push(child);
                }
            }
        }
        path.pop();
        Ok(rs)
    }

    fn persona_matches(&self, vertex: VertexId, step: &StepKey) -> bool {
        step.persona.as_ref().is_none_or(|p| {
            self.stamped_invariant_id(vertex) == Some(p.model_invariant_id.as_str())
                && self.stamped_version_id(vertex) == Some(p.model_version_id.as_str())
        })
    }

    fn related_lookups(
        &self,
        vertex: VertexId,
        record: &VertexRecord,
        lookups: &[RelatedLookup],
    ) -> Option<BTreeMap<String, String>> {
        let mut extra = BTreeMap::new();
        for lookup in lookups {
            if lookup.source_node_type != record.node_type {
                continue;
            }
            let Some(value) = record.non_empty(&lookup.source_property) else {
                debug!(%vertex, property = %lookup.source_property, "related lookup source value missing");
                continue;
            };
            let targets =
                self.graph
                    .find_by_property(&lookup.target_node_type, &lookup.target_property, value);
            let [target] = targets.as_slice() else {
                debug!(%vertex, found = targets.len(), target = %lookup.target_node_type, "related lookup needs exactly one target");
                continue;
            };
            let Some(target_record) = self.graph.vertex(*target) else {
                continue;
            };
            for name in &lookup.collect {
                if let Some(v) = target_record.property(name) {
                    extra.insert(format!("{}/{name}", lookup.target_node_type), v.to_owned());
                }
            }
        }
        (!extra.is_empty()).then_some(extra)
    }
}

/// The listed properties of `record` that are present.
fn project<'n>(record: &VertexRecord, names: impl Iterator<Item = &'n str>) -> BTreeMap<String, String> {
    names
        .filter_map(|name| record.property(name).map(|v| (name.to_owned(), v.to_owned())))
        .collect()
}
