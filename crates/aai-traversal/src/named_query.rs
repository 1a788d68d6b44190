// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named queries: widget-only query definitions with per-step constraints,
//! projections and related lookups.

use std::collections::BTreeMap;

use aai_graph::{Direction, EdgeClass, VertexId, VertexRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::collect::CollectPlan;
use crate::definitions::ModelKind;
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::postprocess::{collapse_do_not_output, prune_by_secondary_filter};
use crate::result_set::{PropertyLimitDesc, ResultSet};
use crate::start_nodes::FilterHash;
use crate::topology::Topology;
use crate::trail::{StepKey, Trail};
use crate::vocab::{
    CONSTRAINT_TYPE, DO_NOT_OUTPUT, MODEL, NAMED_QUERY, NAMED_QUERY_ELEMENT, NAMED_QUERY_UUID,
    PROPERTY_COLLECT_LIST, PROPERTY_CONSTRAINT, PROPERTY_LIMIT_DESC, PROPERTY_NAME,
    PROPERTY_VALUE, RELATED_LOOKUP, SOURCE_NODE_PROPERTY, SOURCE_NODE_TYPE, TARGET_NODE_PROPERTY,
    TARGET_NODE_TYPE,
};

/// Comparison applied by a property constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Property must equal the value.
    Equals,
    /// Property must be absent or differ from the value.
    NotEquals,
}

/// Gate on an instance property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyConstraint {
    /// Comparison.
    pub kind: ConstraintKind,
    /// Instance property name.
    pub property: String,
    /// Value compared against.
    pub value: String,
}

impl PropertyConstraint {
    /// Evaluates the constraint against an instance.
    pub fn is_met(&self, record: &VertexRecord) -> bool {
        let actual = record.property(&self.property);
        match self.kind {
            ConstraintKind::Equals => actual == Some(self.value.as_str()),
            ConstraintKind::NotEquals => actual != Some(self.value.as_str()),
        }
    }
}

/// Join from the current instance to an unconnected vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedLookup {
    /// Node type the lookup applies to.
    pub source_node_type: String,
    /// Property read off the current instance.
    pub source_property: String,
    /// Node type of the looked-up vertex.
    pub target_node_type: String,
    /// Property of the target that must equal the source value.
    pub target_property: String,
    /// Target properties to collect.
    pub collect: Vec<String>,
}

/// A named-query-element loaded into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedQueryElement {
    /// The named-query-element vertex.
    pub id: VertexId,
    /// Widget node type it matches.
    pub node_type: String,
    /// Hide matched instances from the output.
    pub do_not_output: bool,
    /// Rendering limit.
    pub property_limit: Option<PropertyLimitDesc>,
    /// Projection override.
    pub collect: Option<Vec<String>>,
    /// Constraints that must all hold.
    pub constraints: Vec<PropertyConstraint>,
    /// Related lookups.
    pub lookups: Vec<RelatedLookup>,
}

/// Trail → named-query element.
pub type NqElementMap = BTreeMap<Trail, NamedQueryElement>;

/// Everything needed to collect a named query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedQueryPlan {
    /// Top trail.
    pub root: Trail,
    /// Next steps per trail.
    pub topology: Topology,
    /// Element per trail.
    pub elements: NqElementMap,
}

/// Named-query request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedQueryRequest {
    /// `named-query-uuid` of the query to run.
    pub named_query_uuid: String,
    /// Start-node filters; each must name the top node type.
    pub start_filters: Vec<FilterHash>,
    /// Node type at which secondary filters are evaluated.
    pub secondary_filter_cut_point: Option<String>,
    /// Secondary filters, `node-type.property` → value.
    pub secondary_filters: FilterHash,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn truthy(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("t"))
}

impl Engine<'_> {
    fn nq_required(&self, id: VertexId, property: &str) -> Result<String, TraversalError> {
        self.graph
            .vertex(id)
            .and_then(|v| v.non_empty(property))
            .map(str::to_owned)
            .ok_or_else(|| {
                TraversalError::MalformedNamedQuery(format!("{property} missing on vertex {id}"))
            })
    }

    fn nq_children(&self, id: VertexId, node_type: &str) -> Vec<VertexId> {
        self.graph
            .incident(id, Some(EdgeClass::Tree), Direction::Out, &[node_type])
    }

    /// Widget node type a named-query-element matches.
    pub fn nq_element_widget_type(&self, element: VertexId) -> Result<String, TraversalError> {
        let models = self
            .graph
            .incident(element, Some(EdgeClass::Cousin), Direction::Out, &[MODEL]);
        let [model] = models.as_slice() else {
            return Err(TraversalError::MalformedNamedQuery(format!(
                "named-query-element {element} must reference exactly one model, found {}",
                models.len()
            )));
        };
        let defs = self.defs();
        if defs.model_kind(*model)? != ModelKind::Widget {
            return Err(TraversalError::MalformedNamedQuery(format!(
                "named-query-element {element} must reference a widget model"
            )));
        }
        let mut names = Vec::new();
        for ver in defs.model_vers(*model) {
            let name = defs.model_name(ver)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        match names.as_slice() {
            [one] => Ok(one.clone()),
            [] => Err(TraversalError::MalformedNamedQuery(format!(
                "widget model {model} has no model-ver"
            ))),
            _ => Err(TraversalError::MalformedNamedQuery(format!(
                "widget model {model} has versions naming different node types"
            ))),
        }
    }

    /// Loads one named-query-element with its constraints and lookups.
    pub fn load_nq_element(&self, element: VertexId) -> Result<NamedQueryElement, TraversalError> {
        let record = self
            .graph
            .vertex(element)
            .ok_or_else(|| TraversalError::NotFound(format!("vertex {element}")))?;
        let property_limit = record.non_empty(PROPERTY_LIMIT_DESC).and_then(|raw| {
            let parsed = PropertyLimitDesc::parse(raw);
            if parsed.is_none() {
                debug!(%element, raw, "unrecognized property-limit-desc ignored");
            }
            parsed
        });
        let collect = record
            .non_empty(PROPERTY_COLLECT_LIST)
            .map(split_list)
            .filter(|l| !l.is_empty());

        let mut constraints = Vec::new();
        for c in self.nq_children(element, PROPERTY_CONSTRAINT) {
            let raw = self.nq_required(c, CONSTRAINT_TYPE)?;
            let kind = match raw.to_ascii_uppercase().as_str() {
                "EQUALS" => ConstraintKind::Equals,
                "NOT-EQUALS" => ConstraintKind::NotEquals,
                _ => {
                    return Err(TraversalError::MalformedNamedQuery(format!(
                        "unrecognized constraint-type {raw:?} on {c}"
                    )))
                }
            };
            constraints.push(PropertyConstraint {
                kind,
                property: self.nq_required(c, PROPERTY_NAME)?,
                value: self
                    .graph
                    .property(c, PROPERTY_VALUE)
                    .unwrap_or_default()
                    .to_owned(),
            });
        }

        let mut lookups = Vec::new();
        for l in self.nq_children(element, RELATED_LOOKUP) {
            lookups.push(RelatedLookup {
                source_node_type: self.nq_required(l, SOURCE_NODE_TYPE)?,
                source_property: self.nq_required(l, SOURCE_NODE_PROPERTY)?,
                target_node_type: self.nq_required(l, TARGET_NODE_TYPE)?,
                target_property: self.nq_required(l, TARGET_NODE_PROPERTY)?,
                collect: self
                    .graph
                    .property(l, PROPERTY_COLLECT_LIST)
                    .map(split_list)
                    .unwrap_or_default(),
            });
        }

        Ok(NamedQueryElement {
            id: element,
            node_type: self.nq_element_widget_type(element)?,
            do_not_output: truthy(record.property(DO_NOT_OUTPUT)),
            property_limit,
            collect,
            constraints,
            lookups,
        })
    }

    /// The single top element of `named_query`.
    pub fn named_query_top(&self, named_query: VertexId) -> Result<VertexId, TraversalError> {
        self.defs().expect_type(named_query, NAMED_QUERY)?;
        let tops = self.nq_children(named_query, NAMED_QUERY_ELEMENT);
        match tops.as_slice() {
            [one] => Ok(*one),
            [] => Err(TraversalError::MalformedNamedQuery(format!(
                "named-query {named_query} has no top element"
            ))),
            _ => Err(TraversalError::Ambiguous(format!(
                "named-query {named_query} has {} top elements",
                tops.len()
            ))),
        }
    }

    /// Compiles the topology and element map of `named_query`.
    #[instrument(skip(self), level = "debug")]
    pub fn compile_named_query_topology(
        &self,
        named_query: VertexId,
    ) -> Result<NamedQueryPlan, TraversalError> {
        let top = self.named_query_top(named_query)?;
        self.plan_from_top(top)
    }

    /// Trail → element map for the named-query tree under `top`.
    pub fn collect_nq_element_map(&self, top: VertexId) -> Result<NqElementMap, TraversalError> {
        self.plan_from_top(top).map(|plan| plan.elements)
    }

    fn plan_from_top(&self, top: VertexId) -> Result<NamedQueryPlan, TraversalError> {
        let root = Trail::root(StepKey::plain(self.nq_element_widget_type(top)?));
        let mut plan = NamedQueryPlan {
            root: root.clone(),
            topology: Topology::new(),
            elements: NqElementMap::new(),
        };
        let mut branch = Vec::new();
        self.nq_walk(top, &root, &mut plan, &mut branch, 0)?;
        Ok(plan)
    }

    fn nq_walk(
        &self,
        element: VertexId,
        trail: &Trail,
        plan: &mut NamedQueryPlan,
        branch: &mut Vec<VertexId>,
        depth: usize,
    ) -> Result<(), TraversalError> {
        self.check_depth(depth)?;
        let loaded = self.load_nq_element(element)?;
        let parent_type = loaded.node_type.clone();
        plan.elements.insert(trail.clone(), loaded);
        branch.push(element);
        for child in self.nq_children(element, NAMED_QUERY_ELEMENT) {
            if branch.contains(&child) {
                debug!(%child, %trail, "named-query-element already on this branch; not descended");
                continue;
            }
            let node_type = self.nq_element_widget_type(child)?;
            self.check_edge_rule(&parent_type, &node_type)?;
            let key = StepKey::plain(node_type);
            let next = trail.child(key.clone());
            plan.topology.entry(trail.clone()).or_default().push(key);
            self.nq_walk(child, &next, plan, branch, depth + 1)?;
        }
        branch.pop();
        Ok(())
    }

    /// Runs a named query end to end.
    ///
    /// Start nodes come from the filters, placeholder roots are dropped,
    /// secondary-filter pruning applies when a cut point and filters are
    /// given, and do-not-output nodes are collapsed last.
    #[instrument(skip(self, request), fields(named_query = %request.named_query_uuid))]
    pub fn query_by_named_query(
        &self,
        request: &NamedQueryRequest,
    ) -> Result<Vec<ResultSet>, TraversalError> {
        let named_query =
            self.node_using_unique_id(NAMED_QUERY, NAMED_QUERY_UUID, &request.named_query_uuid)?;
        let plan = self.compile_named_query_topology(named_query)?;
        let top_type = plan
            .root
            .last()
            .map(|s| s.node_type.clone())
            .unwrap_or_default();
        if request.start_filters.is_empty() {
            return Err(TraversalError::BadInput(
                "named query requires at least one start-node filter".into(),
            ));
        }
        let starts = self.start_vertices(&request.start_filters, &top_type)?;
        if starts.len() > self.config.max_result_sets {
            return Err(TraversalError::TooManyResultSets {
                found: starts.len(),
                max: self.config.max_result_sets,
            });
        }

        let collect_plan = CollectPlan::new(&plan.topology).with_nq_elements(&plan.elements);
        let mut results = Vec::new();
        for start in starts {
            let rs = self.collect_instance_data(start, &plan.root, collect_plan)?;
            if rs.is_placeholder() {
                debug!(%start, "start node filtered out by named-query constraint");
                continue;
            }
            results.push(rs);
        }

        if let Some(cut_point) = request.secondary_filter_cut_point.as_deref() {
            if !request.secondary_filters.is_empty() {
                let mut pruned = Vec::with_capacity(results.len());
                for rs in &results {
                    if let Some(kept) = prune_by_secondary_filter(
                        self.graph,
                        rs,
                        cut_point,
                        &request.secondary_filters,
                    )? {
                        pruned.push(kept);
                    }
                }
                results = pruned;
            }
        }

        let results: Vec<ResultSet> = results.into_iter().flat_map(collapse_do_not_output).collect();
        info!(results = results.len(), "named query complete");
        Ok(results)
    }
}
