// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Delete by model.
//!
//! Planning reads the graph; execution mutates it through a [`Serializer`].
//! Keeping the two apart lets one store serve as both reader and writer.

use std::collections::{BTreeMap, BTreeSet};
use std::slice;

use aai_app_core::EngineConfig;
use aai_graph::{
    DeleteError, EdgeRules, GraphAccess, SchemaIntrospector, Serializer, VertexId, MODEL_VERSION_ID,
    RESOURCE_VERSION_PROPERTY,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::collect::CollectPlan;
use crate::definitions::ModelKind;
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::start_nodes::{FilterHash, ModelSelector};
use crate::trail::Trail;
use crate::vocab::MODEL_VER;

/// Delete-by-model request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Model-ver to delete by.
    pub model_version_id: String,
    /// Expected top node type.
    pub top_node_type: Option<String>,
    /// Filter identifying the single start node.
    pub start_filter: FilterHash,
    /// Caller's resource-version for the start node; checked when present.
    pub resource_version: Option<String>,
}

/// One vertex scheduled for deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteStep {
    /// Vertex to delete.
    pub vertex: VertexId,
    /// Human-readable description returned on success.
    pub description: String,
    /// The start node; its resource-version is checked.
    pub is_start: bool,
}

/// Ordered deletes, children before parents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletePlan {
    steps: Vec<DeleteStep>,
    resource_version: Option<String>,
}

impl DeletePlan {
    /// Scheduled steps in execution order.
    pub fn steps(&self) -> &[DeleteStep] {
        &self.steps
    }

    /// `true` when nothing will be deleted.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the plan.
    ///
    /// Per-vertex failures are logged and skipped, except a resource-version
    /// mismatch on the start node, which aborts.
    pub fn execute(
        &self,
        serializer: &mut dyn Serializer,
    ) -> Result<BTreeMap<VertexId, String>, TraversalError> {
        let mut deleted = BTreeMap::new();
        for step in &self.steps {
            let check = step.is_start && self.resource_version.is_some();
            let expected = if check {
                self.resource_version.as_deref()
            } else {
                None
            };
            match serializer.delete(step.vertex, expected, check) {
                Ok(()) => {
                    deleted.insert(step.vertex, step.description.clone());
                }
                Err(DeleteError::VersionMismatch {
                    vertex,
                    expected,
                    found,
                }) if check => {
                    return Err(TraversalError::ResourceVersionMismatch {
                        vertex,
                        expected,
                        found,
                    });
                }
                Err(err) => {
                    warn!(vertex = %step.vertex, %err, "delete failed; continuing");
                }
            }
        }
        info!(deleted = deleted.len(), planned = self.steps.len(), "delete by model complete");
        Ok(deleted)
    }
}

impl Engine<'_> {
    /// Plans a delete by model without touching the graph.
    ///
    /// Widget models delete the single start node. Resource and service
    /// models resolve delete keys, check the start node's persona against the
    /// model, collect with the keys, and schedule every `T` node bottom-up.
    /// A caller-supplied resource-version is checked here, before anything
    /// is scheduled.
    #[instrument(skip(self, request), fields(model_version_id = %request.model_version_id))]
    pub fn plan_delete_by_model(
        &self,
        request: &DeleteRequest,
    ) -> Result<DeletePlan, TraversalError> {
        let ver =
            self.node_using_unique_id(MODEL_VER, MODEL_VERSION_ID, &request.model_version_id)?;
        let selector = ModelSelector::by_version(request.model_version_id.clone());
        let top_node_type =
            self.model_ver_top_widget_type(&selector, request.top_node_type.as_deref())?;
        if request.start_filter.is_empty() {
            return Err(TraversalError::BadInput(
                "delete by model requires a start-node filter".into(),
            ));
        }
        let starts = self.resolve_start_nodes(
            &selector,
            slice::from_ref(&request.start_filter),
            &top_node_type,
        )?;
        let start = match starts.keys().copied().collect::<Vec<_>>().as_slice() {
            [one] => *one,
            many => {
                return Err(TraversalError::Ambiguous(format!(
                    "{} start nodes match the delete filter",
                    many.len()
                )))
            }
        };
        if let Some(expected) = request.resource_version.as_deref() {
            self.check_resource_version(start, expected)?;
        }
        let root = self.root_trail(ver)?;

        let mut steps = Vec::new();
        if self.defs().ver_kind(ver)? == ModelKind::Widget {
            steps.push(DeleteStep {
                vertex: start,
                description: describe(&top_node_type, start, &root),
                is_start: true,
            });
        } else {
            let persona = self.defs().persona_of(ver)?;
            if self.supports_persona(&top_node_type)
                && (self.stamped_invariant_id(start) != Some(persona.model_invariant_id.as_str())
                    || self.stamped_version_id(start) != Some(persona.model_version_id.as_str()))
            {
                return Err(TraversalError::PersonaMismatch {
                    vertex: start,
                    detail: format!(
                        "start node is not stamped with model {}/{}",
                        persona.model_invariant_id, persona.model_version_id
                    ),
                });
            }
            let keys = self.resolve_delete_keys(ver)?;
            let topology = self.compile_topology(ver)?;
            let tree = self.collect_instance_data(
                start,
                &root,
                CollectPlan::new(&topology).with_delete_keys(&keys),
            )?;
            let mut seen = BTreeSet::new();
            for node in tree.post_order() {
                let Some(vertex) = node.vertex else { continue };
                if node.delete_flag.is_delete() && seen.insert(vertex) {
                    steps.push(DeleteStep {
                        vertex,
                        description: describe(&node.node_type, vertex, &node.trail),
                        is_start: vertex == start,
                    });
                }
            }
        }
        Ok(DeletePlan {
            steps,
            resource_version: request.resource_version.clone(),
        })
    }

    fn check_resource_version(&self, vertex: VertexId, expected: &str) -> Result<(), TraversalError> {
        let found = self
            .graph
            .vertex(vertex)
            .and_then(|v| v.non_empty(RESOURCE_VERSION_PROPERTY));
        if found == Some(expected) {
            return Ok(());
        }
        Err(TraversalError::ResourceVersionMismatch {
            vertex,
            expected: Some(expected.to_owned()),
            found: found.map(str::to_owned),
        })
    }
}

fn describe(node_type: &str, vertex: VertexId, trail: &Trail) -> String {
    format!("{node_type} {vertex} at {trail}")
}

/// Plans against `graph` and then deletes through it.
pub fn run_delete_by_model<G>(
    graph: &mut G,
    schema: &dyn SchemaIntrospector,
    rules: &dyn EdgeRules,
    config: &EngineConfig,
    request: &DeleteRequest,
) -> Result<BTreeMap<VertexId, String>, TraversalError>
where
    G: GraphAccess + Serializer,
{
    let plan = Engine::new(&*graph, schema, rules)
        .with_config(config.clone())
        .plan_delete_by_model(request)?;
    plan.execute(graph)
}
