// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query by model.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use aai_graph::{VertexId, MODEL_VERSION_ID};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::collect::CollectPlan;
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::result_set::ResultSet;
use crate::start_nodes::{FilterHash, ModelSelector};
use crate::topology::Topology;
use crate::trail::Trail;
use crate::vocab::MODEL_VER;

/// Query-by-model request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelQuery {
    /// Model identifiers.
    #[serde(flatten)]
    pub selector: ModelSelector,
    /// Expected top node type.
    pub top_node_type: Option<String>,
    /// Start-node filters.
    pub start_filters: Vec<FilterHash>,
}

impl Engine<'_> {
    /// Single-step trail a walk of `model_ver` starts at.
    pub fn root_trail(&self, model_ver: VertexId) -> Result<Trail, TraversalError> {
        if let Some(top) = self.resolve_top(model_ver)? {
            return Ok(top.trail);
        }
        let defs = self.defs();
        let node_type = defs.model_name(model_ver)?;
        Ok(Trail::root(
            self.step_key(&node_type, defs.persona_of(model_ver).ok()),
        ))
    }

    /// Collects one result tree per start node.
    ///
    /// Requires either some model identifier, or a top node type together
    /// with start filters. One topology is compiled per model-ver used.
    #[instrument(skip(self, request))]
    pub fn query_by_model(&self, request: &ModelQuery) -> Result<Vec<ResultSet>, TraversalError> {
        let selector = &request.selector;
        let top_node_type = if selector.is_empty() {
            match request.top_node_type.as_deref() {
                Some(t) if !request.start_filters.is_empty() => t.to_owned(),
                _ => {
                    return Err(TraversalError::BadInput(
                        "a model identifier, or a top node type with start filters, is required"
                            .into(),
                    ))
                }
            }
        } else {
            self.model_ver_top_widget_type(selector, request.top_node_type.as_deref())?
        };

        let starts = self.resolve_start_nodes(selector, &request.start_filters, &top_node_type)?;
        if starts.len() > self.config.max_result_sets {
            return Err(TraversalError::TooManyResultSets {
                found: starts.len(),
                max: self.config.max_result_sets,
            });
        }

        let mut compiled: BTreeMap<String, (Trail, Topology)> = BTreeMap::new();
        let mut results = Vec::with_capacity(starts.len());
        for (start, version_id) in starts {
            let (root, topology) = match compiled.entry(version_id) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let ver = self.node_using_unique_id(MODEL_VER, MODEL_VERSION_ID, e.key())?;
                    let root = self.root_trail(ver)?;
                    let topology = self.compile_topology(ver)?;
                    e.insert((root, topology))
                }
            };
            results.push(self.collect_instance_data(start, root, CollectPlan::new(topology))?);
        }
        info!(
            results = results.len(),
            topologies = compiled.len(),
            "query by model complete"
        );
        Ok(results)
    }
}
