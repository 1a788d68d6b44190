// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Model topology compiler.
//!
//! Turns a model-ver into a [`Topology`]: for every trail reachable from the
//! model's top element, the step keys that may follow it. Widget models
//! compile to an empty topology.

use std::collections::BTreeMap;

use aai_graph::VertexId;
use tracing::{debug, instrument};

use crate::definitions::{ConstraintScope, ElementStep, ModelKind};
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::trail::{Persona, StepKey, Trail};
use crate::vocab::{MODEL_VER, MODEL_VERSION};

/// Trail → next step keys. Duplicate keys under one trail are allowed.
pub type Topology = BTreeMap<Trail, Vec<StepKey>>;

/// The resolved top step of a resource/service model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopStep {
    /// Top model-element.
    pub element: VertexId,
    /// Widget node type of the top element.
    pub node_type: String,
    /// Identity of the model-ver.
    pub persona: Persona,
    /// Single-step trail rooted at the top element.
    pub trail: Trail,
}

impl Engine<'_> {
    /// Validates `model_ver` and resolves its top step.
    ///
    /// Returns `None` for widget models, which must not own model-elements.
    pub fn resolve_top(&self, model_ver: VertexId) -> Result<Option<TopStep>, TraversalError> {
        let defs = self.defs();
        defs.expect_type(model_ver, MODEL_VER)?;
        if defs.ver_kind(model_ver)? == ModelKind::Widget {
            if !defs.top_elements(model_ver).is_empty() {
                return Err(TraversalError::MalformedModel(format!(
                    "widget model-ver {model_ver} has model-element children"
                )));
            }
            return Ok(None);
        }
        if self.graph.vertex(model_ver).and_then(|v| v.non_empty(MODEL_VERSION)).is_none() {
            return Err(TraversalError::MalformedModel(format!(
                "{MODEL_VERSION} missing on vertex {model_ver}"
            )));
        }
        let persona = defs.persona_of(model_ver)?;
        let element = defs.top_element(model_ver)?;
        if defs.classify_element(element).is_ok_and(|s| matches!(s, ElementStep::LinkagePoint { .. })) {
            return Err(TraversalError::MalformedModel(format!(
                "top model-element {element} cannot be a linkage point"
            )));
        }
        let node_type = defs.element_widget_type(element)?;
        let trail = Trail::root(self.step_key(&node_type, Some(persona.clone())));
        Ok(Some(TopStep {
            element,
            node_type,
            persona,
            trail,
        }))
    }

    /// Compiles the topology of `model_ver`.
    #[instrument(skip(self), level = "debug")]
    pub fn compile_topology(&self, model_ver: VertexId) -> Result<Topology, TraversalError> {
        let mut topology = Topology::new();
        let Some(top) = self.resolve_top(model_ver)? else {
            debug!("widget model; empty topology");
            return Ok(topology);
        };
        let mut branch = Vec::new();
        self.topology_walk(
            &[top.element],
            &top.trail,
            &mut topology,
            &mut branch,
            0,
            &ConstraintScope::default(),
        )?;
        debug!(trails = topology.len(), "topology compiled");
        Ok(topology)
    }

    fn topology_walk(
        &self,
        elements: &[VertexId],
        trail: &Trail,
        topology: &mut Topology,
        branch: &mut Vec<VertexId>,
        depth: usize,
        inherited: &ConstraintScope,
    ) -> Result<(), TraversalError> {
        self.check_depth(depth)?;
        let scope = self.enter_branch(elements, branch, inherited)?;
        for &element in elements {
            for step in self.defs().children(element)? {
                self.topology_step(step, trail, topology, branch, depth, &scope)?;
            }
        }
        branch.truncate(branch.len() - elements.len());
        Ok(())
    }

    fn topology_step(
        &self,
        step: ElementStep,
        trail: &Trail,
        topology: &mut Topology,
        branch: &mut Vec<VertexId>,
        depth: usize,
        scope: &ConstraintScope,
    ) -> Result<(), TraversalError> {
        let parent_type = trail.last().map_or("", |s| s.node_type.as_str());
        match step {
            ElementStep::Widget { element, node_type } => {
                self.check_edge_rule(parent_type, &node_type)?;
                let key = StepKey::plain(node_type);
                let next = trail.child(key.clone());
                topology.entry(trail.clone()).or_default().push(key);
                self.topology_walk(&[element], &next, topology, branch, depth + 1, scope)
            }
            ElementStep::SubModel {
                element,
                top,
                node_type,
                persona,
            } => {
                self.check_edge_rule(parent_type, &node_type)?;
                let key = self.step_key(&node_type, Some(persona));
                let next = trail.child(key.clone());
                topology.entry(trail.clone()).or_default().push(key);
                self.topology_walk(&[element, top], &next, topology, branch, depth + 1, scope)
            }
            ElementStep::ConstrainedSet { set, uuid } => {
                let (chosen, narrowed) = scope.resolve(set, &uuid);
                if chosen != set {
                    debug!(%uuid, replacement = %chosen, "constrained-element-set replaced");
                }
                for choice in self.defs().choice_elements(chosen) {
                    let step = self.defs().classify_element(choice)?;
                    self.topology_step(step, trail, topology, branch, depth, &narrowed)?;
                }
                Ok(())
            }
            ElementStep::LinkagePoint { points, .. } => {
                for chain in points.reversed_chains() {
                    let mut from = parent_type.to_owned();
                    let mut at = trail.clone();
                    for hop in chain {
                        self.check_edge_rule(&from, hop)?;
                        let key = StepKey::plain(hop);
                        topology.entry(at.clone()).or_default().push(key.clone());
                        at = at.child(key);
                        hop.clone_into(&mut from);
                    }
                }
                Ok(())
            }
        }
    }
}
