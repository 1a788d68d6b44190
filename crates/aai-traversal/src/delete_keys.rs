// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Delete-key resolution: which trails of a model may be deleted.
//!
//! Walks the model definition (not live data) in the same shape as the
//! topology compiler and records one [`DeleteFlag`] per trail. Flags from
//! branches that reach the same trail are combined with [`DeleteFlag::merge`],
//! so a single `Keep` anywhere wins.

use std::collections::BTreeMap;

use aai_graph::VertexId;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::definitions::{ConstraintScope, ElementStep};
use crate::engine::Engine;
use crate::error::TraversalError;
use crate::trail::{StepKey, Trail};
use crate::vocab::NEW_DATA_DEL_FLAG;

/// Delete eligibility of the instances matched at one trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DeleteFlag {
    /// Eligible for deletion (`T`).
    #[serde(rename = "T")]
    Delete,
    /// Must be kept (`F`).
    #[serde(rename = "F")]
    Keep,
}

impl DeleteFlag {
    /// Reads a stored `T`/`F` flag; anything but `T` keeps.
    pub fn from_flag(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("T") => Self::Delete,
            _ => Self::Keep,
        }
    }

    /// Combines a previously recorded flag with a new contribution.
    ///
    /// Once a trail is `Keep` it stays `Keep`.
    pub fn merge(old: Option<Self>, new: Self) -> Self {
        match old {
            Some(Self::Keep) => Self::Keep,
            _ => new,
        }
    }

    /// `true` for [`DeleteFlag::Delete`].
    pub fn is_delete(self) -> bool {
        self == Self::Delete
    }
}

/// Resolved flags keyed by trail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeleteKeys(BTreeMap<Trail, DeleteFlag>);

impl DeleteKeys {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a contribution for `trail`, merging with any earlier one.
    pub fn record(&mut self, trail: Trail, flag: DeleteFlag) {
        let old = self.0.get(&trail).copied();
        self.0.insert(trail, DeleteFlag::merge(old, flag));
    }

    /// Flag for `trail`; trails never recorded are `Keep`.
    pub fn flag_for(&self, trail: &Trail) -> DeleteFlag {
        self.0.get(trail).copied().unwrap_or(DeleteFlag::Keep)
    }

    /// Recorded entries in trail order.
    pub fn iter(&self) -> impl Iterator<Item = (&Trail, &DeleteFlag)> {
        self.0.iter()
    }

    /// Number of recorded trails.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Engine<'_> {
    /// Resolves delete flags for every trail of `model_ver`.
    ///
    /// Widget models yield an empty map. The top element's flag is recorded
    /// under the top trail (which carries the model's persona). An element
    /// flagged `F` forces every trail below it to `F`, and a sub-model is
    /// only descended when the element referencing it is flagged `T`. A
    /// linkage point's flag lands on its first-contact trails only; deeper
    /// hops of the reversed chain stay unrecorded and read as `Keep`.
    #[instrument(skip(self), level = "debug")]
    pub fn resolve_delete_keys(&self, model_ver: VertexId) -> Result<DeleteKeys, TraversalError> {
        let mut keys = DeleteKeys::new();
        let Some(top) = self.resolve_top(model_ver)? else {
            return Ok(keys);
        };
        let flag = self.element_flag(top.element);
        keys.record(top.trail.clone(), flag);
        let mut branch = Vec::new();
        self.delete_walk(
            &[top.element],
            &top.trail,
            flag.is_delete(),
            &mut keys,
            &mut branch,
            0,
            &ConstraintScope::default(),
        )?;
        debug!(trails = keys.len(), "delete keys resolved");
        Ok(keys)
    }

    fn element_flag(&self, element: VertexId) -> DeleteFlag {
        DeleteFlag::from_flag(self.graph.property(element, NEW_DATA_DEL_FLAG))
    }

    fn delete_walk(
        &self,
        elements: &[VertexId],
        trail: &Trail,
        gate: bool,
        keys: &mut DeleteKeys,
        branch: &mut Vec<VertexId>,
        depth: usize,
        inherited: &ConstraintScope,
    ) -> Result<(), TraversalError> {
        self.check_depth(depth)?;
        let scope = self.enter_branch(elements, branch, inherited)?;
        for &element in elements {
            for step in self.defs().children(element)? {
                self.delete_step(step, trail, gate, keys, branch, depth, &scope)?;
            }
        }
        branch.truncate(branch.len() - elements.len());
        Ok(())
    }

    fn delete_step(
        &self,
        step: ElementStep,
        trail: &Trail,
        gate: bool,
        keys: &mut DeleteKeys,
        branch: &mut Vec<VertexId>,
        depth: usize,
        scope: &ConstraintScope,
    ) -> Result<(), TraversalError> {
        match step {
            ElementStep::Widget { element, node_type } => {
                let flag = gated(gate, self.element_flag(element));
                let next = trail.child(StepKey::plain(node_type));
                keys.record(next.clone(), flag);
                self.delete_walk(
                    &[element],
                    &next,
                    flag.is_delete(),
                    keys,
                    branch,
                    depth + 1,
                    scope,
                )
            }
            ElementStep::SubModel {
                element,
                top,
                node_type,
                persona,
            } => {
                let flag = gated(gate, self.element_flag(element));
                let next = trail.child(self.step_key(&node_type, Some(persona)));
                keys.record(next.clone(), flag);
                if !flag.is_delete() {
                    debug!(%next, "sub-model not flagged for delete; not descended");
                    return Ok(());
                }
                self.delete_walk(&[element, top], &next, true, keys, branch, depth + 1, scope)
            }
            ElementStep::ConstrainedSet { set, uuid } => {
                let (chosen, narrowed) = scope.resolve(set, &uuid);
                for choice in self.defs().choice_elements(chosen) {
                    let step = self.defs().classify_element(choice)?;
                    self.delete_step(step, trail, gate, keys, branch, depth, &narrowed)?;
                }
                Ok(())
            }
            ElementStep::LinkagePoint { element, points } => {
                let flag = gated(gate, self.element_flag(element));
                for contact in points.first_contacts() {
                    keys.record(trail.child(StepKey::plain(contact)), flag);
                }
                Ok(())
            }
        }
    }
}

fn gated(gate: bool, flag: DeleteFlag) -> DeleteFlag {
    if gate {
        flag
    } else {
        DeleteFlag::Keep
    }
}
