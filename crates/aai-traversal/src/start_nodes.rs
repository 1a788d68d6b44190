// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Start-node and model resolution.
//!
//! Callers identify what to walk with any mix of a model-version-id, a
//! model-invariant-id, a model name, and start-node filter hashes. A start
//! vertex's stamped persona must agree with whatever was supplied.

use std::collections::{BTreeMap, BTreeSet};

use aai_graph::{VertexId, MODEL_INVARIANT_ID, MODEL_VERSION_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Engine;
use crate::error::TraversalError;
use crate::vocab::{MODEL, MODEL_VER, PERSONA_INVARIANT_LOCAL, PERSONA_VERSION_LOCAL};

/// Property filter: `node-type.property` → required value.
pub type FilterHash = BTreeMap<String, String>;

/// Splits a filter key `node-type.property` at the first dot.
pub fn parse_filter_key(key: &str) -> Result<(&str, &str), TraversalError> {
    match key.split_once('.') {
        Some((node_type, property)) if !node_type.is_empty() && !property.is_empty() => {
            Ok((node_type, property))
        }
        _ => Err(TraversalError::BadInput(format!(
            "filter key {key:?} is not of the form node-type.property"
        ))),
    }
}

/// Model identifiers supplied by a caller. Blank values count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSelector {
    /// Explicit `model-version-id`.
    pub model_version_id: Option<String>,
    /// Explicit `model-invariant-id`.
    pub model_invariant_id: Option<String>,
    /// `model-name`, possibly shared by several model-vers.
    pub model_name: Option<String>,
}

fn non_blank(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl ModelSelector {
    /// Selector naming one model-ver.
    pub fn by_version(model_version_id: impl Into<String>) -> Self {
        Self {
            model_version_id: Some(model_version_id.into()),
            ..Self::default()
        }
    }

    /// Selector naming every version of one model.
    pub fn by_invariant(model_invariant_id: impl Into<String>) -> Self {
        Self {
            model_invariant_id: Some(model_invariant_id.into()),
            ..Self::default()
        }
    }

    /// Selector naming model-vers by `model-name`.
    pub fn by_name(model_name: impl Into<String>) -> Self {
        Self {
            model_name: Some(model_name.into()),
            ..Self::default()
        }
    }

    /// Explicit model-version-id, if any.
    pub fn version_id(&self) -> Option<&str> {
        non_blank(self.model_version_id.as_ref())
    }

    /// Explicit model-invariant-id, if any.
    pub fn invariant_id(&self) -> Option<&str> {
        non_blank(self.model_invariant_id.as_ref())
    }

    /// Model name, if any.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.model_name.as_ref())
    }

    /// `true` when no identifier is present.
    pub fn is_empty(&self) -> bool {
        self.version_id().is_none() && self.invariant_id().is_none() && self.name().is_none()
    }
}

impl Engine<'_> {
    fn stamped(&self, vertex: VertexId, local: &str, plain: &str) -> Option<&str> {
        let record = self.graph.vertex(vertex)?;
        record.non_empty(local).or_else(|| record.non_empty(plain))
    }

    /// Model-invariant-id stamped on an instance vertex.
    pub fn stamped_invariant_id(&self, vertex: VertexId) -> Option<&str> {
        self.stamped(vertex, PERSONA_INVARIANT_LOCAL, MODEL_INVARIANT_ID)
    }

    /// Model-version-id stamped on an instance vertex.
    pub fn stamped_version_id(&self, vertex: VertexId) -> Option<&str> {
        self.stamped(vertex, PERSONA_VERSION_LOCAL, MODEL_VERSION_ID)
    }

    /// Vertices of `top_node_type` matching every entry of `filter`.
    pub fn match_filter_hash(
        &self,
        filter: &FilterHash,
        top_node_type: &str,
    ) -> Result<Vec<VertexId>, TraversalError> {
        let mut wanted = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            let (node_type, property) = parse_filter_key(key)?;
            if node_type != top_node_type {
                return Err(TraversalError::BadInput(format!(
                    "start-node filter {key} does not name the top node type {top_node_type}"
                )));
            }
            wanted.push((property, value.as_str()));
        }
        let Some(((first_prop, first_value), rest)) = wanted.split_first() else {
            return Err(TraversalError::BadInput("empty start-node filter".into()));
        };
        Ok(self
            .graph
            .find_by_property(top_node_type, first_prop, first_value)
            .into_iter()
            .filter(|&v| {
                rest.iter()
                    .all(|(prop, value)| self.graph.property(v, prop) == Some(*value))
            })
            .collect())
    }

    /// Union of the vertices matched by each filter hash.
    pub fn start_vertices(
        &self,
        filters: &[FilterHash],
        top_node_type: &str,
    ) -> Result<Vec<VertexId>, TraversalError> {
        let mut out = BTreeSet::new();
        for filter in filters {
            out.extend(self.match_filter_hash(filter, top_node_type)?);
        }
        if out.is_empty() {
            return Err(TraversalError::NotFound(format!(
                "no {top_node_type} start node matches the given filters"
            )));
        }
        Ok(out.into_iter().collect())
    }

    /// Model-vers named by `selector`; every supplied identifier must agree.
    pub fn resolve_model_vers(
        &self,
        selector: &ModelSelector,
    ) -> Result<BTreeSet<VertexId>, TraversalError> {
        let mut candidates: Vec<BTreeSet<VertexId>> = Vec::new();
        if let Some(id) = selector.version_id() {
            candidates.push(BTreeSet::from([self.node_using_unique_id(
                MODEL_VER,
                MODEL_VERSION_ID,
                id,
            )?]));
        }
        if let Some(id) = selector.invariant_id() {
            let model = self.node_using_unique_id(MODEL, MODEL_INVARIANT_ID, id)?;
            candidates.push(self.defs().model_vers(model).into_iter().collect());
        }
        if let Some(name) = selector.name() {
            candidates.push(self.defs().model_vers_named(name).into_iter().collect());
        }
        let supplied = candidates.len();
        let Some(mut resolved) = candidates.pop() else {
            return Err(TraversalError::BadInput(
                "no model-version-id, model-invariant-id or model-name supplied".into(),
            ));
        };
        for other in &candidates {
            resolved.retain(|v| other.contains(v));
        }
        if resolved.is_empty() {
            return Err(if supplied > 1 {
                TraversalError::BadInput("conflicting model identifiers".into())
            } else {
                TraversalError::NotFound(format!("no model-ver for {selector:?}"))
            });
        }
        Ok(resolved)
    }

    /// Top widget node type implied by `selector`; checked against
    /// `top_node_type` when the caller supplied one.
    pub fn model_ver_top_widget_type(
        &self,
        selector: &ModelSelector,
        top_node_type: Option<&str>,
    ) -> Result<String, TraversalError> {
        let mut types = BTreeSet::new();
        for ver in self.resolve_model_vers(selector)? {
            types.insert(self.defs().top_widget_type(ver)?);
        }
        let mut iter = types.into_iter();
        let (Some(derived), None) = (iter.next(), iter.next()) else {
            return Err(TraversalError::Ambiguous(format!(
                "model-vers for {selector:?} disagree on the top widget type"
            )));
        };
        match top_node_type {
            Some(given) if given != derived => Err(TraversalError::BadInput(format!(
                "top node type {given} does not match the model's top widget {derived}"
            ))),
            _ => Ok(derived),
        }
    }

    /// Start vertex → model-version-id to walk it with.
    pub fn resolve_start_nodes(
        &self,
        selector: &ModelSelector,
        filters: &[FilterHash],
        top_node_type: &str,
    ) -> Result<BTreeMap<VertexId, String>, TraversalError> {
        let allowed: Option<BTreeSet<String>> = if selector.is_empty() {
            None
        } else {
            let vers = self.resolve_model_vers(selector)?;
            Some(
                vers.into_iter()
                    .filter_map(|v| self.graph.property(v, MODEL_VERSION_ID).map(str::to_owned))
                    .collect(),
            )
        };
        let mut out = BTreeMap::new();

        if filters.is_empty() {
            let Some(allowed) = allowed else {
                return Err(TraversalError::BadInput(
                    "no model identifiers and no start-node filters".into(),
                ));
            };
            for version_id in allowed {
                for prop in [PERSONA_VERSION_LOCAL, MODEL_VERSION_ID] {
                    for v in self.graph.find_by_property(top_node_type, prop, &version_id) {
                        out.insert(v, version_id.clone());
                    }
                }
            }
            if out.is_empty() {
                return Err(TraversalError::NotFound(format!(
                    "no {top_node_type} instances stamped with the requested model"
                )));
            }
            return Ok(out);
        }

        for vertex in self.start_vertices(filters, top_node_type)? {
            let stamped_ver = self.stamped_version_id(vertex);
            let stamped_inv = self.stamped_invariant_id(vertex);
            if let (Some(want), Some(have)) = (selector.version_id(), stamped_ver) {
                if want != have {
                    return Err(TraversalError::PersonaMismatch {
                        vertex,
                        detail: format!("model-version-id {have} stamped, {want} requested"),
                    });
                }
            }
            if let (Some(want), Some(have)) = (selector.invariant_id(), stamped_inv) {
                if want != have {
                    return Err(TraversalError::PersonaMismatch {
                        vertex,
                        detail: format!("model-invariant-id {have} stamped, {want} requested"),
                    });
                }
            }
            if let (Some(allowed), Some(have)) = (&allowed, stamped_ver) {
                if !allowed.contains(have) {
                    return Err(TraversalError::PersonaMismatch {
                        vertex,
                        detail: format!("model-version-id {have} is not one of the requested models"),
                    });
                }
            }
            let Some(version_id) = selector.version_id().or(stamped_ver) else {
                return Err(TraversalError::BadInput(format!(
                    "start node {vertex} has no persona; a model-version-id is required"
                )));
            };
            debug!(%vertex, version_id, "start node resolved");
            out.insert(vertex, version_id.to_owned());
        }
        Ok(out)
    }
}
