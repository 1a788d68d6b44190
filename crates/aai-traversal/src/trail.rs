// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trails: the position of a step inside a compiled topology.
//!
//! A [`Trail`] is the ordered list of [`StepKey`]s from the top of a model to
//! the current step. It keys both the topology and the delete-key map. The
//! pipe/comma rendering produced by `Display` exists for logs and delete
//! descriptions and is never parsed back.

use std::fmt;

use serde::{Serialize, Serializer};

/// Model identity stamped on instances created under a model version.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Persona {
    /// `model-invariant-id` of the model.
    pub model_invariant_id: String,
    /// `model-version-id` of the model-ver.
    pub model_version_id: String,
}

impl Persona {
    /// Builds a persona from its two identifiers.
    pub fn new(model_invariant_id: impl Into<String>, model_version_id: impl Into<String>) -> Self {
        Self {
            model_invariant_id: model_invariant_id.into(),
            model_version_id: model_version_id.into(),
        }
    }
}

/// One step: a node type, optionally pinned to a persona.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepKey {
    /// Node type of the vertices matched at this step.
    pub node_type: String,
    /// Persona the matched vertices must carry, when the type supports it.
    pub persona: Option<Persona>,
}

impl StepKey {
    /// Step without persona.
    pub fn plain(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            persona: None,
        }
    }

    /// Step pinned to `persona`.
    pub fn with_persona(node_type: impl Into<String>, persona: Persona) -> Self {
        Self {
            node_type: node_type.into(),
            persona: Some(persona),
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node_type)?;
        if let Some(p) = &self.persona {
            write!(f, ",{},{}", p.model_invariant_id, p.model_version_id)?;
        }
        Ok(())
    }
}

impl Serialize for StepKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered path of steps from the top of a model.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Trail(Vec<StepKey>);

impl Trail {
    /// Single-step trail for a top step.
    pub fn root(step: StepKey) -> Self {
        Self(vec![step])
    }

    /// This trail extended by `step`.
    #[must_use]
    pub fn child(&self, step: StepKey) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend(self.0.iter().cloned());
        steps.push(step);
        Self(steps)
    }

    /// The deepest step.
    pub fn last(&self) -> Option<&StepKey> {
        self.0.last()
    }

    /// All steps, top first.
    pub fn steps(&self) -> &[StepKey] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the empty trail.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<StepKey> for Trail {
    fn from_iter<I: IntoIterator<Item = StepKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl Serialize for Trail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
