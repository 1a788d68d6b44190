// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed view over the model definition graph.
//!
//! Models, model-vers, model-elements and constrained-element-sets live in
//! the same graph as instance data. [`Definitions`] reads them by
//! [`VertexId`] and turns each child connection of a model-element into an
//! [`ElementStep`], so the compilers never inspect raw edges themselves.

use std::collections::BTreeMap;

use aai_graph::{Direction, EdgeClass, GraphAccess, VertexId, MODEL_INVARIANT_ID, MODEL_VERSION_ID};

use crate::error::TraversalError;
use crate::linkage::LinkagePoints;
use crate::trail::Persona;
use crate::vocab::{
    CONSTRAINED_ELEMENT_SET, CONSTRAINED_ELEMENT_SET_UUID, ELEMENT_CHOICE_SET, LINKAGE_POINTS,
    MODEL, MODEL_CONSTRAINT, MODEL_ELEMENT, MODEL_NAME, MODEL_TYPE, MODEL_VER, SET_UUID_TO_REPLACE,
};

/// `model-type` of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// Leaf model mapping 1:1 to a node type.
    Widget,
    /// Composite resource model.
    Resource,
    /// Composite service model.
    Service,
}

impl ModelKind {
    /// Parses a stored `model-type` value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "widget" => Some(Self::Widget),
            "resource" => Some(Self::Resource),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

/// What one child connection of a model-element contributes to a walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementStep {
    /// Element representing a widget model: one step of `node_type`.
    Widget {
        /// The model-element.
        element: VertexId,
        /// Widget node type.
        node_type: String,
    },
    /// Element representing a resource/service model, inlined as that
    /// model's top element.
    SubModel {
        /// The referencing model-element.
        element: VertexId,
        /// Top model-element of the sub-model.
        top: VertexId,
        /// Widget node type of the sub-model's top element.
        node_type: String,
        /// Identity of the sub-model.
        persona: Persona,
    },
    /// Union of alternative elements.
    ConstrainedSet {
        /// The constrained-element-set.
        set: VertexId,
        /// Its `constrained-element-set-uuid`.
        uuid: String,
    },
    /// Terminal element attaching to an existing subgraph.
    LinkagePoint {
        /// The model-element.
        element: VertexId,
        /// Parsed attachment paths.
        points: LinkagePoints,
    },
}

/// Model-constraint replacements in effect: replaced set uuid → replacement set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintScope(BTreeMap<String, VertexId>);

impl ConstraintScope {
    /// This scope with `own` constraints layered on top.
    #[must_use]
    pub fn overlay(&self, own: BTreeMap<String, VertexId>) -> Self {
        let mut merged = self.0.clone();
        merged.extend(own);
        Self(merged)
    }

    /// The set to expand in place of `set` (identified by `uuid`), and the
    /// scope to use below it. A replacement is consumed once applied.
    pub fn resolve(&self, set: VertexId, uuid: &str) -> (VertexId, Self) {
        match self.0.get(uuid) {
            Some(&replacement) => {
                let mut narrowed = self.0.clone();
                narrowed.remove(uuid);
                (replacement, Self(narrowed))
            }
            None => (set, self.clone()),
        }
    }

    /// Number of replacements in scope.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no replacement is in scope.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only accessors over definition vertices.
#[derive(Clone, Copy)]
pub struct Definitions<'a> {
    graph: &'a dyn GraphAccess,
}

impl<'a> Definitions<'a> {
    /// Wraps a graph.
    pub fn new(graph: &'a dyn GraphAccess) -> Self {
        Self { graph }
    }

    fn exactly_one(
        &self,
        from: VertexId,
        class: EdgeClass,
        direction: Direction,
        node_type: &str,
    ) -> Result<VertexId, TraversalError> {
        let found = self.graph.incident(from, Some(class), direction, &[node_type]);
        match found.as_slice() {
            [one] => Ok(*one),
            [] => Err(TraversalError::MalformedModel(format!(
                "no {node_type} connected to vertex {from}"
            ))),
            _ => Err(TraversalError::Ambiguous(format!(
                "{} {node_type} vertices connected to vertex {from}",
                found.len()
            ))),
        }
    }

    fn required(&self, id: VertexId, property: &str) -> Result<String, TraversalError> {
        self.graph
            .vertex(id)
            .and_then(|v| v.non_empty(property))
            .map(str::to_owned)
            .ok_or_else(|| {
                TraversalError::MalformedModel(format!("{property} missing on vertex {id}"))
            })
    }

    /// Fails unless `id` exists and is of `node_type`.
    pub fn expect_type(&self, id: VertexId, node_type: &str) -> Result<(), TraversalError> {
        match self.graph.node_type(id) {
            Some(t) if t == node_type => Ok(()),
            Some(t) => Err(TraversalError::BadInput(format!(
                "vertex {id} is a {t}, expected {node_type}"
            ))),
            None => Err(TraversalError::NotFound(format!("vertex {id}"))),
        }
    }

    /// The model owning `model_ver`.
    pub fn model_of(&self, model_ver: VertexId) -> Result<VertexId, TraversalError> {
        self.exactly_one(model_ver, EdgeClass::Tree, Direction::In, MODEL)
    }

    /// The `model-type` of `model`.
    pub fn model_kind(&self, model: VertexId) -> Result<ModelKind, TraversalError> {
        let raw = self.required(model, MODEL_TYPE)?;
        ModelKind::parse(&raw).ok_or_else(|| {
            TraversalError::MalformedModel(format!("unrecognized model-type {raw:?} on {model}"))
        })
    }

    /// The `model-type` of the model owning `model_ver`.
    pub fn ver_kind(&self, model_ver: VertexId) -> Result<ModelKind, TraversalError> {
        self.model_kind(self.model_of(model_ver)?)
    }

    /// All versions of `model`.
    pub fn model_vers(&self, model: VertexId) -> Vec<VertexId> {
        self.graph
            .incident(model, Some(EdgeClass::Tree), Direction::Out, &[MODEL_VER])
    }

    /// Model-vers whose `model-name` equals `name`.
    pub fn model_vers_named(&self, name: &str) -> Vec<VertexId> {
        self.graph.find_by_property(MODEL_VER, MODEL_NAME, name)
    }

    /// Invariant and version ids identifying `model_ver`.
    pub fn persona_of(&self, model_ver: VertexId) -> Result<Persona, TraversalError> {
        let model = self.model_of(model_ver)?;
        Ok(Persona::new(
            self.required(model, MODEL_INVARIANT_ID)?,
            self.required(model_ver, MODEL_VERSION_ID)?,
        ))
    }

    /// `model-name` of a model-ver; for widgets this is the node type.
    pub fn model_name(&self, model_ver: VertexId) -> Result<String, TraversalError> {
        self.required(model_ver, MODEL_NAME)
    }

    /// Model-elements hanging directly off `model_ver`.
    pub fn top_elements(&self, model_ver: VertexId) -> Vec<VertexId> {
        self.graph
            .incident(model_ver, Some(EdgeClass::Tree), Direction::Out, &[MODEL_ELEMENT])
    }

    /// The single top model-element of a resource/service model-ver.
    pub fn top_element(&self, model_ver: VertexId) -> Result<VertexId, TraversalError> {
        let tops = self.top_elements(model_ver);
        match tops.as_slice() {
            [one] => Ok(*one),
            [] => Err(TraversalError::MalformedModel(format!(
                "model-ver {model_ver} has no top model-element"
            ))),
            _ => Err(TraversalError::Ambiguous(format!(
                "model-ver {model_ver} has {} top model-elements",
                tops.len()
            ))),
        }
    }

    /// The model-ver `element` represents.
    pub fn target_ver(&self, element: VertexId) -> Result<VertexId, TraversalError> {
        self.exactly_one(element, EdgeClass::Cousin, Direction::Out, MODEL_VER)
    }

    /// Node type of the widget `element` represents; fails for non-widgets.
    pub fn element_widget_type(&self, element: VertexId) -> Result<String, TraversalError> {
        let ver = self.target_ver(element)?;
        match self.ver_kind(ver)? {
            ModelKind::Widget => self.model_name(ver),
            _ => Err(TraversalError::MalformedModel(format!(
                "model-element {element} must represent a widget model"
            ))),
        }
    }

    /// Top widget node type of any model-ver.
    pub fn top_widget_type(&self, model_ver: VertexId) -> Result<String, TraversalError> {
        match self.ver_kind(model_ver)? {
            ModelKind::Widget => self.model_name(model_ver),
            ModelKind::Resource | ModelKind::Service => {
                self.element_widget_type(self.top_element(model_ver)?)
            }
        }
    }

    /// Classifies a model-element.
    pub fn classify_element(&self, element: VertexId) -> Result<ElementStep, TraversalError> {
        if let Some(points) = self
            .graph
            .property(element, LINKAGE_POINTS)
            .and_then(LinkagePoints::parse)
        {
            return Ok(ElementStep::LinkagePoint { element, points });
        }
        let ver = self.target_ver(element)?;
        match self.ver_kind(ver)? {
            ModelKind::Widget => Ok(ElementStep::Widget {
                element,
                node_type: self.model_name(ver)?,
            }),
            ModelKind::Resource | ModelKind::Service => {
                let top = self.top_element(ver)?;
                Ok(ElementStep::SubModel {
                    element,
                    top,
                    node_type: self.element_widget_type(top)?,
                    persona: self.persona_of(ver)?,
                })
            }
        }
    }

    /// Child connections of `element` (model-elements and constrained sets).
    pub fn children(&self, element: VertexId) -> Result<Vec<ElementStep>, TraversalError> {
        self.graph
            .incident(
                element,
                Some(EdgeClass::Tree),
                Direction::Out,
                &[MODEL_ELEMENT, CONSTRAINED_ELEMENT_SET],
            )
            .into_iter()
            .map(|child| {
                if self.graph.node_type(child) == Some(CONSTRAINED_ELEMENT_SET) {
                    Ok(ElementStep::ConstrainedSet {
                        set: child,
                        uuid: self.required(child, CONSTRAINED_ELEMENT_SET_UUID)?,
                    })
                } else {
                    self.classify_element(child)
                }
            })
            .collect()
    }

    /// Alternative model-elements of a constrained-element-set.
    pub fn choice_elements(&self, set: VertexId) -> Vec<VertexId> {
        self.graph
            .incident(set, Some(EdgeClass::Tree), Direction::Out, &[ELEMENT_CHOICE_SET])
            .into_iter()
            .flat_map(|choice| {
                self.graph
                    .incident(choice, Some(EdgeClass::Tree), Direction::Out, &[MODEL_ELEMENT])
            })
            .collect()
    }

    /// Replacements declared by `element`'s model-constraints.
    pub fn constraints(
        &self,
        element: VertexId,
    ) -> Result<BTreeMap<String, VertexId>, TraversalError> {
        let mut out = BTreeMap::new();
        for constraint in
            self.graph
                .incident(element, Some(EdgeClass::Tree), Direction::Out, &[MODEL_CONSTRAINT])
        {
            let uuid = self.required(constraint, SET_UUID_TO_REPLACE)?;
            let replacement = self.exactly_one(
                constraint,
                EdgeClass::Tree,
                Direction::Out,
                CONSTRAINED_ELEMENT_SET,
            )?;
            out.insert(uuid, replacement);
        }
        Ok(out)
    }
}
