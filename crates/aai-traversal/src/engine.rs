// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The walker context shared by every operation.

use aai_app_core::EngineConfig;
use aai_graph::{EdgeRules, GraphAccess, SchemaIntrospector, VertexId, MODEL_INVARIANT_ID, MODEL_VERSION_ID};

use crate::definitions::{ConstraintScope, Definitions};
use crate::error::TraversalError;
use crate::trail::{Persona, StepKey};

/// Borrowed collaborators plus engine settings.
///
/// An `Engine` is cheap to build and holds no state between operations; build
/// one per request. All reads go through the borrowed [`GraphAccess`].
pub struct Engine<'a> {
    pub(crate) graph: &'a dyn GraphAccess,
    pub(crate) schema: &'a dyn SchemaIntrospector,
    pub(crate) rules: &'a dyn EdgeRules,
    pub(crate) config: EngineConfig,
}

impl<'a> Engine<'a> {
    /// Creates an engine with default settings.
    pub fn new(
        graph: &'a dyn GraphAccess,
        schema: &'a dyn SchemaIntrospector,
        rules: &'a dyn EdgeRules,
    ) -> Self {
        Self {
            graph,
            schema,
            rules,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the engine settings.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The graph this engine reads.
    pub fn graph(&self) -> &'a dyn GraphAccess {
        self.graph
    }

    /// Typed view over the definition graph.
    pub fn definitions(&self) -> Definitions<'a> {
        Definitions::new(self.graph)
    }

    pub(crate) fn defs(&self) -> Definitions<'a> {
        self.definitions()
    }

    /// Whether `node_type` declares both persona properties.
    pub fn supports_persona(&self, node_type: &str) -> bool {
        self.schema
            .property_set(node_type)
            .is_some_and(|props| props.contains(MODEL_INVARIANT_ID) && props.contains(MODEL_VERSION_ID))
    }

    /// Step key for `node_type`, keeping `persona` only when the type supports it.
    pub(crate) fn step_key(&self, node_type: &str, persona: Option<Persona>) -> StepKey {
        match persona {
            Some(p) if self.supports_persona(node_type) => StepKey::with_persona(node_type, p),
            _ => StepKey::plain(node_type),
        }
    }

    /// Fails unless an edge rule connects `from` and `to`.
    ///
    /// An undeclared node type is reported as such before the missing rule.
    pub fn check_edge_rule(&self, from: &str, to: &str) -> Result<(), TraversalError> {
        if self.rules.has_rule(from, to) {
            return Ok(());
        }
        for node_type in [from, to] {
            if !self.schema.is_known_type(node_type) {
                return Err(TraversalError::UnknownNodeType(node_type.to_owned()));
            }
        }
        Err(TraversalError::MissingEdgeRule {
            from: from.to_owned(),
            to: to.to_owned(),
        })
    }

    /// The single vertex of `node_type` whose `property` equals `value`.
    pub fn node_using_unique_id(
        &self,
        node_type: &str,
        property: &str,
        value: &str,
    ) -> Result<VertexId, TraversalError> {
        if value.trim().is_empty() {
            return Err(TraversalError::BadInput(format!(
                "blank {property} for {node_type} lookup"
            )));
        }
        let found = self.graph.find_by_property(node_type, property, value);
        match found.as_slice() {
            [one] => Ok(*one),
            [] => Err(TraversalError::NotFound(format!(
                "no {node_type} with {property}={value}"
            ))),
            _ => Err(TraversalError::Ambiguous(format!(
                "{} {node_type} vertices with {property}={value}",
                found.len()
            ))),
        }
    }

    /// `depth` counts from 0 at the top, so `max_levels` levels fit in
    /// depths `0..max_levels`.
    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), TraversalError> {
        if depth >= self.config.max_levels {
            return Err(TraversalError::DepthExceeded {
                max: self.config.max_levels,
            });
        }
        Ok(())
    }

    /// Pushes `elements` onto the current branch and returns the constraint
    /// scope below them. Revisiting an element already on the branch fails.
    pub(crate) fn enter_branch(
        &self,
        elements: &[VertexId],
        branch: &mut Vec<VertexId>,
        inherited: &ConstraintScope,
    ) -> Result<ConstraintScope, TraversalError> {
        let mut scope = inherited.clone();
        for &element in elements {
            if branch.contains(&element) {
                return Err(TraversalError::LoopingModelElement(element));
            }
            branch.push(element);
            scope = scope.overlay(self.defs().constraints(element)?);
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aai_graph::{EdgeRuleSet, GraphStore, StaticSchema};

    fn fixture() -> (GraphStore, StaticSchema, EdgeRuleSet) {
        let mut schema = StaticSchema::new();
        schema
            .declare_with_persona("generic-vnf", ["vnf-id"])
            .declare("vserver", ["vserver-id"]);
        let mut rules = EdgeRuleSet::new();
        rules.allow("generic-vnf", "vserver");
        (GraphStore::new(), schema, rules)
    }

    #[test]
    fn edge_rule_check_reports_unknown_type_first() {
        let (store, schema, rules) = fixture();
        let engine = Engine::new(&store, &schema, &rules);
        assert_eq!(engine.check_edge_rule("vserver", "generic-vnf"), Ok(()));
        assert_eq!(
            engine.check_edge_rule("vserver", "flux-capacitor"),
            Err(TraversalError::UnknownNodeType("flux-capacitor".into()))
        );
        assert!(matches!(
            engine.check_edge_rule("vserver", "generic-vnf-x"),
            Err(TraversalError::UnknownNodeType(_))
        ));
        assert!(matches!(
            engine.check_edge_rule("vserver", "vserver"),
            Err(TraversalError::MissingEdgeRule { .. })
        ));
    }

    #[test]
    fn persona_support_follows_schema() {
        let (store, schema, rules) = fixture();
        let engine = Engine::new(&store, &schema, &rules);
        assert!(engine.supports_persona("generic-vnf"));
        assert!(!engine.supports_persona("vserver"));
        let key = engine.step_key("vserver", Some(Persona::new("i", "v")));
        assert_eq!(key, StepKey::plain("vserver"));
    }

    #[test]
    fn unique_lookup_distinguishes_blank_missing_and_ambiguous() {
        let (mut store, schema, rules) = fixture();
        for _ in 0..2 {
            store.add_vertex(aai_graph::VertexRecord::new("vserver").with("vserver-name", "dup"));
        }
        let only = store.add_vertex(aai_graph::VertexRecord::new("vserver").with("vserver-name", "one"));
        let engine = Engine::new(&store, &schema, &rules);
        assert!(matches!(
            engine.node_using_unique_id("vserver", "vserver-name", " "),
            Err(TraversalError::BadInput(_))
        ));
        assert!(matches!(
            engine.node_using_unique_id("vserver", "vserver-name", "zero"),
            Err(TraversalError::NotFound(_))
        ));
        assert!(matches!(
            engine.node_using_unique_id("vserver", "vserver-name", "dup"),
            Err(TraversalError::Ambiguous(_))
        ));
        assert_eq!(engine.node_using_unique_id("vserver", "vserver-name", "one"), Ok(only));
    }

    #[test]
    fn depth_guard_admits_exactly_max_levels() {
        let (store, schema, rules) = fixture();
        let engine = Engine::new(&store, &schema, &rules).with_config(EngineConfig {
            max_levels: 2,
            ..EngineConfig::default()
        });
        assert!(engine.check_depth(0).is_ok());
        assert!(engine.check_depth(1).is_ok());
        assert_eq!(engine.check_depth(2), Err(TraversalError::DepthExceeded { max: 2 }));
    }
}
