// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node types and property names of the definition graph.

/// Model node type.
pub const MODEL: &str = "model";
/// Model-version node type.
pub const MODEL_VER: &str = "model-ver";
/// Model-element node type.
pub const MODEL_ELEMENT: &str = "model-element";
/// Constrained-element-set node type.
pub const CONSTRAINED_ELEMENT_SET: &str = "constrained-element-set";
/// Element-choice-set node type.
pub const ELEMENT_CHOICE_SET: &str = "element-choice-set";
/// Model-constraint node type.
pub const MODEL_CONSTRAINT: &str = "model-constraint";
/// Named-query node type.
pub const NAMED_QUERY: &str = "named-query";
/// Named-query-element node type.
pub const NAMED_QUERY_ELEMENT: &str = "named-query-element";
/// Property-constraint node type.
pub const PROPERTY_CONSTRAINT: &str = "property-constraint";
/// Related-lookup node type.
pub const RELATED_LOOKUP: &str = "related-lookup";

/// `model.model-type`.
pub const MODEL_TYPE: &str = "model-type";
/// `model-ver.model-version`.
pub const MODEL_VERSION: &str = "model-version";
/// `model-ver.model-name`; for widgets this is the target node type.
pub const MODEL_NAME: &str = "model-name";
/// `model-element.new-data-del-flag`.
pub const NEW_DATA_DEL_FLAG: &str = "new-data-del-flag";
/// `model-element.linkage-points`.
pub const LINKAGE_POINTS: &str = "linkage-points";
/// `constrained-element-set.constrained-element-set-uuid`.
pub const CONSTRAINED_ELEMENT_SET_UUID: &str = "constrained-element-set-uuid";
/// `model-constraint.constrained-element-set-uuid-to-replace`.
pub const SET_UUID_TO_REPLACE: &str = "constrained-element-set-uuid-to-replace";
/// `named-query.named-query-uuid`.
pub const NAMED_QUERY_UUID: &str = "named-query-uuid";
/// `named-query-element.do-not-output`.
pub const DO_NOT_OUTPUT: &str = "do-not-output";
/// `named-query-element.property-collect-list` and `related-lookup.property-collect-list`.
pub const PROPERTY_COLLECT_LIST: &str = "property-collect-list";
/// `named-query-element.property-limit-desc`.
pub const PROPERTY_LIMIT_DESC: &str = "property-limit-desc";
/// `property-constraint.constraint-type`.
pub const CONSTRAINT_TYPE: &str = "constraint-type";
/// `property-constraint.property-name`.
pub const PROPERTY_NAME: &str = "property-name";
/// `property-constraint.property-value`.
pub const PROPERTY_VALUE: &str = "property-value";
/// `related-lookup.source-node-type`.
pub const SOURCE_NODE_TYPE: &str = "source-node-type";
/// `related-lookup.source-node-property`.
pub const SOURCE_NODE_PROPERTY: &str = "source-node-property";
/// `related-lookup.target-node-type`.
pub const TARGET_NODE_TYPE: &str = "target-node-type";
/// `related-lookup.target-node-property`.
pub const TARGET_NODE_PROPERTY: &str = "target-node-property";

/// Instance property holding the stamped model-invariant-id.
pub const PERSONA_INVARIANT_LOCAL: &str = "model-invariant-id-local";
/// Instance property holding the stamped model-version-id.
pub const PERSONA_VERSION_LOCAL: &str = "model-version-id-local";
