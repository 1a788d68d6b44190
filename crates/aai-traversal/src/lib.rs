// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! aai-traversal: model-driven traversal over an AAI inventory graph.
//!
//! A model (a tree of typed widgets, possibly nesting other models) is
//! compiled into a [`Topology`] of valid next steps per [`Trail`]. The
//! instance collector then walks live vertices along that topology and
//! produces [`ResultSet`] trees. Deletes resolve a [`DeleteKeys`] map from the
//! same definition and remove only what every branch agrees may go.
//!
//! Everything hangs off [`Engine`], which borrows the graph ports from
//! `aai-graph`. [`TimedQueryService`] adds a wall-clock limit on top.
#![forbid(unsafe_code)]

mod collect;
mod definitions;
mod delete;
mod delete_keys;
mod engine;
mod error;
mod linkage;
mod named_query;
mod postprocess;
mod query;
mod result_set;
mod start_nodes;
mod timed;
mod topology;
mod trail;
pub mod vocab;

/// Instance collection.
pub use collect::CollectPlan;
/// Typed definition-graph view.
pub use definitions::{ConstraintScope, Definitions, ElementStep, ModelKind};
/// Delete by model.
pub use delete::{run_delete_by_model, DeletePlan, DeleteRequest, DeleteStep};
/// Delete-key resolution.
pub use delete_keys::{DeleteFlag, DeleteKeys};
/// Walker context.
pub use engine::Engine;
/// Errors.
pub use error::TraversalError;
/// Linkage points.
pub use linkage::LinkagePoints;
/// Named queries.
pub use named_query::{
    ConstraintKind, NamedQueryElement, NamedQueryPlan, NamedQueryRequest, NqElementMap,
    PropertyConstraint, RelatedLookup,
};
/// Post-processing.
pub use postprocess::{collapse_do_not_output, prune_by_secondary_filter};
/// Query by model.
pub use query::ModelQuery;
/// Result trees.
pub use result_set::{PropertyLimitDesc, ResultSet};
/// Start-node resolution.
pub use start_nodes::{parse_filter_key, FilterHash, ModelSelector};
/// Timed queries.
pub use timed::TimedQueryService;
/// Topology compilation.
pub use topology::{TopStep, Topology};
/// Trails.
pub use trail::{Persona, StepKey, Trail};
