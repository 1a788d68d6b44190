// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for the AAI model walker.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`models`] - Builders for model, model-ver, model-element and named-query definitions
//! - [`inventory`] - A small inventory schema, edge rules and instance helpers

pub mod config;
pub mod inventory;
pub mod models;

pub use config::InMemoryConfigStore;
pub use inventory::{inventory_edge_rules, inventory_schema, Inventory};
pub use models::{DefinitionBuilder, ModelHandle, WidgetModel};
