// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the AAI model walker (config port and
//! engine settings). Keeps CLI/runtime adapters thin.

pub mod config;
pub mod engine_config;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use engine_config::EngineConfig;
