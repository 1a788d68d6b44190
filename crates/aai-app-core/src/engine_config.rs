// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine settings: recursion ceiling, result-set cap and query timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Recursion ceiling guarding against malformed or cyclic model data.
pub const DEFAULT_MAX_LEVELS: usize = 50;
/// Default cap on the number of start nodes a model query may fan out to.
pub const DEFAULT_MAX_RESULT_SETS: usize = 100;
/// Default size of the blocking pool used by timed queries.
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 4;

/// Tunables for the model walker.
///
/// Missing fields deserialize to their defaults, so a partial JSON blob such
/// as `{"query_timeout_secs": 30}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum recursion depth for topology, delete-key and collection walks.
    pub max_levels: usize,
    /// Maximum number of start nodes (and so result trees) per model query.
    pub max_result_sets: usize,
    /// Wall-clock limit per query in seconds; `0` disables the limit.
    pub query_timeout_secs: u64,
    /// Upper bound on worker threads running timed queries.
    pub max_blocking_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_levels: DEFAULT_MAX_LEVELS,
            max_result_sets: DEFAULT_MAX_RESULT_SETS,
            query_timeout_secs: 0,
            max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
        }
    }
}

impl EngineConfig {
    /// Logical key under which the engine settings are stored.
    pub const KEY: &'static str = "engine";

    /// Query timeout as a [`Duration`], or `None` when disabled.
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    /// Rejects settings the walker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_levels == 0 {
            return Err(ConfigError::Invalid("max_levels must be > 0".into()));
        }
        if self.max_result_sets == 0 {
            return Err(ConfigError::Invalid("max_result_sets must be > 0".into()));
        }
        if self.max_blocking_threads == 0 {
            return Err(ConfigError::Invalid("max_blocking_threads must be > 0".into()));
        }
        Ok(())
    }

    /// Loads validated settings from `service`, defaulting when absent.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, ConfigError> {
        let cfg: Self = service.load_or_default(Self::KEY)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
