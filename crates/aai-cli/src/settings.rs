// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine settings resolution: explicit file, else the platform store, else defaults.

use std::fs;
use std::path::Path;

use aai_app_core::{ConfigService, ConfigStore, EngineConfig};
use aai_config_fs::FsConfigStore;
use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::SettingsArgs;

/// Effective settings for this run, falling back to the platform store.
pub fn resolve(args: &SettingsArgs) -> Result<EngineConfig> {
    if let Some(path) = &args.config {
        return apply_overrides(args, read_file(path)?);
    }
    match FsConfigStore::new() {
        Ok(store) => resolve_with(args, store),
        Err(err) => {
            warn!(%err, "platform config store unavailable; using defaults");
            apply_overrides(args, EngineConfig::default())
        }
    }
}

/// Effective settings with `store` as the fallback when no `--config` file
/// is given.
pub fn resolve_with<S: ConfigStore>(args: &SettingsArgs, store: S) -> Result<EngineConfig> {
    let cfg = match &args.config {
        Some(path) => read_file(path)?,
        None => EngineConfig::load(&ConfigService::new(store))
            .context("load stored engine settings")?,
    };
    apply_overrides(args, cfg)
}

fn read_file(path: &Path) -> Result<EngineConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}

fn apply_overrides(args: &SettingsArgs, mut cfg: EngineConfig) -> Result<EngineConfig> {
    if let Some(secs) = args.timeout_secs {
        cfg.query_timeout_secs = secs;
    }
    if let Some(levels) = args.max_levels {
        cfg.max_levels = levels;
    }
    cfg.validate()?;
    debug!(?cfg, "engine settings resolved");
    Ok(cfg)
}

/// Writes `cfg` to the platform store.
pub fn save(cfg: &EngineConfig) -> Result<()> {
    save_to(cfg, FsConfigStore::new()?)
}

/// Writes `cfg` to `store`.
pub fn save_to<S: ConfigStore>(cfg: &EngineConfig, store: S) -> Result<()> {
    cfg.validate()?;
    ConfigService::new(store)
        .save(EngineConfig::KEY, cfg)
        .context("save engine settings")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use aai_dry_tests::InMemoryConfigStore;

    use super::*;

    fn no_args() -> SettingsArgs {
        SettingsArgs {
            config: None,
            timeout_secs: None,
            max_levels: None,
        }
    }

    #[test]
    fn overrides_apply_on_top_of_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, br#"{"max_result_sets": 7}"#).unwrap();
        let args = SettingsArgs {
            config: Some(path),
            timeout_secs: Some(9),
            max_levels: None,
        };
        let cfg = resolve(&args).unwrap();
        assert_eq!(cfg.max_result_sets, 7);
        assert_eq!(cfg.query_timeout_secs, 9);
        assert_eq!(cfg.max_levels, EngineConfig::default().max_levels);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, b"{}").unwrap();
        let args = SettingsArgs {
            config: Some(path),
            timeout_secs: None,
            max_levels: Some(0),
        };
        assert!(resolve(&args).is_err());
    }

    #[test]
    fn stored_settings_are_used_without_a_file() {
        let stored = EngineConfig {
            max_result_sets: 3,
            ..EngineConfig::default()
        };
        let store = InMemoryConfigStore::with_engine_config(&stored);
        let args = SettingsArgs {
            max_levels: Some(8),
            ..no_args()
        };
        let cfg = resolve_with(&args, store.clone()).unwrap();
        assert_eq!(cfg.max_result_sets, 3);
        assert_eq!(cfg.max_levels, 8);
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn explicit_file_bypasses_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, br#"{"max_levels": 5}"#).unwrap();
        let store = InMemoryConfigStore::new();
        let args = SettingsArgs {
            config: Some(path),
            ..no_args()
        };
        assert_eq!(resolve_with(&args, store.clone()).unwrap().max_levels, 5);
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn store_failures_are_reported() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_load(true);
        let err = resolve_with(&no_args(), store.clone()).unwrap_err();
        assert!(format!("{err:#}").contains("simulated load failure"));

        let broken = InMemoryConfigStore::with_raw(EngineConfig::KEY, br#"{"max_levels": 0}"#);
        let err = resolve_with(&no_args(), broken).unwrap_err();
        assert!(format!("{err:#}").contains("max_levels must be > 0"));

        store.set_fail_on_save(true);
        assert!(save_to(&EngineConfig::default(), store.clone()).is_err());
        assert_eq!(store.save_count(), 1);
        assert!(!store.contains_key(EngineConfig::KEY));
    }

    #[test]
    fn saved_settings_land_under_the_engine_key() {
        let store = InMemoryConfigStore::new();
        let cfg = EngineConfig {
            query_timeout_secs: 4,
            ..EngineConfig::default()
        };
        save_to(&cfg, store.clone()).unwrap();
        assert_eq!(resolve_with(&no_args(), store).unwrap(), cfg);
    }
}
