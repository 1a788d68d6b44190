// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `ConfigStore` for the AAI model walker.
//!
//! Each key is one `<key>.json` file in the platform config directory
//! (`~/.config/aai-walk` on Linux). Writes go to a sibling temp file first
//! and are renamed into place, so a crashed save never leaves half a blob.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use aai_app_core::config::{ConfigError, ConfigStore};
use directories::ProjectDirs;

/// Settings files under one base directory.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store rooted at the user config directory for `aai-walk`.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "aai-walk")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::at(dirs.config_dir().to_path_buf())
    }

    /// Store rooted at `base`, created when missing.
    pub fn at(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory holding the settings files.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let plain = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(ConfigError::Invalid(format!("config key {key:?}")));
        }
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key)?;
        let staged = path.with_extension("json.tmp");
        fs::write(&staged, data)?;
        fs::rename(&staged, &path)?;
        Ok(())
    }
}
