//! Configuration for RecordKV
//!
//! Centralized configuration with sensible defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::record::Integrity;

/// Main configuration for a record store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the store file. A missing file is an empty store.
    pub path: PathBuf,

    /// Scratch file used while compacting.
    /// `None` derives `{path}.compact`, so stores never share a scratch file.
    pub scratch_path: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Per-record integrity trailer. Defaults to CRC-8 when the `checksum`
    /// feature is enabled.
    pub integrity: Integrity,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync appended records and compaction output before returning
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./records.db"),
            scratch_path: None,
            integrity: Integrity::default(),
            sync_writes: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the scratch path, deriving it from `path` when unset
    pub fn scratch_path(&self) -> PathBuf {
        match &self.scratch_path {
            Some(path) => path.clone(),
            None => derive_scratch_path(&self.path),
        }
    }
}

/// "/data/sensors.db" → "/data/sensors.db.compact"
fn derive_scratch_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".compact");
    PathBuf::from(name)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set an explicit scratch file path
    pub fn scratch_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scratch_path = Some(path.into());
        self
    }

    /// Set the per-record integrity mode
    pub fn integrity(mut self, integrity: Integrity) -> Self {
        self.config.integrity = integrity;
        self
    }

    /// Enable or disable fsync after writes
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
