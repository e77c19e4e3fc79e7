// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `pyjob-config`: the persistent key-value store backing `~/.pyjob/pyjob.yml`,
//! and the `kwarg → config-store → default` fallback helper every
//! `Task`/`ClusterTask` constructor uses to resolve an omitted option.

use pyjob_core::PyJobError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The on-disk schema of `~/.pyjob/pyjob.yml`. Every field is optional: an
/// absent field simply means "no override", not "zero" or "false".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFields {
    pub platform: Option<String>,
    pub processes: Option<usize>,
    pub directory: Option<PathBuf>,
    pub queue: Option<String>,
    pub runtime: Option<i64>,
    pub shell: Option<PathBuf>,
    pub name: Option<String>,
    pub max_array_size: Option<usize>,
    pub environment: Option<String>,
    pub cleanup: Option<bool>,
}

/// The loaded configuration store. Wraps [`ConfigFields`] with the
/// process-wide lock bit — once set, mutating operations fail with a
/// *locked* error — and the path it was loaded from/will be saved to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    fields: ConfigFields,
    path: PathBuf,
    locked: bool,
}

impl ConfigStore {
    /// `~/.pyjob/pyjob.yml`; falls back to `./.pyjob/pyjob.yml` if the home
    /// directory cannot be resolved.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pyjob")
            .join("pyjob.yml")
    }

    /// Load the store from [`ConfigStore::default_path`], defaulting every
    /// field to unset if the file does not exist.
    pub fn load() -> Result<Self, PyJobError> {
        Self::load_from(&Self::default_path())
    }

    /// Load the store from an explicit path (used by tests and by the CLI's
    /// `-C`/override flags).
    pub fn load_from(path: &Path) -> Result<Self, PyJobError> {
        let fields = match std::fs::read_to_string(path) {
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|e| {
                PyJobError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFields::default(),
            Err(e) => return Err(PyJobError::Io(e)),
        };
        Ok(Self {
            fields,
            path: path.to_path_buf(),
            locked: false,
        })
    }

    pub fn fields(&self) -> &ConfigFields {
        &self.fields
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Set the process-wide lock bit. Once locked, [`ConfigStore::set`]
    /// fails until [`ConfigStore::unlock`] is called.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Write `key:value` pairs into the store, deleting a key when `value`
    /// is `None`, then persist to disk via an atomic write-then-rename. Fails with
    /// [`PyJobError::ConfigLocked`] if the store is locked.
    pub fn set(&mut self, pairs: &[(String, Option<String>)]) -> Result<(), PyJobError> {
        if self.locked {
            return Err(PyJobError::ConfigLocked);
        }
        for (key, value) in pairs {
            self.apply(key, value.as_deref())?;
        }
        self.persist()
    }

    fn apply(&mut self, key: &str, value: Option<&str>) -> Result<(), PyJobError> {
        macro_rules! field {
            ($name:ident, $parse:expr) => {
                match value {
                    None => self.fields.$name = None,
                    Some(v) => self.fields.$name = Some($parse(v)?),
                }
            };
        }
        fn parse_usize(v: &str) -> Result<usize, PyJobError> {
            v.parse()
                .map_err(|_| PyJobError::InvalidRuntime(format!("{v:?} is not a positive integer")))
        }
        fn parse_i64(v: &str) -> Result<i64, PyJobError> {
            v.parse()
                .map_err(|_| PyJobError::InvalidRuntime(format!("{v:?} is not an integer")))
        }
        fn parse_bool(v: &str) -> Result<bool, PyJobError> {
            v.parse().map_err(|_| {
                PyJobError::InvalidRuntime(format!("{v:?} is not a boolean"))
            })
        }
        match key {
            "platform" => field!(platform, |v: &str| Ok::<_, PyJobError>(v.to_string())),
            "processes" => field!(processes, parse_usize),
            "directory" => field!(directory, |v: &str| Ok::<_, PyJobError>(PathBuf::from(v))),
            "queue" => field!(queue, |v: &str| Ok::<_, PyJobError>(v.to_string())),
            "runtime" => field!(runtime, parse_i64),
            "shell" => field!(shell, |v: &str| Ok::<_, PyJobError>(PathBuf::from(v))),
            "name" => field!(name, |v: &str| Ok::<_, PyJobError>(v.to_string())),
            "max_array_size" => field!(max_array_size, parse_usize),
            "environment" => field!(environment, |v: &str| Ok::<_, PyJobError>(v.to_string())),
            "cleanup" => field!(cleanup, parse_bool),
            other => {
                tracing::warn!(key = other, "ignoring unrecognised configuration key");
                Ok(())
            }
        }
    }

    fn persist(&self) -> Result<(), PyJobError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&self.fields).map_err(|e| {
            PyJobError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let tmp = self.path.with_extension("yml.tmp");
        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "persisted configuration store");
        Ok(())
    }
}

/// The `kwarg → config-store → default` fallback chain: prefer an explicit
/// value, then a configured one, then the caller-supplied default.
pub fn fallback<T>(explicit: Option<T>, configured: Option<T>, default: T) -> T {
    explicit.or(configured).unwrap_or(default)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
