// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An executable script on disk, and an ordered, appendable collection of
//! them.

use crate::PyJobError;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// The default shebang used for scripts generated by this crate.
pub const DEFAULT_SHEBANG: &str = "#!/bin/bash";

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// An ordered sequence of text lines with an interpreter prefix (shebang)
/// and a filesystem identity (directory + prefix + stem + suffix).
///
/// `path = directory/prefix+stem+suffix`; `log = path` with its final
/// extension replaced by `.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    shebang: String,
    directory: PathBuf,
    prefix: String,
    stem: String,
    suffix: String,
    body: Vec<String>,
}

impl Script {
    /// Construct a new, empty script with the given filename identity.
    ///
    /// `directory` is absolutized immediately. `suffix` must be non-empty
    /// and contain a dot.
    pub fn new(
        directory: impl AsRef<Path>,
        prefix: impl Into<String>,
        stem: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, PyJobError> {
        let suffix = suffix.into();
        Self::validate_suffix(&suffix)?;
        Ok(Self {
            shebang: DEFAULT_SHEBANG.to_string(),
            directory: absolutize(directory.as_ref()),
            prefix: prefix.into(),
            stem: stem.into(),
            suffix,
            body: Vec::new(),
        })
    }

    fn validate_suffix(suffix: &str) -> Result<(), PyJobError> {
        if suffix.is_empty() || !suffix.contains('.') {
            return Err(PyJobError::InvalidSuffix(suffix.to_string()));
        }
        Ok(())
    }

    /// Override the shebang line (builder-style). Pass `""` for no shebang.
    pub fn with_shebang(mut self, shebang: impl Into<String>) -> Self {
        self.shebang = shebang.into();
        self
    }

    /// Override the suffix (builder-style), revalidating the invariant.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Result<Self, PyJobError> {
        let suffix = suffix.into();
        Self::validate_suffix(&suffix)?;
        self.suffix = suffix;
        Ok(self)
    }

    /// Append a single line to the body.
    pub fn append(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    /// Append several lines to the body, in order.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.body.extend(lines);
    }

    pub fn shebang(&self) -> &str {
        &self.shebang
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The path this script will be (or has been) written to.
    pub fn path(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}{}", self.prefix, self.stem, self.suffix))
    }

    /// The path of this script's sibling log file: `path` with its final
    /// extension replaced by `.log`.
    pub fn log_path(&self) -> PathBuf {
        self.path().with_extension("log")
    }

    /// The full textual content of the script: the shebang line (if
    /// non-empty) followed by the body lines, newline-joined.
    pub fn content(&self) -> String {
        let mut lines: Vec<&str> = Vec::with_capacity(self.body.len() + 1);
        if !self.shebang.is_empty() {
            lines.push(self.shebang.as_str());
        }
        lines.extend(self.body.iter().map(String::as_str));
        lines.join("\n")
    }

    /// Write this script to [`Script::path`] and mark it executable
    /// (owner-rwx, `0o777` on POSIX).
    pub fn write(&self) -> Result<(), PyJobError> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, self.content())?;
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o777);
            fs::set_permissions(&path, perms)?;
        }
        Ok(())
    }

    /// Read a script file from disk, auto-detecting a `#!`-prefixed shebang.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, PyJobError> {
        let path = path.as_ref();
        let directory = absolutize(path.parent().unwrap_or_else(|| Path::new(".")));
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let contents = fs::read_to_string(path)?;
        let mut lines: Vec<String> = contents.lines().map(|l| l.trim_end().to_string()).collect();

        let shebang = if lines.first().is_some_and(|l| l.starts_with("#!")) {
            lines.remove(0)
        } else {
            String::new()
        };

        let suffix = if suffix.is_empty() {
            ".sh".to_string()
        } else {
            suffix
        };

        Ok(Self {
            shebang,
            directory,
            prefix: String::new(),
            stem,
            suffix,
            body: lines,
        })
    }

    /// Concatenate `other`'s body onto this script, provided their shebang
    /// and suffix agree.
    pub fn concat(mut self, other: Script) -> Result<Self, PyJobError> {
        if self.shebang != other.shebang || self.suffix != other.suffix {
            return Err(PyJobError::IncompatibleScripts);
        }
        self.body.extend(other.body);
        Ok(self)
    }
}

/// The shape of an input accepted by [`ScriptCollector::add`].
pub enum ScriptInput {
    Script(Script),
    Path(PathBuf),
    Many(Vec<ScriptInput>),
    None,
}

impl From<Script> for ScriptInput {
    fn from(s: Script) -> Self {
        ScriptInput::Script(s)
    }
}

impl From<PathBuf> for ScriptInput {
    fn from(p: PathBuf) -> Self {
        ScriptInput::Path(p)
    }
}

impl From<&str> for ScriptInput {
    fn from(p: &str) -> Self {
        ScriptInput::Path(PathBuf::from(p))
    }
}

impl From<String> for ScriptInput {
    fn from(p: String) -> Self {
        ScriptInput::Path(PathBuf::from(p))
    }
}

impl<T: Into<ScriptInput>> From<Vec<T>> for ScriptInput {
    fn from(items: Vec<T>) -> Self {
        ScriptInput::Many(items.into_iter().map(Into::into).collect())
    }
}

/// A finite ordered sequence of [`Script`]s. Accepts a `Script`, a path
/// (read from disk immediately), `ScriptInput::None` (a no-op), or any
/// nested sequence of the above.
#[derive(Debug, Clone, Default)]
pub struct ScriptCollector {
    scripts: Vec<Script>,
}

impl ScriptCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collector from an initial input, equivalent to `new()` +
    /// `add()`.
    pub fn from_input(input: impl Into<ScriptInput>) -> Result<Self, PyJobError> {
        let mut collector = Self::new();
        collector.add(input)?;
        Ok(collector)
    }

    /// Accept a `Script`, a path string (read from disk into a `Script`),
    /// `ScriptInput::None` (no-op), or an ordered sequence of the above.
    /// Any other shape is an [`PyJobError::UnrecognisedExecutableInput`]
    /// error; any path that fails to read propagates its I/O error.
    pub fn add(&mut self, input: impl Into<ScriptInput>) -> Result<(), PyJobError> {
        match input.into() {
            ScriptInput::None => Ok(()),
            ScriptInput::Script(s) => {
                self.scripts.push(s);
                Ok(())
            }
            ScriptInput::Path(p) => {
                self.scripts.push(Script::read(p)?);
                Ok(())
            }
            ScriptInput::Many(items) => {
                for item in items {
                    self.add(item)?;
                }
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Script> {
        self.scripts.iter()
    }

    /// The collected scripts' paths, in insertion order.
    pub fn script_paths(&self) -> Vec<PathBuf> {
        self.scripts.iter().map(Script::path).collect()
    }

    /// The collected scripts' sibling log paths, in insertion order.
    pub fn log_paths(&self) -> Vec<PathBuf> {
        self.scripts.iter().map(Script::log_path).collect()
    }

    /// Write every member that is not yet on disk.
    pub fn dump(&self) -> Result<(), PyJobError> {
        for script in &self.scripts {
            if !script.path().exists() {
                script.write()?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ScriptCollector {
    type Item = &'a Script;
    type IntoIter = std::slice::Iter<'a, Script>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
