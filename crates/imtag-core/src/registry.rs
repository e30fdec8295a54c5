//! File-backed registry of the labels images are tagged with.
//!
//! Only terms are persisted, one per line in sorted order. Vectors are
//! derived again on every tagging run so the word vector model can change
//! without re-registering anything.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, TaggerError};

/// The set of registered label terms and the file backing it.
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    path: PathBuf,
    labels: BTreeSet<String>,
}

impl LabelRegistry {
    /// Read the registry at `path`. A missing file is an empty registry.
    pub fn open(path: &Path) -> Result<Self> {
        let labels = match std::fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                return Err(TaggerError::Registry {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            labels,
        })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registered terms, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.labels.contains(term)
    }

    /// Add a term. Returns `false` if it was already registered.
    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        self.labels.insert(term.into())
    }

    /// Remove a term. Returns `false` if it was not registered.
    pub fn remove(&mut self, term: &str) -> bool {
        self.labels.remove(term)
    }

    /// Write the registry back to its file, creating parent directories.
    ///
    /// Writes to a temporary sibling first and renames it into place.
    pub fn save(&self) -> Result<()> {
        let err = |e: std::io::Error| TaggerError::Registry {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(err)?;
        }

        let mut content = String::new();
        for label in &self.labels {
            content.push_str(label);
            content.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content).map_err(err)?;
        std::fs::rename(&tmp, &self.path).map_err(err)?;
        Ok(())
    }
}
