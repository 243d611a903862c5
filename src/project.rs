//! Project File Access
//!
//! Shader paths stored in pipeline items are project-relative. Components
//! never touch the filesystem directly; they go through [`ProjectFiles`],
//! which resolves paths against the project root and reads/writes text.

use std::path::{Path, PathBuf};

use crate::errors::{Result, StudioError};

/// Path resolution and text I/O relative to an open project.
pub trait ProjectFiles {
    /// Resolves a project-relative path to an absolute one.
    ///
    /// Returns `None` when the path does not point at an existing file.
    fn resolve_path(&self, path: &str) -> Option<PathBuf>;

    fn read_text(&self, path: &str) -> Result<String>;

    fn write_text(&self, path: &str, contents: &str) -> Result<()>;
}

/// [`ProjectFiles`] backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsProject {
    root: PathBuf,
}

impl FsProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn join(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

impl ProjectFiles for FsProject {
    fn resolve_path(&self, path: &str) -> Option<PathBuf> {
        let full = self.join(path);
        full.is_file().then_some(full)
    }

    fn read_text(&self, path: &str) -> Result<String> {
        let full = self
            .resolve_path(path)
            .ok_or_else(|| StudioError::PathNotResolved(path.to_owned()))?;
        Ok(std::fs::read_to_string(full)?)
    }

    fn write_text(&self, path: &str, contents: &str) -> Result<()> {
        let full = self.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, contents)?;
        Ok(())
    }
}
