use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rv_core::CURRENT_LINK_NAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Anchors a relative workspace at the current working directory.
    pub fn absolute(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.is_absolute() {
            return Ok(Self::new(root));
        }
        let cwd = env::current_dir()
            .context("failed to determine the current working directory")?;
        Ok(Self::new(cwd.join(root)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn release_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub fn current_link_path(&self) -> PathBuf {
        self.root.join(CURRENT_LINK_NAME)
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))
    }
}
