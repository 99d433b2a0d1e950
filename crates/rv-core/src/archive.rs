use std::path::Path;

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    Zip,
    TarGz,
}

impl ArchiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Zip, Self::TarGz]
    }

    /// Suffix match is case-sensitive: `bundle.ZIP` is not a zip bundle.
    pub fn infer_from_path(path: &Path) -> Option<Self> {
        let name = path.to_str()?;
        Self::all()
            .into_iter()
            .find(|archive_type| name.ends_with(archive_type.file_suffix()))
    }

    pub fn require_from_path(path: &Path) -> Result<Self> {
        Self::infer_from_path(path).ok_or_else(|| {
            let supported = Self::all()
                .iter()
                .map(|archive_type| archive_type.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("unsupported archive type (supported types: {supported})")
        })
    }
}
