use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::fs_utils::remove_file_if_exists;
use crate::WorkspaceLayout;

/// Points `<workspace>/current` at the release `id`.
///
/// The link target is the bare id so the workspace stays relocatable. The old link is removed
/// before the new one is created; a crash between the two leaves no `current` link until the
/// next successful release.
pub fn set_current(layout: &WorkspaceLayout, id: &str) -> Result<()> {
    let link = layout.current_link_path();
    remove_file_if_exists(&link)
        .with_context(|| format!("failed to update current link {}", link.display()))?;
    create_symlink(Path::new(id), &link)
        .with_context(|| format!("failed to create current link {} -> {id}", link.display()))?;
    debug!(link = %link.display(), release = id, "current link updated");
    Ok(())
}

/// Reads the release id `current` points at. The release itself is not checked for existence.
pub fn get_current(layout: &WorkspaceLayout) -> Result<String> {
    let link = layout.current_link_path();
    let target = std::fs::read_link(&link)
        .with_context(|| format!("failed to read current link {}", link.display()))?;
    target
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("current link target is not valid UTF-8: {}", target.display()))
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
