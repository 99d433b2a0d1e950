use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use rv_core::is_release_id;
use serde::Serialize;
use tracing::{debug, info};

use crate::fs_utils::remove_path;
use crate::{get_current, write_progress, WorkspaceLayout};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseEntry {
    pub id: String,
    pub current: bool,
}

/// Names of all release entries in the workspace, oldest first.
pub fn list_release_ids(layout: &WorkspaceLayout) -> Result<Vec<String>> {
    let root = layout.root();
    let mut ids = Vec::new();
    for entry in fs::read_dir(root)
        .with_context(|| format!("failed to read workspace {}", root.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read workspace {}", root.display()))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_release_id(&name) {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

/// Releases newest first, flagging the one `current` points at.
pub fn list_releases(layout: &WorkspaceLayout) -> Result<Vec<ReleaseEntry>> {
    let ids = list_release_ids(layout).context("failed to list releases")?;
    let current = get_current(layout).ok();
    Ok(ids
        .into_iter()
        .rev()
        .map(|id| {
            let is_current = current.as_deref() == Some(id.as_str());
            ReleaseEntry {
                id,
                current: is_current,
            }
        })
        .collect())
}

/// Deletes the oldest releases until at most `keep` remain and returns the ids removed.
///
/// The release `current` points at is never removed. The first failed deletion ends the pass;
/// releases already removed stay removed.
pub fn prune_releases(
    layout: &WorkspaceLayout,
    keep: usize,
    out: &mut dyn Write,
) -> Result<Vec<String>> {
    let ids = list_release_ids(layout)?;
    let excess = ids.len().saturating_sub(keep);
    if excess == 0 {
        debug!(total = ids.len(), keep, "nothing to prune");
        return Ok(Vec::new());
    }

    let current = get_current(layout).ok();
    let mut removed = Vec::with_capacity(excess);
    for id in ids.into_iter().take(excess) {
        if current.as_deref() == Some(id.as_str()) {
            debug!(release = %id, "skipping prune of current release");
            continue;
        }
        let path = layout.release_dir(&id);
        write_progress(out, &format!("deleting release {id}"));
        remove_path(&path)
            .with_context(|| format!("failed to delete release {}", path.display()))?;
        info!(release = %id, "pruned release");
        removed.push(id);
    }
    Ok(removed)
}
