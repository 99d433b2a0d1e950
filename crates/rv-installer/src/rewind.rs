use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::fs_utils::remove_path;
use crate::{get_current, list_release_ids, set_current, write_progress, WorkspaceLayout};

#[derive(Debug)]
pub struct RewindOutcome {
    /// Release `current` points at after the rewind.
    pub target: String,
    pub previous: String,
    pub removed: Vec<String>,
    /// Set when `current` was moved but deleting the newer releases failed part way.
    pub cleanup_error: Option<anyhow::Error>,
}

/// Moves `current` back to `target`, or to the release before the newest when no target is
/// given, then deletes every release newer than the target.
///
/// All refusals (no releases, a single release, unknown target, target already current) are
/// reported before anything in the workspace changes.
pub fn rewind_release(
    layout: &WorkspaceLayout,
    target: Option<&str>,
    out: &mut dyn Write,
) -> Result<RewindOutcome> {
    let mut releases = list_release_ids(layout).context("failed to list releases")?;
    releases.reverse();

    let target = match target.filter(|value| !value.is_empty()) {
        Some(target) => target.to_string(),
        None => match releases.len() {
            0 => bail!("no releases found"),
            1 => bail!("only one release in workspace"),
            _ => releases[1].clone(),
        },
    };

    if !releases.contains(&target) || !layout.release_dir(&target).is_dir() {
        bail!("release {target} not found");
    }

    let previous = get_current(layout)?;
    if previous == target {
        bail!("will not rewind: target {target} is already current");
    }

    set_current(layout, &target)?;
    write_progress(out, &format!("current -> {target}"));
    info!(from = %previous, to = %target, "rewound current release");

    let mut removed = Vec::new();
    let mut cleanup_error = None;
    for id in releases.iter().take_while(|id| **id != target) {
        let path = layout.release_dir(id);
        write_progress(out, &format!("deleting release {id}"));
        if let Err(err) = remove_path(&path) {
            warn!(release = %id, error = %err, "failed to delete release during rewind");
            cleanup_error = Some(
                anyhow::Error::new(err)
                    .context(format!("failed to delete release {}", path.display())),
            );
            break;
        }
        removed.push(id.clone());
    }

    Ok(RewindOutcome {
        target,
        previous,
        removed,
        cleanup_error,
    })
}
