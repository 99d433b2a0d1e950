use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use rv_core::{new_release_id, ArchiveType, OwnerSpec, DEFAULT_KEEP};
use tracing::{debug, info, warn};

use crate::fs_utils::create_release_dir;
use crate::{
    extract_archive, prune_releases, resolve_ownership, set_current, write_progress,
    IdentityResolver, SystemIdentity, WorkspaceLayout,
};

/// Everything one release run needs, assembled by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub workspace: PathBuf,
    pub bundle: PathBuf,
    pub keep: usize,
    pub owner: OwnerSpec,
}

impl InstallOptions {
    pub fn new(workspace: impl Into<PathBuf>, bundle: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            bundle: bundle.into(),
            keep: DEFAULT_KEEP,
            owner: OwnerSpec::default(),
        }
    }
}

#[derive(Debug)]
pub struct InstallOutcome {
    pub release_id: String,
    pub release_dir: PathBuf,
    pub pruned: Vec<String>,
    /// The release is live even when this is set; only the retention pass failed.
    pub prune_error: Option<anyhow::Error>,
}

pub fn install_release(options: &InstallOptions, out: &mut dyn Write) -> Result<InstallOutcome> {
    install_release_with(&SystemIdentity, options, out)
}

/// Extracts the bundle into a fresh release directory, points `current` at it and prunes
/// releases beyond `options.keep`.
///
/// Validation and ownership resolution happen before the workspace is touched. A failed
/// extraction or link update removes the new release directory again.
pub fn install_release_with(
    resolver: &dyn IdentityResolver,
    options: &InstallOptions,
    out: &mut dyn Write,
) -> Result<InstallOutcome> {
    if options.keep == 0 {
        return Err(anyhow!(
            "can not accept keeping no releases in the workspace"
        ));
    }
    ArchiveType::require_from_path(&options.bundle)?;
    let layout = WorkspaceLayout::absolute(options.workspace.clone())?;
    let owner = resolve_ownership(resolver, &options.owner)?;

    write_progress(out, &format!("workspace: {}", layout.root().display()));
    let id = new_release_id();
    let release_dir = layout.release_dir(&id);
    write_progress(out, &format!("release: {id}"));

    layout.ensure_root()?;
    create_release_dir(&release_dir)?;

    write_progress(out, &format!("bundle: {}", options.bundle.display()));
    write_progress(out, &format!("extracting into {}", release_dir.display()));
    if let Err(err) = extract_archive(&options.bundle, &release_dir, owner) {
        discard_release(&release_dir);
        return Err(err.context("failed to decompress archive"));
    }

    if let Err(err) = set_current(&layout, &id) {
        discard_release(&release_dir);
        return Err(err.context("failed to create/update link"));
    }
    write_progress(out, &format!("current -> {id}"));
    info!(release = %id, workspace = %layout.root().display(), "release activated");

    let (pruned, prune_error) = match prune_releases(&layout, options.keep, out) {
        Ok(pruned) => (pruned, None),
        Err(err) => {
            warn!(release = %id, error = %format!("{err:#}"), "release pruning failed");
            let keep = options.keep;
            (
                Vec::new(),
                Some(err.context(format!("failed to clean up releases (keep={keep})"))),
            )
        }
    };

    Ok(InstallOutcome {
        release_id: id,
        release_dir,
        pruned,
        prune_error,
    })
}

fn discard_release(release_dir: &Path) {
    debug!(path = %release_dir.display(), "removing incomplete release");
    if let Err(err) = fs::remove_dir_all(release_dir) {
        warn!(
            path = %release_dir.display(),
            error = %err,
            "failed to remove incomplete release"
        );
    }
}
