mod current;
mod extract;
mod fs_utils;
mod identity;
mod install;
mod layout;
mod releases;
mod rewind;

use std::io::Write;

pub use current::{get_current, set_current};
pub use extract::extract_archive;
pub use identity::{resolve_ownership, IdentityResolver, SystemIdentity};
pub use install::{install_release, install_release_with, InstallOptions, InstallOutcome};
pub use layout::WorkspaceLayout;
pub use releases::{list_release_ids, list_releases, prune_releases, ReleaseEntry};
pub use rewind::{rewind_release, RewindOutcome};

/// Progress lines are best-effort: a closed sink never aborts a release step.
fn write_progress(out: &mut dyn Write, line: &str) {
    let _ = writeln!(out, "{line}");
}
