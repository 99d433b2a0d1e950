use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rv_core::Ownership;

pub(crate) const DEFAULT_DIR_MODE: u32 = 0o755;
pub(crate) const DEFAULT_FILE_MODE: u32 = 0o644;

/// Removes a release entry: directories recursively, anything else unlinked.
pub(crate) fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

pub(crate) fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Joins an archive entry name onto `root`, refusing names that are absolute or climb out.
pub(crate) fn entry_destination(root: &Path, raw: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!("unsafe archive entry path: {}", raw.display()));
            }
        }
    }
    Ok(root.join(relative))
}

/// Creates `dir` and every missing ancestor below `root`, handing each new directory to
/// `owner`. Intermediate directories get the default mode; `dir` itself gets `mode`.
pub(crate) fn create_dir_tree(root: &Path, dir: &Path, mode: u32, owner: Ownership) -> Result<()> {
    let mut missing = Vec::new();
    let mut cursor = dir;
    while cursor != root && !cursor.exists() {
        missing.push(cursor.to_path_buf());
        match cursor.parent() {
            Some(parent) => cursor = parent,
            None => break,
        }
    }

    for path in missing.iter().rev() {
        let dir_mode = if path == dir { mode } else { DEFAULT_DIR_MODE };
        create_dir_with_mode(path, dir_mode)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
        set_owner(path, owner)?;
    }

    if missing.is_empty() && dir != root && !dir.is_dir() {
        return Err(anyhow!(
            "failed to create directory {}: path exists and is not a directory",
            dir.display()
        ));
    }
    Ok(())
}

pub(crate) fn create_file_with_mode(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

pub(crate) fn set_owner(path: &Path, owner: Ownership) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::chown(path, Some(owner.uid), Some(owner.gid)).with_context(|| {
            format!(
                "failed to set ownership {}:{} on {}",
                owner.uid,
                owner.gid,
                path.display()
            )
        })?;
    }
    #[cfg(not(unix))]
    let _ = (path, owner);
    Ok(())
}

pub(crate) fn create_release_dir(path: &Path) -> Result<()> {
    create_dir_with_mode(path, DEFAULT_DIR_MODE)
        .with_context(|| format!("failed to create release: {}", path.display()))
}
