use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use rv_core::{ArchiveType, Ownership};
use tar::EntryType;
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::fs_utils::{
    create_dir_tree, create_file_with_mode, entry_destination, set_owner, DEFAULT_DIR_MODE,
    DEFAULT_FILE_MODE,
};

const PERMISSION_BITS: u32 = 0o7777;
const UNIX_FILE_TYPE_MASK: u32 = 0o170000;
const UNIX_SYMLINK: u32 = 0o120000;

/// Unpacks `archive_path` into `dst`, handing every created file and directory to `owner`.
///
/// The format is chosen from the file name. Extraction stops at the first failing entry and
/// leaves whatever was already written in place.
pub fn extract_archive(archive_path: &Path, dst: &Path, owner: Ownership) -> Result<()> {
    let archive_type = ArchiveType::require_from_path(archive_path)?;
    debug!(
        archive = %archive_path.display(),
        target = %dst.display(),
        kind = archive_type.as_str(),
        "extracting bundle"
    );
    match archive_type {
        ArchiveType::Zip => extract_zip(archive_path, dst, owner),
        ArchiveType::TarGz => extract_tar_gz(archive_path, dst, owner),
    }
}

fn open_archive(archive_path: &Path) -> Result<File> {
    File::open(archive_path)
        .with_context(|| format!("failed to open archive {}", archive_path.display()))
}

fn extract_zip(archive_path: &Path, dst: &Path, owner: Ownership) -> Result<()> {
    let mut archive = ZipArchive::new(open_archive(archive_path)?)
        .with_context(|| format!("failed to read zip archive {}", archive_path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry #{index} of {}",
                archive_path.display()
            )
        })?;
        let name = entry.name().to_string();
        let target = entry_destination(dst, Path::new(&name))?;
        let unix_mode = entry.unix_mode();

        if entry.is_dir() {
            let mode = unix_mode.map_or(DEFAULT_DIR_MODE, |mode| mode & PERMISSION_BITS);
            trace!(entry = %name, "creating directory");
            create_dir_tree(dst, &target, mode, owner)?;
            continue;
        }

        if let Some(mode) = unix_mode {
            if mode & UNIX_FILE_TYPE_MASK == UNIX_SYMLINK {
                return Err(anyhow!(
                    "unsupported file type: file={name} type=symlink"
                ));
            }
        }

        let mode = unix_mode.map_or(DEFAULT_FILE_MODE, |mode| mode & PERMISSION_BITS);
        trace!(entry = %name, "writing file");
        write_entry(dst, &target, mode, owner, &mut entry)?;
    }

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dst: &Path, owner: Ownership) -> Result<()> {
    let stream = GzDecoder::new(open_archive(archive_path)?);
    let mut archive = tar::Archive::new(stream);
    let entries = archive
        .entries()
        .with_context(|| format!("failed to read archive {}", archive_path.display()))?;

    for entry in entries {
        let mut entry = entry.context("failed to extract file from archive")?;
        let raw_path = entry
            .path()
            .context("failed to read archive entry path")?
            .into_owned();
        let name = raw_path.display().to_string();
        let entry_type = entry.header().entry_type();

        match entry_type {
            EntryType::Directory => {
                let target = entry_destination(dst, &raw_path)?;
                let mode = entry_mode(&entry, DEFAULT_DIR_MODE);
                trace!(entry = %name, "creating directory");
                create_dir_tree(dst, &target, mode, owner)?;
            }
            EntryType::Regular => {
                let target = entry_destination(dst, &raw_path)?;
                let mode = entry_mode(&entry, DEFAULT_FILE_MODE);
                trace!(entry = %name, "writing file");
                write_entry(dst, &target, mode, owner, &mut entry)?;
            }
            EntryType::XGlobalHeader => {}
            other => {
                return Err(anyhow!(
                    "unsupported file type: file={name} type={}",
                    char::from(other.as_byte())
                ));
            }
        }
    }

    Ok(())
}

fn entry_mode<R: Read>(entry: &tar::Entry<'_, R>, fallback: u32) -> u32 {
    entry
        .header()
        .mode()
        .map_or(fallback, |mode| mode & PERMISSION_BITS)
}

fn write_entry(
    root: &Path,
    target: &Path,
    mode: u32,
    owner: Ownership,
    reader: &mut dyn Read,
) -> Result<()> {
    if let Some(parent) = target.parent() {
        create_dir_tree(root, parent, DEFAULT_DIR_MODE, owner)?;
    }

    let mut file = create_file_with_mode(target, mode)
        .with_context(|| format!("failed to create file {}", target.display()))?;
    set_owner(target, owner)?;
    io::copy(reader, &mut file)
        .with_context(|| format!("failed to write file {}", target.display()))?;
    Ok(())
}
