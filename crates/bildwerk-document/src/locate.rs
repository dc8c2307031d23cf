// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory locator — find image files in a folder, flat or recursive, in a
// deterministic order.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::is_image_path;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Fail unless `path` exists and is a directory.
pub fn require_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BildwerkError::FolderNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BildwerkError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Fail unless `path` exists and is a regular file.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BildwerkError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(BildwerkError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Image files directly inside `folder`, sorted by file name.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    require_directory(folder)?;

    let mut images = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(count = images.len(), "Folder scanned");
    Ok(images)
}

/// Image files anywhere below `folder`, sorted by full path string so that
/// files of the same subfolder stay together.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn scan_tree(folder: &Path) -> Result<Vec<PathBuf>> {
    require_directory(folder)?;

    let mut images: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|err| match err.into_io_error() {
            Some(io) => BildwerkError::Io(io),
            None => BildwerkError::Io(std::io::Error::other("filesystem loop detected")),
        })?;
        if entry.file_type().is_file() && is_image_path(entry.path()) {
            images.push(entry.into_path());
        }
    }
    images.sort_by_cached_key(|path| path.to_string_lossy().into_owned());

    debug!(count = images.len(), "Tree scanned");
    Ok(images)
}

/// Result of [`collect_by_file_name`].
#[derive(Debug, Default)]
pub struct Collected {
    pub images: Vec<PathBuf>,
    /// Entries the walk could not read; their subtrees are missing from `images`.
    pub skipped: usize,
}

/// Files with a recognised image extension anywhere below `root`, sorted by
/// file name only. Used on unpacked containers, where directory names carry
/// no ordering meaning.
pub fn collect_by_file_name(root: &Path) -> Collected {
    let mut collected = Collected::default();
    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image_path(entry.path()) {
                    collected.images.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!(%err, "Skipping unreadable entry");
                collected.skipped += 1;
            }
        }
    }
    collected.images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    collected
}
