// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MOBI image locator — unpack the book into a temporary directory, then pick
// up the image files it produced.

use std::path::{Path, PathBuf};
use std::process::Command;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ContainerKind, IMAGE_EXTENSIONS};
use mobi::Mobi;
use tracing::{debug, info, instrument, warn};

use crate::item::{ImageLocator, ItemFailure, ItemSink, Payload, WorkItem};
use crate::locate::collect_by_file_name;

/// Unpacks a MOBI file into a directory of loose files.
pub trait MobiUnpacker {
    fn unpack(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Writes the book's image records as `imageNNNNN.<ext>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordUnpacker;

impl MobiUnpacker for RecordUnpacker {
    #[instrument(skip_all, fields(source = %source.display()))]
    fn unpack(&self, source: &Path, destination: &Path) -> Result<()> {
        let book = Mobi::from_path(source).map_err(|err| {
            BildwerkError::MobiError(format!("failed to open {}: {}", source.display(), err))
        })?;

        let mut written = 0usize;
        for (index, record) in book.image_records().iter().enumerate() {
            // Image records are interleaved with fonts and resource markers.
            let Ok(format) = image::guess_format(&record.content[..]) else {
                continue;
            };
            let Some(extension) = format
                .extensions_str()
                .iter()
                .find(|ext| IMAGE_EXTENSIONS.contains(*ext))
            else {
                continue;
            };

            let path = destination.join(format!("image{:05}.{}", index + 1, extension));
            std::fs::write(&path, &record.content[..])?;
            written += 1;
        }

        debug!(written, "Image records written");
        Ok(())
    }
}

/// Runs an external unpacker as `<program> <source> <destination>`.
#[derive(Debug, Clone)]
pub struct CommandUnpacker {
    program: String,
}

impl CommandUnpacker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MobiUnpacker for CommandUnpacker {
    #[instrument(skip_all, fields(program = %self.program))]
    fn unpack(&self, source: &Path, destination: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .arg(source)
            .arg(destination)
            .status()
            .map_err(|err| {
                BildwerkError::MobiError(format!("failed to run {}: {}", self.program, err))
            })?;

        if !status.success() {
            return Err(BildwerkError::MobiError(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subtree {
    Kf8,
    Mobi7,
    Whole,
}

impl Subtree {
    fn choose(root: &Path) -> (Self, PathBuf) {
        let kf8 = root.join("mobi8");
        if kf8.is_dir() {
            return (Subtree::Kf8, kf8);
        }
        let mobi7 = root.join("mobi7");
        if mobi7.is_dir() {
            return (Subtree::Mobi7, mobi7);
        }
        (Subtree::Whole, root.to_path_buf())
    }

    fn note(self) -> &'static str {
        match self {
            Subtree::Kf8 => "Using mobi8 (KF8) format...",
            Subtree::Mobi7 => "Using mobi7 format...",
            Subtree::Whole => "No mobi7/mobi8 subdirectory found, searching entire directory...",
        }
    }
}

/// Locator over an unpacked MOBI. The newer KF8 tree wins over the legacy
/// one so images are not reported twice.
#[derive(Debug, Clone)]
pub struct MobiImageLocator<U> {
    unpacker: U,
}

impl<U: MobiUnpacker> MobiImageLocator<U> {
    pub fn new(unpacker: U) -> Self {
        Self { unpacker }
    }

    fn walk_unpacked(&self, root: &Path, sink: &mut dyn ItemSink) {
        let (subtree, search_dir) = Subtree::choose(root);
        sink.announce(subtree.note());

        let collected = collect_by_file_name(&search_dir);
        if collected.skipped > 0 {
            sink.announce(&format!("Skipped {} unreadable entries", collected.skipped));
        }
        let files = collected.images;
        sink.announce(&format!("Found {} images in MOBI...", files.len()));

        for (ordinal, path) in files.into_iter().enumerate() {
            let label = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let outcome = match std::fs::read(&path) {
                Ok(bytes) => Ok(WorkItem {
                    ordinal,
                    label,
                    page: None,
                    payload: Payload::Encoded(bytes),
                }),
                Err(err) => Err(ItemFailure {
                    label,
                    page: None,
                    error: err.into(),
                }),
            };
            sink.accept(outcome);
        }
    }
}

impl<U: MobiUnpacker> ImageLocator for MobiImageLocator<U> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Mobi
    }

    #[instrument(skip_all, fields(path = %source.display()))]
    fn produce_items(&self, source: &Path, sink: &mut dyn ItemSink) -> Result<()> {
        let workspace = tempfile::Builder::new().prefix("bildwerk-mobi-").tempdir()?;
        self.unpacker.unpack(source, workspace.path())?;

        let location = workspace.path().to_path_buf();
        info!(location = %location.display(), "MOBI unpacked");
        sink.announce(&format!("Unpacked MOBI to: {}", location.display()));

        self.walk_unpacked(&location, sink);

        if let Err(err) = workspace.close() {
            warn!(%err, "Temporary directory not fully removed");
        }
        sink.announce(&format!("Cleaned up temporary directory: {}", location.display()));
        Ok(())
    }
}
