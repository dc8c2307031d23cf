// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EPUB image locator — an EPUB is a zip archive; every entry with an image
// extension is an image, in lexicographic entry-name order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ContainerKind, is_image_name};
use tracing::{debug, instrument, warn};
use zip::ZipArchive;

use crate::item::{ImageLocator, ItemFailure, ItemSink, Payload, WorkItem};

#[derive(Debug, Default, Clone, Copy)]
pub struct EpubImageLocator;

impl EpubImageLocator {
    pub fn new() -> Self {
        Self
    }
}

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 64 << 20;

/// Read one entry. The size in the archive header is only a capacity hint;
/// it is not trusted beyond [`MAX_PREALLOCATION`].
fn read_entry<R: Read>(mut entry: R, declared_size: u64) -> std::io::Result<Vec<u8>> {
    let capacity = usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0);
    let mut bytes = Vec::with_capacity(capacity);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Image entry names in the archive, sorted.
fn image_entries<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/') && is_image_name(name))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

impl ImageLocator for EpubImageLocator {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Epub
    }

    #[instrument(skip_all, fields(path = %source.display()))]
    fn produce_items(&self, source: &Path, sink: &mut dyn ItemSink) -> Result<()> {
        let file = File::open(source)?;
        let mut archive = ZipArchive::new(file).map_err(|err| {
            BildwerkError::EpubError(format!("failed to open {}: {}", source.display(), err))
        })?;

        let names = image_entries(&archive);
        sink.announce(&format!("Found {} images in EPUB...", names.len()));

        for (ordinal, name) in names.into_iter().enumerate() {
            let read = archive
                .by_name(&name)
                .map_err(|err| BildwerkError::EpubError(err.to_string()))
                .and_then(|entry| {
                    let declared = entry.size();
                    Ok(read_entry(entry, declared)?)
                });

            let outcome = match read {
                Ok(bytes) => {
                    debug!(entry = %name, bytes = bytes.len(), "Entry read");
                    Ok(WorkItem {
                        ordinal,
                        label: name,
                        page: None,
                        payload: Payload::Encoded(bytes),
                    })
                }
                Err(error) => {
                    warn!(entry = %name, %error, "Entry unreadable");
                    Err(ItemFailure {
                        label: name,
                        page: None,
                        error,
                    })
                }
            };
            sink.accept(outcome);
        }

        Ok(())
    }
}
