// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Work items and the locator interface shared by every container adapter.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{BatchConfig, ContainerKind};
use image::DynamicImage;

use crate::container::epub::EpubImageLocator;
use crate::image::ImageAsset;
use crate::container::mobi::{CommandUnpacker, MobiImageLocator, RecordUnpacker};
use crate::pdf::reader::PdfImageLocator;

/// Image data carried by a [`WorkItem`].
pub enum Payload {
    /// Encoded bytes (JPEG, PNG, …) exactly as stored in the container.
    Encoded(Vec<u8>),
    /// Pixels rebuilt from a raw PDF image stream.
    Pixels(DynamicImage),
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Encoded(bytes) => write!(f, "Encoded({} bytes)", bytes.len()),
            Payload::Pixels(image) => write!(f, "Pixels({}x{})", image.width(), image.height()),
        }
    }
}

impl Payload {
    /// Decode the payload into an asset ready for normalisation.
    pub fn into_asset(self) -> Result<ImageAsset> {
        match self {
            Payload::Encoded(bytes) => ImageAsset::from_bytes(bytes),
            Payload::Pixels(image) => Ok(ImageAsset::from_pixels(image)),
        }
    }
}

/// One source image located inside a container.
#[derive(Debug)]
pub struct WorkItem {
    /// Position in locator order, starting at 0.
    pub ordinal: usize,
    /// Name shown in progress lines (archive entry, file name, …).
    pub label: String,
    /// 1-based page number for PDF images.
    pub page: Option<u32>,
    pub payload: Payload,
}

/// An image the locator found but could not read out of its container.
#[derive(Debug)]
pub struct ItemFailure {
    pub label: String,
    pub page: Option<u32>,
    pub error: BildwerkError,
}

/// Receives the locator's output in order.
pub trait ItemSink {
    /// A progress note such as `Found 12 images in EPUB...`.
    fn announce(&mut self, note: &str);

    /// The next located image, or the reason it could not be read.
    fn accept(&mut self, item: std::result::Result<WorkItem, ItemFailure>);
}

/// Produces the embedded images of one container format.
///
/// An `Err` means the container as a whole could not be opened; failures of
/// individual images are handed to the sink and never abort the walk.
pub trait ImageLocator {
    fn kind(&self) -> ContainerKind;

    fn produce_items(&self, source: &Path, sink: &mut dyn ItemSink) -> Result<()>;
}

/// Pick the adapter for `kind`.
pub fn locator_for(kind: ContainerKind, config: &BatchConfig) -> Box<dyn ImageLocator> {
    match kind {
        ContainerKind::Pdf => Box::new(PdfImageLocator::new()),
        ContainerKind::Epub => Box::new(EpubImageLocator::new()),
        ContainerKind::Mobi => match &config.mobi_unpacker {
            Some(program) => Box::new(MobiImageLocator::new(CommandUnpacker::new(program.clone()))),
            None => Box::new(MobiImageLocator::new(RecordUnpacker)),
        },
    }
}

/// Sink that keeps everything in memory. Handy for callers that want the
/// whole list before processing, and for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub notes: Vec<String>,
    pub items: Vec<WorkItem>,
    pub failures: Vec<ItemFailure>,
}

impl ItemSink for CollectingSink {
    fn announce(&mut self, note: &str) {
        self.notes.push(note.to_string());
    }

    fn accept(&mut self, item: std::result::Result<WorkItem, ItemFailure>) {
        match item {
            Ok(item) => self.items.push(item),
            Err(failure) => self.failures.push(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_matches_container_kind() {
        let config = BatchConfig::default();
        for kind in ContainerKind::ALL {
            assert_eq!(locator_for(kind, &config).kind(), kind);
        }

        let with_command = BatchConfig {
            mobi_unpacker: Some("kindleunpack".into()),
            ..BatchConfig::default()
        };
        assert_eq!(locator_for(ContainerKind::Mobi, &with_command).kind(), ContainerKind::Mobi);
    }

    #[test]
    fn collecting_sink_splits_outcomes() {
        let mut sink = CollectingSink::default();
        sink.announce("Found 2 images");
        sink.accept(Ok(WorkItem {
            ordinal: 0,
            label: "a.png".into(),
            page: None,
            payload: Payload::Encoded(vec![1, 2, 3]),
        }));
        sink.accept(Err(ItemFailure {
            label: "b.png".into(),
            page: None,
            error: BildwerkError::EpubError("crc mismatch".into()),
        }));

        assert_eq!(sink.notes, vec!["Found 2 images".to_string()]);
        assert_eq!(sink.items.len(), 1);
        assert_eq!(sink.failures.len(), 1);
        assert_eq!(format!("{:?}", sink.items[0].payload), "Encoded(3 bytes)");
    }

    #[test]
    fn payload_decodes_to_asset() {
        let pixels = Payload::Pixels(DynamicImage::new_rgb8(3, 2));
        let asset = pixels.into_asset().unwrap();
        assert_eq!((asset.width(), asset.height()), (3, 2));

        let garbage = Payload::Encoded(b"not an image".to_vec());
        assert!(matches!(garbage.into_asset(), Err(BildwerkError::ImageError(_))));
    }
}
