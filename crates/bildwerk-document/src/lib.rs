// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image handling for the Bildwerk batch tools.
//
// Provides image discovery in folders, image extraction from PDF, EPUB and
// MOBI containers, colour-mode normalisation and JPEG encoding, and
// assembly of images into a multi-page PDF.

pub mod container;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod image;
pub mod item;
pub mod locate;
pub mod pdf;

// Re-export the primary types so callers can use `bildwerk_document::ImageAsset` etc.
pub use crate::container::{CommandUnpacker, EpubImageLocator, MobiImageLocator, MobiUnpacker, RecordUnpacker};
pub use crate::image::{ColorMode, ImageAsset};
pub use crate::item::{CollectingSink, ImageLocator, ItemFailure, ItemSink, Payload, WorkItem, locator_for};
pub use crate::pdf::{PdfAssembler, PdfImageLocator};
