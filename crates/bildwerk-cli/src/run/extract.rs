// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// extract-images — pull every embedded image out of a PDF, EPUB or MOBI into
// a sibling folder as 0001.jpg, 0002.jpg, …

use std::io::Write;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{BatchConfig, ContainerKind, extraction_folder};
use bildwerk_document::locate::require_file;
use bildwerk_document::{ItemFailure, ItemSink, WorkItem, locator_for};
use tracing::{debug, instrument};

use crate::emit::{SequenceWriter, write_target};
use crate::report::{Reporter, RunSummary};

/// Extract the images of `source` into `<parent>/<stem>/`.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn extract_container<W: Write>(source: &Path, config: &BatchConfig, out: W) -> Result<RunSummary> {
    if !source.exists() {
        return Err(BildwerkError::FileNotFound(source.to_path_buf()));
    }
    let kind = ContainerKind::from_path(source)?;
    require_file(source)?;

    let folder = extraction_folder(source);
    let mut writer = SequenceWriter::create(&folder, config.sequence_digits)?;
    let mut reporter = Reporter::new(out);
    reporter.note(format_args!("Output folder: {}", folder.display()))?;
    debug!(%kind, "Container accepted");

    let locator = locator_for(kind, config);
    let mut sink = ExtractionSink {
        reporter: &mut reporter,
        writer: &mut writer,
        quality: config.jpeg_quality,
        broken_output: None,
    };
    locator.produce_items(source, &mut sink)?;
    if let Some(err) = sink.broken_output.take() {
        return Err(err);
    }

    if writer.issued() == 0 {
        reporter.note("No images found in the file.")?;
    } else {
        reporter.blank()?;
        let extracted = reporter.counters().succeeded;
        reporter.summary(format_args!(
            "Done! Extracted {extracted} images to: {}",
            folder.display()
        ))?;
    }
    Ok(reporter.finish(Some(folder)))
}

/// Turns located items into numbered JPEG files as they arrive.
struct ExtractionSink<'a, W: Write> {
    reporter: &'a mut Reporter<W>,
    writer: &'a mut SequenceWriter,
    quality: u8,
    /// First failure to write the progress trace itself; ends the run.
    broken_output: Option<BildwerkError>,
}

impl<W: Write> ExtractionSink<'_, W> {
    fn emit(&mut self, item: WorkItem) -> Result<()> {
        let target = self.writer.advance();
        let written = item
            .payload
            .into_asset()
            .and_then(|asset| asset.into_jpeg(self.quality))
            .and_then(|jpeg| write_target(&target, &jpeg));

        match written {
            Ok(()) => {
                let name = target
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match item.page {
                    Some(page) => self.reporter.success(format_args!("Extracted: {name} (page {page})")),
                    None => self.reporter.success(format_args!("Extracted: {name} ({})", item.label)),
                }
            }
            Err(err) => self.reporter.failure("extract", &item.label, &err),
        }
    }

    fn keep(&mut self, outcome: Result<()>) {
        if let Err(err) = outcome {
            if self.broken_output.is_none() {
                self.broken_output = Some(err);
            }
        }
    }
}

impl<W: Write> ItemSink for ExtractionSink<'_, W> {
    fn announce(&mut self, note: &str) {
        let outcome = self.reporter.note(note);
        self.keep(outcome);
    }

    fn accept(&mut self, item: std::result::Result<WorkItem, ItemFailure>) {
        if self.broken_output.is_some() {
            return;
        }
        self.reporter.record_found(1);
        let outcome = match item {
            Ok(item) => self.emit(item),
            Err(failure) => self.reporter.failure("extract", &failure.label, &failure.error),
        };
        self.keep(outcome);
    }
}
