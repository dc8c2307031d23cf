// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// images-to-pdf — one page per image, written next to the folder.

use std::io::Write;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{BatchConfig, OutputTarget, assembled_pdf_path};
use bildwerk_document::locate::scan_folder;
use bildwerk_document::{ImageAsset, PdfAssembler};
use tracing::{info, instrument};

use super::display_name;
use crate::emit::write_target;
use crate::report::{Reporter, RunSummary};

/// Assemble the images directly inside `folder` into `<parent>/<folder>.pdf`.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn assemble_folder<W: Write>(folder: &Path, config: &BatchConfig, out: W) -> Result<RunSummary> {
    let images = scan_folder(folder)?;
    if images.is_empty() {
        return Err(BildwerkError::NoImagesFound(folder.to_path_buf()));
    }

    let mut reporter = Reporter::new(out);
    reporter.found(images.len(), "folder")?;
    let target = OutputTarget::PdfDocument {
        path: assembled_pdf_path(folder)?,
    };
    let output = target.path();

    let mut pages = Vec::with_capacity(images.len());
    for path in &images {
        let name = display_name(path);
        match ImageAsset::open(path) {
            Ok(asset) => {
                pages.push(asset.into_rgb());
                reporter.success(format_args!("Loaded: {name}"))?;
            }
            Err(err) => reporter.failure("load", &name, &err)?,
        }
    }

    if pages.is_empty() {
        return Err(BildwerkError::NoValidImages);
    }

    let mut assembler = PdfAssembler::new(config.pdf_dpi);
    let title = config
        .pdf_title
        .clone()
        .unwrap_or_else(|| display_name(&output).trim_end_matches(".pdf").to_string());
    assembler.set_title(title);

    let page_count = pages.len();
    let pdf = assembler.assemble(pages)?;
    write_target(&target, &pdf)?;
    info!(path = %output.display(), pages = page_count, "PDF written");

    reporter.blank()?;
    reporter.summary(format_args!("Done! Created PDF: {}", output.display()))?;
    reporter.note(format_args!("Total pages: {page_count}"))?;
    Ok(reporter.finish(Some(output)))
}
