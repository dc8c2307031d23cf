// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler — one page per image, each page exactly the size of its image
// at a fixed resolution, using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use bildwerk_core::error::{BildwerkError, Result};
use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// Resolution used when none is configured.
pub const DEFAULT_DPI: f32 = 100.0;

const MM_PER_INCH: f32 = 25.4;

/// Builds a multi-page PDF from RGB pages.
pub struct PdfAssembler {
    /// Pixels per inch used to size pages.
    dpi: f32,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl PdfAssembler {
    pub fn new(dpi: f32) -> Self {
        Self { dpi, title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Page dimensions for an image of `width` x `height` pixels.
    pub fn page_size(&self, width: u32, height: u32) -> (Mm, Mm) {
        (
            Mm(width as f32 / self.dpi * MM_PER_INCH),
            Mm(height as f32 / self.dpi * MM_PER_INCH),
        )
    }

    /// Assemble `pages` in order into PDF bytes.
    ///
    /// Each image is placed unscaled at the bottom-left corner of a page of
    /// its own size.
    #[instrument(skip(self, pages), fields(pages = pages.len(), dpi = self.dpi))]
    pub fn assemble(&self, pages: Vec<RgbImage>) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(BildwerkError::NoValidImages);
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(BildwerkError::Config(format!(
                "PDF resolution must be positive (got {})",
                self.dpi
            )));
        }

        let title = self.title.as_deref().unwrap_or("Images");
        info!(title, "Assembling PDF");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(pages.len());

        for image in pages {
            let (width, height) = image.dimensions();
            let (page_w, page_h) = self.page_size(width, height);

            let raw = RawImage {
                pixels: RawImageData::U8(image.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    dpi: Some(self.dpi),
                    rotate: None,
                },
            }];

            debug!(width, height, page_w = page_w.0, page_h = page_h.0, "Page added");
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "PDF serialised");

        Ok(output)
    }
}
