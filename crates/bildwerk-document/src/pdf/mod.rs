// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — pulling images out of PDFs and assembling images into one.

pub mod reader;
pub mod writer;

pub use reader::PdfImageLocator;
pub use writer::PdfAssembler;
