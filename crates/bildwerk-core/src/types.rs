// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bildwerk image tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// File extensions (lower-case, without the dot) treated as images.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

/// Extension written by every single-file and sequential output.
pub const JPEG_EXTENSION: &str = "jpg";

/// Whether `path` ends in one of the [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Same check for names inside an archive (`OEBPS/images/cover.PNG`).
pub fn is_image_name(name: &str) -> bool {
    is_image_path(Path::new(name))
}

/// Whether the file already carries a JPEG extension (`.jpg` / `.jpeg`).
pub fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| ext == "jpg" || ext == "jpeg")
}

/// Container formats that images can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Pdf,
    Epub,
    Mobi,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [ContainerKind::Pdf, ContainerKind::Epub, ContainerKind::Mobi];

    /// Detect the container kind from the file extension (case-insensitive).
    ///
    /// Fails with [`BildwerkError::UnsupportedContainer`] carrying the
    /// offending suffix (empty when the file has no extension).
    pub fn from_path(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();

        Self::ALL
            .into_iter()
            .find(|kind| kind.extension() == suffix)
            .ok_or(BildwerkError::UnsupportedContainer(suffix))
    }

    /// Dotted lower-case extension.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerKind::Pdf => ".pdf",
            ContainerKind::Epub => ".epub",
            ContainerKind::Mobi => ".mobi",
        }
    }

    /// Short label used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            ContainerKind::Pdf => "PDF",
            ContainerKind::Epub => "EPUB",
            ContainerKind::Mobi => "MOBI",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a normalised image ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Replace `source` by a JPEG sharing its base filename.
    ReplaceFile { source: PathBuf, output: PathBuf },
    /// `NNNN.jpg` inside a per-document output folder.
    Sequential { folder: PathBuf, index: u32, digits: usize },
    /// A page appended to a multi-page PDF.
    PdfDocument { path: PathBuf },
}

impl OutputTarget {
    /// Single-file replacement target for `source` (`photo.png` → `photo.jpg`).
    pub fn replace(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let output = source.with_extension(JPEG_EXTENSION);
        OutputTarget::ReplaceFile { source, output }
    }

    /// Destination file on disk.
    pub fn path(&self) -> PathBuf {
        match self {
            OutputTarget::ReplaceFile { output, .. } => output.clone(),
            OutputTarget::Sequential { folder, index, digits } => {
                folder.join(sequence_file_name(*index, *digits))
            }
            OutputTarget::PdfDocument { path } => path.clone(),
        }
    }

    /// Whether writing this target should remove the original afterwards.
    pub fn replaces_source(&self) -> bool {
        matches!(self, OutputTarget::ReplaceFile { source, output } if source != output)
    }
}

/// `0001.jpg`, `0002.jpg`, … zero-padded to `digits`.
pub fn sequence_file_name(index: u32, digits: usize) -> String {
    format!("{index:0digits$}.{JPEG_EXTENSION}")
}

/// Output folder for extraction: a sibling of the container named after its
/// base filename (`books/novel.epub` → `books/novel`).
pub fn extraction_folder(container: &Path) -> PathBuf {
    let stem = container.file_stem().unwrap_or_default();
    match container.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// PDF written by the assembler: `<parent>/<folder-name>.pdf`.
///
/// Paths without a final component (`.`, `..`) are resolved first so the PDF
/// still gets a real name.
pub fn assembled_pdf_path(folder: &Path) -> Result<PathBuf> {
    let resolved;
    let folder = if folder.file_name().is_none() {
        resolved = folder.canonicalize()?;
        resolved.as_path()
    } else {
        folder
    };

    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = folder.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!("{name}.pdf")))
}

/// Per-run counters. Created when a pipeline starts, updated once per item,
/// read by the reporter at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Items the locator produced.
    pub found: usize,
    /// Items written (or deliberately left as-is).
    pub succeeded: usize,
    /// Items skipped because of a per-item error.
    pub failed: usize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_found(&mut self, count: usize) {
        self.found += count;
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_path(Path::new("a/B.PNG")));
        assert!(is_image_path(Path::new("scan.TiFf")));
        assert!(is_image_name("OEBPS/images/cover.Jpeg"));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("archive.tif")));
        assert!(!is_image_path(Path::new(".png")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn jpeg_extension_detection() {
        assert!(has_jpeg_extension(Path::new("x.jpg")));
        assert!(has_jpeg_extension(Path::new("x.JPEG")));
        assert!(!has_jpeg_extension(Path::new("x.png")));
    }

    #[test]
    fn container_kind_from_extension() {
        assert_eq!(ContainerKind::from_path(Path::new("a.PDF")).unwrap(), ContainerKind::Pdf);
        assert_eq!(ContainerKind::from_path(Path::new("b.epub")).unwrap(), ContainerKind::Epub);
        assert_eq!(ContainerKind::from_path(Path::new("c.Mobi")).unwrap(), ContainerKind::Mobi);

        match ContainerKind::from_path(Path::new("d.docx")) {
            Err(BildwerkError::UnsupportedContainer(suffix)) => assert_eq!(suffix, ".docx"),
            other => panic!("unexpected: {other:?}"),
        }
        match ContainerKind::from_path(Path::new("no_extension")) {
            Err(BildwerkError::UnsupportedContainer(suffix)) => assert!(suffix.is_empty()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn sequence_names_are_zero_padded() {
        assert_eq!(sequence_file_name(1, 4), "0001.jpg");
        assert_eq!(sequence_file_name(42, 4), "0042.jpg");
        assert_eq!(sequence_file_name(12345, 4), "12345.jpg");
    }

    #[test]
    fn replace_target_swaps_extension() {
        let target = OutputTarget::replace("dir/photo.png");
        assert_eq!(target.path(), PathBuf::from("dir/photo.jpg"));
        assert!(target.replaces_source());

        let same = OutputTarget::replace("dir/photo.jpg");
        assert!(!same.replaces_source());
    }

    #[test]
    fn sequential_target_path() {
        let target = OutputTarget::Sequential {
            folder: PathBuf::from("out"),
            index: 3,
            digits: 4,
        };
        assert_eq!(target.path(), PathBuf::from("out/0003.jpg"));
        assert!(!target.replaces_source());
    }

    #[test]
    fn extraction_folder_is_sibling_named_after_stem() {
        assert_eq!(extraction_folder(Path::new("books/novel.epub")), PathBuf::from("books/novel"));
        assert_eq!(extraction_folder(Path::new("novel.pdf")), PathBuf::from("novel"));
    }

    #[test]
    fn assembled_pdf_lands_next_to_folder() {
        assert_eq!(
            assembled_pdf_path(Path::new("albums/summer")).unwrap(),
            PathBuf::from("albums/summer.pdf")
        );
        assert_eq!(
            assembled_pdf_path(Path::new("albums/summer/")).unwrap(),
            PathBuf::from("albums/summer.pdf")
        );
    }

    #[test]
    fn assembled_pdf_resolves_parent_reference() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("scans");
        std::fs::create_dir_all(inner.join("raw")).unwrap();
        let dotted = inner.join("raw").join("..");

        let pdf = assembled_pdf_path(&dotted).unwrap();
        assert_eq!(pdf.file_name().unwrap(), "scans.pdf");
    }

    #[test]
    fn counters_track_outcomes() {
        let mut counters = RunCounters::new();
        counters.record_found(3);
        counters.record_success();
        counters.record_success();
        counters.record_failure();
        assert_eq!(counters.found, 3);
        assert_eq!(counters.succeeded, 2);
        assert_eq!(counters.failed, 1);
    }
}
