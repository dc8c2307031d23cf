// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
///
/// The precondition variants abort a run before any image is touched. The
/// document variants describe why a single image (or a whole container) could
/// not be read, decoded or written.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Preconditions --
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedContainer(String),

    #[error("Width must be a positive integer (got {0})")]
    InvalidWidth(i64),

    #[error("No images found in folder: {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("No valid images to convert.")]
    NoValidImages,

    // -- Document errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("EPUB archive error: {0}")]
    EpubError(String),

    #[error("MOBI unpacking failed: {0}")]
    MobiError(String),

    // -- Storage / configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
