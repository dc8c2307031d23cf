// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for errors that abort a run.
//
// The message is the error's own display text; the suggestion tells the user
// what to change before running the tool again.

use crate::error::BildwerkError;
use crate::types::{ContainerKind, IMAGE_EXTENSIONS};

/// A fatal error rendered for the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// One line, shown after `Error: `.
    pub message: String,
    /// Optional follow-up line.
    pub suggestion: Option<String>,
}

/// Convert a `BildwerkError` into the lines printed before exiting.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    let suggestion = match err {
        BildwerkError::FolderNotFound(_) | BildwerkError::FileNotFound(_) => {
            Some("Check the path for typos; relative paths start from the current directory.".to_string())
        }

        BildwerkError::NotADirectory(_) => {
            Some("This tool works on a folder of images, not a single file.".to_string())
        }

        BildwerkError::NotAFile(_) => {
            Some("Pass a single PDF, EPUB or MOBI file, not a folder.".to_string())
        }

        BildwerkError::UnsupportedContainer(_) => {
            let formats: Vec<&str> = ContainerKind::ALL.iter().map(|kind| kind.extension()).collect();
            Some(format!("Supported formats: {}", formats.join(", ")))
        }

        BildwerkError::NoImagesFound(_) => Some(format!(
            "Recognised image extensions: {}",
            IMAGE_EXTENSIONS.join(", ")
        )),

        BildwerkError::NoValidImages => {
            Some("Every image in the folder failed to load; see the warnings above.".to_string())
        }

        BildwerkError::Config(_) | BildwerkError::Serialization(_) => {
            Some("Fix the configuration file or run without --config to use the defaults.".to_string())
        }

        BildwerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
            Some("Check the file permissions of the input and its parent folder.".to_string())
        }

        BildwerkError::MobiError(_) => Some(
            "Set \"mobi_unpacker\" in the config file to use an external unpacker.".to_string(),
        ),

        BildwerkError::InvalidWidth(_)
        | BildwerkError::ImageError(_)
        | BildwerkError::PdfError(_)
        | BildwerkError::EpubError(_)
        | BildwerkError::Io(_) => None,
    };

    HumanError {
        message: err.to_string(),
        suggestion,
    }
}
