// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Emitter — put encoded JPEGs and assembled PDFs where they belong.

use std::fs;
use std::path::PathBuf;

use bildwerk_core::OutputTarget;
use bildwerk_core::error::Result;
use tracing::debug;

/// Write `bytes` to the target and, for replacements whose output path
/// differs from the source, remove the source afterwards.
pub fn write_target(target: &OutputTarget, bytes: &[u8]) -> Result<()> {
    let path = target.path();
    fs::write(&path, bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Output written");

    if target.replaces_source() {
        if let OutputTarget::ReplaceFile { source, .. } = target {
            fs::remove_file(source)?;
            debug!(source = %source.display(), "Source removed");
        }
    }
    Ok(())
}

/// Hands out `0001.jpg`, `0002.jpg`, … inside one output folder.
///
/// The counter moves before the caller writes, so a failed write leaves a
/// gap in the numbering.
#[derive(Debug)]
pub struct SequenceWriter {
    folder: PathBuf,
    digits: usize,
    issued: u32,
}

impl SequenceWriter {
    /// Create `folder` if needed (an existing folder is reused).
    pub fn create(folder: impl Into<PathBuf>, digits: usize) -> Result<Self> {
        let folder = folder.into();
        fs::create_dir_all(&folder)?;
        Ok(Self {
            folder,
            digits,
            issued: 0,
        })
    }

    /// Reserve the next sequence number.
    pub fn advance(&mut self) -> OutputTarget {
        self.issued += 1;
        OutputTarget::Sequential {
            folder: self.folder.clone(),
            index: self.issued,
            digits: self.digits,
        }
    }

    /// Sequence numbers handed out so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}
