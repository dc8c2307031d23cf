// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reporter — the human-readable progress trace on stdout, plus the per-run
// counters behind it.

use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::human_errors::humanize_error;
use bildwerk_core::RunCounters;
use tracing::warn;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub counters: RunCounters,
    /// Output folder or PDF, for the pipelines that produce one.
    pub output: Option<PathBuf>,
}

/// Writes progress lines and keeps the run's counters.
pub struct Reporter<W: Write> {
    out: W,
    counters: RunCounters,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            counters: RunCounters::new(),
        }
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// A plain line, unindented.
    pub fn note(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    /// `Found N images in <place>...`
    pub fn found(&mut self, count: usize, place: &str) -> Result<()> {
        self.counters.record_found(count);
        self.note(format_args!("Found {count} images in {place}..."))
    }

    /// Count items discovered one at a time (container extraction).
    pub fn record_found(&mut self, count: usize) {
        self.counters.record_found(count);
    }

    /// An item that succeeded, with its confirmation line.
    pub fn success(&mut self, detail: impl Display) -> Result<()> {
        self.counters.record_success();
        writeln!(self.out, "  {detail}")?;
        Ok(())
    }

    /// An item that needed no work and is counted as done without a line.
    pub fn unchanged(&mut self) {
        self.counters.record_success();
    }

    /// `  Warning: Failed to <action> <label>: <cause>`
    pub fn failure(&mut self, action: &str, label: &str, error: &BildwerkError) -> Result<()> {
        self.counters.record_failure();
        warn!(action, label, %error, "Item skipped");
        writeln!(self.out, "  Warning: Failed to {action} {label}: {error}")?;
        Ok(())
    }

    /// Closing line, with the failure count appended when there were any.
    pub fn summary(&mut self, line: impl Display) -> Result<()> {
        match self.counters.failed {
            0 => writeln!(self.out, "{line}")?,
            failed => writeln!(self.out, "{line} ({failed} failed)")?,
        }
        Ok(())
    }

    pub fn finish(self, output: Option<PathBuf>) -> RunSummary {
        RunSummary {
            counters: self.counters,
            output,
        }
    }
}

/// Print a fatal error as `Error: <message>` followed by its hint, if any.
pub fn report_fatal<W: Write>(mut out: W, error: &BildwerkError) -> std::io::Result<()> {
    let human = humanize_error(error);
    writeln!(out, "Error: {}", human.message)?;
    if let Some(suggestion) = human.suggestion {
        writeln!(out, "{suggestion}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn text(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn lines_and_counters() {
        let mut buffer = Vec::new();
        let mut reporter = Reporter::new(&mut buffer);
        reporter.found(3, "folder").unwrap();
        reporter.success("Converted: a.png -> a.jpg").unwrap();
        reporter.unchanged();
        reporter
            .failure("convert", "c.gif", &BildwerkError::ImageError("truncated".into()))
            .unwrap();
        reporter.blank().unwrap();
        let done = reporter.counters().succeeded;
        reporter.summary(format_args!("Done! Converted {done} images.")).unwrap();
        let summary = reporter.finish(None);

        assert_eq!(
            summary.counters,
            RunCounters {
                found: 3,
                succeeded: 2,
                failed: 1
            }
        );
        assert_eq!(
            text(buffer),
            "Found 3 images in folder...\n\
             \x20 Converted: a.png -> a.jpg\n\
             \x20 Warning: Failed to convert c.gif: image processing failed: truncated\n\
             \n\
             Done! Converted 2 images. (1 failed)\n"
        );
    }

    #[test]
    fn summary_without_failures_has_no_suffix() {
        let mut buffer = Vec::new();
        let mut reporter = Reporter::new(&mut buffer);
        reporter.summary("Done! Processed 0 images.").unwrap();
        assert_eq!(text(buffer), "Done! Processed 0 images.\n");
    }

    #[test]
    fn fatal_error_with_hint() {
        let mut buffer = Vec::new();
        report_fatal(&mut buffer, &BildwerkError::UnsupportedContainer(".txt".into())).unwrap();
        let output = text(buffer);
        assert!(output.starts_with("Error: Unsupported file format: .txt\n"));
        assert!(output.contains(".pdf, .epub, .mobi"));

        let mut buffer = Vec::new();
        report_fatal(&mut buffer, &BildwerkError::FolderNotFound(Path::new("nope").into())).unwrap();
        assert!(text(buffer).starts_with("Error: Folder not found: nope\n"));
    }
}
