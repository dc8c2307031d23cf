// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// images-to-pdf — assemble the images of a folder into `<folder>.pdf` next to
// it, one page per image.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Convert all images in a folder to a single PDF file.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Folder containing the images.
    folder: PathBuf,

    /// JSON file overriding the default settings.
    #[arg(long, env = "BILDWERK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    bildwerk_cli::logging::init_logging();
    let cli = Cli::parse();

    bildwerk_cli::execute(cli.config.as_deref(), |config, out| {
        bildwerk_cli::assemble_folder(&cli.folder, config, out)
    })
}
