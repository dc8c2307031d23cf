// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// convert-to-jpg — convert every image in a folder to JPG, replacing the
// originals.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Convert all images in a folder to JPG format.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Folder containing the images to convert.
    folder: PathBuf,

    /// JSON file overriding the default settings.
    #[arg(long, env = "BILDWERK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    bildwerk_cli::logging::init_logging();
    let cli = Cli::parse();

    bildwerk_cli::execute(cli.config.as_deref(), |config, out| {
        bildwerk_cli::convert_folder(&cli.folder, config, out)
    })
}
