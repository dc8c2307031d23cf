// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// resize-images — resize every image in a folder and its subfolders to one
// width, saving the results as JPG in place of the originals.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Resize all images in a folder (recursively) to a target width.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Folder containing the images to resize.
    folder: PathBuf,

    /// Target width in pixels; the height follows the aspect ratio.
    #[arg(allow_negative_numbers = true)]
    width: i64,

    /// JSON file overriding the default settings.
    #[arg(long, env = "BILDWERK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    bildwerk_cli::logging::init_logging();
    let cli = Cli::parse();

    bildwerk_cli::execute(cli.config.as_deref(), |config, out| {
        bildwerk_cli::resize_tree(&cli.folder, cli.width, config, out)
    })
}
