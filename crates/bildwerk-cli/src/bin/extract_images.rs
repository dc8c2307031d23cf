// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// extract-images — save the images embedded in a PDF, EPUB or MOBI file as
// 0001.jpg, 0002.jpg, … in a folder named after the file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Extract images from PDF, EPUB, or MOBI files.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to the PDF, EPUB, or MOBI file.
    input_file: PathBuf,

    /// JSON file overriding the default settings.
    #[arg(long, env = "BILDWERK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    bildwerk_cli::logging::init_logging();
    let cli = Cli::parse();

    bildwerk_cli::execute(cli.config.as_deref(), |config, out| {
        bildwerk_cli::extract_container(&cli.input_file, config, out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }
}
