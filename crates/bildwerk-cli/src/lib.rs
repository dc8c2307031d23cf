// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-cli — the batch pipelines behind the four command-line tools, plus
// the glue the binaries share (config loading, logging, exit status).

pub mod emit;
pub mod logging;
pub mod report;
pub mod run;

use std::path::Path;
use std::process::ExitCode;

use bildwerk_core::BatchConfig;
use bildwerk_core::error::Result;
use tracing::{error, info};

pub use report::{Reporter, RunSummary, report_fatal};
pub use run::{assemble_folder, convert_folder, extract_container, resize_tree};

/// Load the config, run one pipeline against stdout and map the outcome to
/// an exit status. Fatal errors print `Error: …` and exit with status 1.
pub fn execute<F>(config_path: Option<&Path>, pipeline: F) -> ExitCode
where
    F: FnOnce(&BatchConfig, std::io::StdoutLock<'static>) -> Result<RunSummary>,
{
    let outcome = BatchConfig::load(config_path).and_then(|config| pipeline(&config, std::io::stdout().lock()));

    match outcome {
        Ok(summary) => {
            info!(?summary, "Run finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "Run aborted");
            if let Err(io_err) = report_fatal(std::io::stdout().lock(), &err) {
                error!(%io_err, "Could not print the error");
            }
            ExitCode::FAILURE
        }
    }
}
