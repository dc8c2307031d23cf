// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The four batch pipelines. Each one takes its input path, the loaded config
// and a writer for the progress trace.

pub mod assemble;
pub mod convert;
pub mod extract;
pub mod resize;

use std::path::Path;

pub use assemble::assemble_folder;
pub use convert::convert_folder;
pub use extract::extract_container;
pub use resize::resize_tree;

/// Final path component as shown in progress lines.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
