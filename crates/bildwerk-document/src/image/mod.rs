// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode, colour-mode normalisation, resize and JPEG output.

pub mod asset;

pub use asset::{ColorMode, ImageAsset};
