// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// E-book containers — EPUB archives and MOBI books.

pub mod epub;
pub mod mobi;

pub use self::epub::EpubImageLocator;
pub use self::mobi::{CommandUnpacker, MobiImageLocator, MobiUnpacker, RecordUnpacker};
