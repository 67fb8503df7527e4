// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — the pixel operations behind the scan effect, and text
// typesetting for documents without page images of their own.

pub mod processor;
pub mod typeset;

pub use processor::ImageProcessor;
pub use typeset::{A4_PX, PageTypesetter};
