// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanlook-document — Per-format document handling for the Scanlook batch engine.
//
// Provides the document processor registry (PDF, Word, PowerPoint), PDF reading
// and page rasterization, Word typesetting onto a page image, the scan effect
// engine and its per-document cache, and assembly of effect-applied pages into
// an output PDF.

pub mod assemble;
pub mod convert;
pub mod effect;
pub mod image;
pub mod pdf;
pub mod processor;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export the primary types so callers can use `scanlook_document::EffectCache` etc.
pub use assemble::{Assembler, DEFAULT_OUTPUT_DPI};
pub use convert::{DocxConverter, TextFlowConverter};
pub use effect::cache::{CacheKey, EffectCache};
pub use effect::raster::RasterEffectEngine;
pub use effect::EffectEngine;
pub use crate::image::processor::ImageProcessor;
pub use pdf::raster::{EmbeddedImageRasterizer, PageRasterizer};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use processor::{
    DocumentProcessor, DocxProcessor, PdfProcessor, PresentationProcessor, ProcessorRegistry,
};
