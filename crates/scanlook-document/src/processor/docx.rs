// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word document handler: convert to one A4 page image, then fit it to the
// requested render scale.

use std::sync::Arc;

use image::DynamicImage;
use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{InputDocument, RenderedPage, mime};
use tracing::{debug, instrument};

use super::DocumentProcessor;
use crate::convert::DocxConverter;
use crate::pdf::raster::fit_to_page;

/// A4 portrait in PDF points.
pub const A4_PT: (f32, f32) = (595.28, 841.89);

/// Treats a Word document as a single A4 page.
pub struct DocxProcessor {
    converter: Arc<dyn DocxConverter>,
}

impl DocxProcessor {
    pub fn new(converter: Arc<dyn DocxConverter>) -> Self {
        Self { converter }
    }
}

impl DocumentProcessor for DocxProcessor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn can_handle(&self, document: &InputDocument) -> bool {
        document.mime_type == mime::DOCX || document.mime_type == mime::DOC
    }

    fn page_count(&self, _document: &InputDocument) -> Result<u32> {
        Ok(1)
    }

    #[instrument(skip(self, document), fields(document = %document.name))]
    fn render_page(&self, document: &InputDocument, page: u32, scale: f32) -> Result<RenderedPage> {
        if page != 1 {
            return Err(ScanlookError::PageRender {
                page,
                reason: "Word documents render as a single page".into(),
            });
        }

        let image = self
            .converter
            .to_page_image(&document.bytes)
            .map_err(|err| ScanlookError::PageRender {
                page: 1,
                reason: format!("conversion failed: {}", err),
            })?;
        debug!(width = image.width(), height = image.height(), "Word document converted");

        fit_to_page(DynamicImage::ImageRgb8(image), 1, A4_PT, scale)
    }
}
