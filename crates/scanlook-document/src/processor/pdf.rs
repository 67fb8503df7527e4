// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native PDF handler.

use std::sync::Arc;

use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{InputDocument, RenderedPage, mime};
use tracing::instrument;

use super::DocumentProcessor;
use crate::pdf::raster::PageRasterizer;
use crate::pdf::reader::PdfReader;

/// Rasterizes each page of a PDF directly.
pub struct PdfProcessor {
    rasterizer: Arc<dyn PageRasterizer>,
}

impl PdfProcessor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { rasterizer }
    }
}

impl DocumentProcessor for PdfProcessor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn can_handle(&self, document: &InputDocument) -> bool {
        document.mime_type == mime::PDF
    }

    #[instrument(skip_all, fields(document = %document.name))]
    fn page_count(&self, document: &InputDocument) -> Result<u32> {
        let reader = PdfReader::from_bytes(&document.bytes)?;
        u32::try_from(reader.page_count()).map_err(|_| {
            ScanlookError::InvalidDocument(format!("{} has too many pages", document.name))
        })
    }

    fn render_page(&self, document: &InputDocument, page: u32, scale: f32) -> Result<RenderedPage> {
        self.rasterizer.rasterize(&document.bytes, page, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixturePage, image_pdf};
    use crate::pdf::raster::EmbeddedImageRasterizer;

    fn processor() -> PdfProcessor {
        PdfProcessor::new(Arc::new(EmbeddedImageRasterizer))
    }

    #[test]
    fn counts_and_renders_pages() {
        let pdf = image_pdf(&[
            FixturePage::rgb(10, 10, 50.0, 50.0),
            FixturePage::rgb(10, 10, 60.0, 30.0),
        ]);
        let doc = InputDocument::new("two.pdf", mime::PDF, pdf, "in/two.pdf");
        let processor = processor();

        assert!(processor.can_handle(&doc));
        assert_eq!(processor.page_count(&doc).unwrap(), 2);

        let page = processor.render_page(&doc, 2, 2.0).unwrap();
        assert_eq!((page.width, page.height), (120, 60));
    }

    #[test]
    fn broken_pdf_cannot_be_counted() {
        let doc = InputDocument::new("bad.pdf", mime::PDF, b"not a pdf at all".to_vec(), "bad.pdf");
        let err = processor().page_count(&doc).unwrap_err();
        assert!(matches!(err, ScanlookError::InvalidDocument(_)));
    }

    #[test]
    fn rejects_other_types() {
        let doc = InputDocument::new("a.docx", mime::DOCX, Vec::new(), "a.docx");
        assert!(!processor().can_handle(&doc));
    }
}
