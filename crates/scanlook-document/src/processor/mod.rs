// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document processors — per-format handlers and the ordered registry that
// dispatches an input document to the first handler that accepts it.

pub mod docx;
pub mod pdf;
pub mod presentation;

use std::sync::Arc;

use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{InputDocument, RenderedPage};
use tracing::debug;

use crate::convert::{DocxConverter, TextFlowConverter};
use crate::pdf::raster::{EmbeddedImageRasterizer, PageRasterizer};

pub use docx::DocxProcessor;
pub use pdf::PdfProcessor;
pub use presentation::PresentationProcessor;

/// Handler for one family of input formats.
///
/// Calls are synchronous and may be expensive; async callers run them on the
/// blocking pool.
pub trait DocumentProcessor: Send + Sync {
    /// Short handler name for logs and reports.
    fn name(&self) -> &'static str;

    /// Whether this handler accepts the document's declared MIME type.
    fn can_handle(&self, document: &InputDocument) -> bool;

    /// Number of pages the pipeline should render.
    fn page_count(&self, document: &InputDocument) -> Result<u32>;

    /// Rasterize page `page` (1-based) at `scale` times its native size.
    fn render_page(&self, document: &InputDocument, page: u32, scale: f32) -> Result<RenderedPage>;
}

/// Ordered handler table. Dispatch is first match wins, so more specific
/// handlers must be registered before generic ones.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn DocumentProcessor>>,
}

impl ProcessorRegistry {
    /// An empty registry; every lookup fails until handlers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table: PDF, Word, PowerPoint, in that order.
    pub fn with_defaults(
        rasterizer: Arc<dyn PageRasterizer>,
        converter: Arc<dyn DocxConverter>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(PdfProcessor::new(rasterizer));
        registry.register(DocxProcessor::new(converter));
        registry.register(PresentationProcessor);
        registry
    }

    /// The stock table with the embedded-image rasterizer and the text-flow
    /// Word converter. PDF pages without an embedded image cannot be drawn by
    /// this rasterizer; plug a full renderer in through `with_defaults`.
    pub fn standard() -> Self {
        Self::with_defaults(
            Arc::new(EmbeddedImageRasterizer),
            Arc::new(TextFlowConverter::new()),
        )
    }

    /// Append a handler after all existing ones.
    pub fn register(&mut self, processor: impl DocumentProcessor + 'static) -> &mut Self {
        self.processors.push(Arc::new(processor));
        self
    }

    /// First registered handler that accepts `document`.
    pub fn processor_for(&self, document: &InputDocument) -> Result<Arc<dyn DocumentProcessor>> {
        let processor = self
            .processors
            .iter()
            .find(|processor| processor.can_handle(document))
            .cloned()
            .ok_or_else(|| ScanlookError::UnsupportedFormat {
                mime_type: document.mime_type.clone(),
                name: document.name.clone(),
            })?;

        debug!(
            document = %document.name,
            processor = processor.name(),
            "Processor selected"
        );
        Ok(processor)
    }

    /// Handler names in dispatch order.
    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|processor| processor.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanlook_core::types::mime;

    struct Named {
        name: &'static str,
        accepts: &'static str,
    }

    impl DocumentProcessor for Named {
        fn name(&self) -> &'static str {
            self.name
        }
        fn can_handle(&self, document: &InputDocument) -> bool {
            self.accepts == "*" || document.mime_type == self.accepts
        }
        fn page_count(&self, _: &InputDocument) -> Result<u32> {
            Ok(1)
        }
        fn render_page(&self, _: &InputDocument, _: u32, _: f32) -> Result<RenderedPage> {
            Ok(RenderedPage::new(Vec::new(), 1, 1, 72.0))
        }
    }

    fn doc(mime_type: &str) -> InputDocument {
        InputDocument::new("file", mime_type, Vec::new(), "file")
    }

    #[test]
    fn first_match_wins() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register(Named {
                name: "specific",
                accepts: mime::PDF,
            })
            .register(Named {
                name: "fallback",
                accepts: "*",
            });

        assert_eq!(registry.processor_for(&doc(mime::PDF)).unwrap().name(), "specific");
        assert_eq!(registry.processor_for(&doc("text/plain")).unwrap().name(), "fallback");
    }

    #[test]
    fn registration_order_decides() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register(Named {
                name: "fallback",
                accepts: "*",
            })
            .register(Named {
                name: "specific",
                accepts: mime::PDF,
            });

        assert_eq!(registry.processor_for(&doc(mime::PDF)).unwrap().name(), "fallback");
    }

    #[test]
    fn standard_table_dispatch() {
        let registry = ProcessorRegistry::standard();
        assert_eq!(registry.names(), vec!["pdf", "docx", "presentation"]);

        let cases = [
            (mime::PDF, "pdf"),
            (mime::DOCX, "docx"),
            (mime::DOC, "docx"),
            (mime::PPTX, "presentation"),
            (mime::PPT, "presentation"),
        ];
        for (mime_type, expected) in cases {
            assert_eq!(registry.processor_for(&doc(mime_type)).unwrap().name(), expected);
        }
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let registry = ProcessorRegistry::standard();
        let err = registry.processor_for(&doc("image/png")).err().unwrap();
        assert!(matches!(
            err,
            ScanlookError::UnsupportedFormat { ref mime_type, .. } if mime_type == "image/png"
        ));
    }

    #[test]
    fn empty_registry_matches_nothing() {
        assert!(ProcessorRegistry::new().processor_for(&doc(mime::PDF)).is_err());
    }
}
