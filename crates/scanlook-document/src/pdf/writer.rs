// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — create new PDF documents from page bitmaps using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanlook_core::error::ScanlookError;
use tracing::{info, instrument, warn};

const MM_PER_INCH: f32 = 25.4;

/// Creates new PDF documents from page bitmaps.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.set_title(title);
        self
    }

    // -- Bitmaps to PDF -------------------------------------------------------

    /// Create a PDF with one page per bitmap, in order.
    ///
    /// Every page is sized to its bitmap at `dpi` (`px / dpi * 25.4` mm) and
    /// the bitmap fills the page edge to edge.
    #[instrument(skip(self, pages), fields(page_count = pages.len(), dpi))]
    pub fn create_from_pages(&self, pages: Vec<RgbImage>, dpi: f32) -> Result<Vec<u8>, ScanlookError> {
        if pages.is_empty() {
            return Err(ScanlookError::Assembly("no pages to assemble".into()));
        }
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(ScanlookError::Assembly(format!("invalid output dpi {}", dpi)));
        }

        let title = self.title.as_deref().unwrap_or("Scanlook Scan");
        let mut doc = PdfDocument::new(title);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for bitmap in pages {
            let (width, height) = bitmap.dimensions();
            let raw = RawImage {
                pixels: RawImageData::U8(bitmap.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let page_w = Mm(width as f32 / dpi * MM_PER_INCH);
            let page_h = Mm(height as f32 / dpi * MM_PER_INCH);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(dpi),
                    rotate: None,
                },
            }];
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pdf_pages);
        info!(pages = doc.pages.len(), dpi, "Image PDF assembled");

        Ok(save(&doc))
    }
}

fn save(doc: &PdfDocument) -> Vec<u8> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "printpdf reported warnings while saving");
    }
    output
}
