// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output assembly — decode effect-applied pages and write them into one PDF.

use futures::future::try_join_all;
use image::RgbImage;
use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::RenderedPage;
use tracing::{debug, instrument, warn};

use crate::pdf::writer::PdfWriter;

/// Resolution used for output pages unless the caller supplies one.
pub const DEFAULT_OUTPUT_DPI: f32 = 96.0;

/// Builds the output PDF for one document from its ordered, effect-applied
/// pages.
#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    default_dpi: f32,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DPI)
    }
}

impl Assembler {
    pub fn new(default_dpi: f32) -> Self {
        Self { default_dpi }
    }

    pub fn default_dpi(&self) -> f32 {
        self.default_dpi
    }

    /// Decode every page (in parallel) to measure it, then write the PDF with
    /// pages in the order given.
    ///
    /// Page sizes come from the decoded pixel dimensions at `dpi`, or at the
    /// assembler's default when `dpi` is `None`.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub async fn assemble(
        &self,
        pages: Vec<RenderedPage>,
        title: &str,
        dpi: Option<f32>,
    ) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(ScanlookError::Assembly("document produced no pages".into()));
        }
        let dpi = dpi.unwrap_or(self.default_dpi);

        let decoded = try_join_all(
            pages
                .into_iter()
                .enumerate()
                .map(|(index, page)| decode_page(index as u32 + 1, page)),
        )
        .await?;

        debug!(pages = decoded.len(), dpi, "Pages decoded for assembly");

        let writer = PdfWriter::new().with_title(title);
        tokio::task::spawn_blocking(move || writer.create_from_pages(decoded, dpi))
            .await
            .map_err(|err| ScanlookError::Assembly(format!("assembly task join error: {}", err)))?
    }
}

async fn decode_page(page_number: u32, page: RenderedPage) -> Result<RgbImage> {
    let (declared_w, declared_h) = (page.width, page.height);

    let bitmap = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&page.data).map(|image| image.to_rgb8())
    })
    .await
    .map_err(|err| ScanlookError::ImageDecode {
        page: page_number,
        reason: format!("decode task join error: {}", err),
    })?
    .map_err(|err| ScanlookError::ImageDecode {
        page: page_number,
        reason: err.to_string(),
    })?;

    if bitmap.dimensions() != (declared_w, declared_h) {
        warn!(
            page = page_number,
            declared_w,
            declared_h,
            actual_w = bitmap.width(),
            actual_h = bitmap.height(),
            "Page dimensions differ from the decoded image; using decoded size"
        );
    }

    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::processor::ImageProcessor;
    use crate::pdf::reader::PdfReader;
    use image::{DynamicImage, Rgb};

    fn jpeg_page(width: u32, height: u32) -> RenderedPage {
        let data = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([200, 190, 180]),
        )))
        .to_jpeg_bytes(80)
        .unwrap();
        RenderedPage::new(data, width, height, 144.0)
    }

    #[tokio::test]
    async fn pages_keep_order_and_size() {
        let pages = vec![jpeg_page(96, 48), jpeg_page(48, 96), jpeg_page(192, 192)];
        let pdf = Assembler::default().assemble(pages, "order", None).await.unwrap();

        let reader = PdfReader::from_bytes(&pdf).unwrap();
        assert_eq!(reader.page_count(), 3);

        // At 96 dpi, 96 px is 72 pt.
        let expected = [(72.0, 36.0), (36.0, 72.0), (144.0, 144.0)];
        for (index, (w, h)) in expected.into_iter().enumerate() {
            let (pw, ph) = reader.page_size_pt(index as u32 + 1).unwrap().unwrap();
            assert!((pw - w).abs() < 1.0 && (ph - h).abs() < 1.0, "page {index}: {pw}x{ph}");
        }
    }

    #[tokio::test]
    async fn explicit_dpi_overrides_default() {
        let pdf = Assembler::default()
            .assemble(vec![jpeg_page(144, 144)], "dpi", Some(144.0))
            .await
            .unwrap();
        let (w, _) = PdfReader::from_bytes(&pdf).unwrap().page_size_pt(1).unwrap().unwrap();
        assert!((w - 72.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn undecodable_page_reports_its_index() {
        let pages = vec![
            jpeg_page(10, 10),
            RenderedPage::new(b"broken".to_vec(), 10, 10, 72.0),
        ];
        let err = Assembler::default().assemble(pages, "bad", None).await.unwrap_err();
        assert!(matches!(err, ScanlookError::ImageDecode { page: 2, .. }));
    }

    #[tokio::test]
    async fn no_pages_is_an_assembly_error() {
        let err = Assembler::default().assemble(Vec::new(), "empty", None).await.unwrap_err();
        assert!(matches!(err, ScanlookError::Assembly(_)));
    }
}
