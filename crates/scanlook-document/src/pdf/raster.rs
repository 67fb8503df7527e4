// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization — turn one page of a PDF into a bitmap.

use image::DynamicImage;
use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::RenderedPage;
use tracing::{debug, instrument};

use super::reader::PdfReader;
use crate::image::processor::ImageProcessor;

/// PDF user space unit: 72 points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Renders a single PDF page to an encoded bitmap.
///
/// `page` is 1-based. `scale` multiplies the page's native size in points,
/// so the rendered resolution is `72 * scale` dpi.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8], page: u32, scale: f32) -> Result<RenderedPage>;
}

/// Rasterizer for image-only PDFs (scans, photos, exported slides).
///
/// Draws the largest embedded image of the page stretched over its media
/// box. Vector content and text are not drawn; a page without any raster
/// image is reported as a render failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedImageRasterizer;

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    #[instrument(skip(self, pdf), fields(pdf_len = pdf.len()))]
    fn rasterize(&self, pdf: &[u8], page: u32, scale: f32) -> Result<RenderedPage> {
        let reader = PdfReader::from_bytes(pdf)?;
        let image = reader
            .largest_image(page)?
            .ok_or_else(|| ScanlookError::PageRender {
                page,
                reason: "page has no embedded raster image".into(),
            })?;

        let size_pt = reader
            .page_size_pt(page)?
            .unwrap_or((image.width() as f32, image.height() as f32));
        fit_to_page(image, page, size_pt, scale)
    }
}

/// Stretch `image` over a page of `size_pt` points rendered at `scale`, and
/// encode it as PNG at `72 * scale` dpi.
pub(crate) fn fit_to_page(
    image: DynamicImage,
    page: u32,
    size_pt: (f32, f32),
    scale: f32,
) -> Result<RenderedPage> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ScanlookError::PageRender {
            page,
            reason: format!("invalid render scale {}", scale),
        });
    }

    let (width, height) = (scaled(size_pt.0, scale), scaled(size_pt.1, scale));
    let data = ImageProcessor::from_dynamic(image)
        .resize_exact(width, height)
        .to_png_bytes()?;

    debug!(page, width, height, "Page rasterized");

    Ok(RenderedPage::new(data, width, height, POINTS_PER_INCH * scale))
}

fn scaled(size: f32, scale: f32) -> u32 {
    (size * scale).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixturePage, image_pdf};

    #[test]
    fn renders_at_media_box_times_scale() {
        let pdf = image_pdf(&[FixturePage::rgb(20, 10, 100.0, 50.0)]);
        let page = EmbeddedImageRasterizer.rasterize(&pdf, 1, 2.0).unwrap();
        assert_eq!((page.width, page.height), (200, 100));
        assert_eq!(page.dpi, 144.0);

        let decoded = image::load_from_memory(&page.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn second_page_uses_its_own_geometry() {
        let pdf = image_pdf(&[
            FixturePage::gray(10, 10, 40.0, 40.0),
            FixturePage::gray(10, 20, 30.0, 60.0),
        ]);
        let page = EmbeddedImageRasterizer.rasterize(&pdf, 2, 1.0).unwrap();
        assert_eq!((page.width, page.height), (30, 60));
    }

    #[test]
    fn page_without_image_fails() {
        let pdf = image_pdf(&[FixturePage::blank(100.0, 100.0)]);
        let err = EmbeddedImageRasterizer.rasterize(&pdf, 1, 1.0).unwrap_err();
        assert!(matches!(err, ScanlookError::PageRender { page: 1, .. }));
    }

    #[test]
    fn non_positive_scale_fails() {
        let pdf = image_pdf(&[FixturePage::gray(4, 4, 10.0, 10.0)]);
        assert!(EmbeddedImageRasterizer.rasterize(&pdf, 1, 0.0).is_err());
    }
}
