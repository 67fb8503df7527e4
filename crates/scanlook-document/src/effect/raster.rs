// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster scan-effect engine built on the image processor.

use imageproc::geometric_transformations::Interpolation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scanlook_core::config::EffectStrategy;
use scanlook_core::error::Result;
use scanlook_core::types::{ColorSpace, EffectConfig, RenderedPage};
use tracing::{debug, instrument};

use super::EffectEngine;
use crate::image::processor::ImageProcessor;

/// Border thickness never drops below this many pixels.
const MIN_BORDER_PX: u32 = 2;

/// Box radius per unit of blur in the fast strategy, roughly matching the
/// visual softness of a Gaussian with the same sigma.
const BOX_RADIUS_PER_SIGMA: f32 = 1.5;

/// The stock effect engine.
///
/// Stages run in a fixed order: rotate, blur, brightness, contrast, paper
/// tint, grayscale, noise, border. The result is JPEG-encoded.
#[derive(Debug, Clone, Copy)]
pub struct RasterEffectEngine {
    strategy: EffectStrategy,
    jpeg_quality: u8,
}

impl Default for RasterEffectEngine {
    fn default() -> Self {
        Self::new(EffectStrategy::default(), 85)
    }
}

impl RasterEffectEngine {
    pub fn new(strategy: EffectStrategy, jpeg_quality: u8) -> Self {
        Self {
            strategy,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn strategy(&self) -> EffectStrategy {
        self.strategy
    }
}

impl EffectEngine for RasterEffectEngine {
    #[instrument(skip(self, page, config), fields(strategy = ?self.strategy, width = page.width, height = page.height))]
    fn apply(&self, page: &RenderedPage, config: &EffectConfig, seed: u64) -> Result<RenderedPage> {
        let mut rng = StdRng::seed_from_u64(seed);

        let jitter = if config.rotate_var > 0.0 {
            rng.gen_range(-config.rotate_var..=config.rotate_var)
        } else {
            0.0
        };
        let angle = config.rotate + jitter;

        let processor = ImageProcessor::from_bytes(&page.data)?;
        let processor = match self.strategy {
            EffectStrategy::Precise => processor
                .rotate(angle, Interpolation::Bilinear)
                .gaussian_blur(config.blur),
            EffectStrategy::Fast => processor
                .rotate(angle, Interpolation::Nearest)
                .box_blur((config.blur * BOX_RADIUS_PER_SIGMA).round() as u32),
        };

        let mut processor = processor
            .adjust_brightness(config.brightness)
            .adjust_contrast(config.contrast)
            .tint_yellow(config.yellowish);

        if config.colorspace == ColorSpace::Grayscale {
            processor = processor.grayscale();
        }

        processor = processor.add_noise(config.noise, &mut rng);

        if config.border {
            let shorter = processor.width().min(processor.height());
            processor = processor.draw_border((shorter / 100).max(MIN_BORDER_PX));
        }

        let (width, height) = (processor.width(), processor.height());
        let data = processor.to_jpeg_bytes(self.jpeg_quality)?;

        debug!(angle, width, height, bytes = data.len(), "Scan effect applied");

        Ok(RenderedPage::new(data, width, height, page.dpi))
    }
}
