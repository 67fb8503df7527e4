// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — the pixel-level steps of the scan look: rotation, blur,
// brightness/contrast, paper tint, grayscale, sensor noise, and scanner-bed
// border. Operates on in-memory images using the `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::{box_filter, gaussian_blur_f32};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::rect::Rect;
use rand::Rng;
use scanlook_core::error::ScanlookError;
use tracing::{debug, instrument};

/// Colour of an empty scanner bed, used for canvas corners exposed by rotation.
const PAPER_WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Aged-paper yellow that `tint_yellow` blends towards.
const PAPER_YELLOW: [f32; 3] = [255.0, 236.0, 179.0];

/// Scanner lid shadow colour for the optional border.
const BORDER_COLOUR: Rgb<u8> = Rgb([38, 38, 38]);

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&png)?
///     .rotate(1.5, Interpolation::Bilinear)
///     .gaussian_blur(0.4)
///     .grayscale()
///     .to_jpeg_bytes(85)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanlookError> {
        let img = image::load_from_memory(data).map_err(|err| {
            ScanlookError::EffectComputation(format!("failed to decode page image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if width == self.image.width() && height == self.image.height() {
            return self;
        }
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Triangle);
        Self { image: resized }
    }

    /// Rotate the image by an arbitrary angle in degrees (clockwise) about its
    /// centre. The canvas keeps its size; exposed corners are filled white.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate(self, degrees: f32, interpolation: Interpolation) -> Self {
        if degrees.abs() < 0.01 {
            return self;
        }

        let rgb = self.image.to_rgb8();
        let rotated = rotate_about_center(&rgb, degrees.to_radians(), interpolation, PAPER_WHITE);

        debug!("Rotation applied");
        Self {
            image: DynamicImage::ImageRgb8(rotated),
        }
    }

    /// Gaussian blur with standard deviation `sigma`. Non-positive sigmas are a no-op.
    #[instrument(skip(self), fields(sigma))]
    pub fn gaussian_blur(self, sigma: f32) -> Self {
        if sigma <= 0.01 {
            return self;
        }
        let rgb = self.image.to_rgb8();
        Self {
            image: DynamicImage::ImageRgb8(gaussian_blur_f32(&rgb, sigma)),
        }
    }

    /// Box blur with the given radius, applied per channel. Cheaper than
    /// [`ImageProcessor::gaussian_blur`] on large pages.
    #[instrument(skip(self), fields(radius))]
    pub fn box_blur(self, radius: u32) -> Self {
        if radius == 0 {
            return self;
        }
        let rgb = self.image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let planes: Vec<GrayImage> = (0..3)
            .map(|channel| {
                let plane =
                    GrayImage::from_fn(width, height, |x, y| Luma([rgb.get_pixel(x, y).0[channel]]));
                box_filter(&plane, radius, radius)
            })
            .collect();

        let blurred = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                planes[0].get_pixel(x, y).0[0],
                planes[1].get_pixel(x, y).0[0],
                planes[2].get_pixel(x, y).0[0],
            ])
        });
        Self {
            image: DynamicImage::ImageRgb8(blurred),
        }
    }

    /// Scale every channel by `factor` (1.0 is a no-op).
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_brightness(self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        self.map_channels(|channel, _| channel * factor)
    }

    /// Adjust contrast by a factor. Values > 1.0 increase contrast; values
    /// < 1.0 decrease it. A value of 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        self.map_channels(|channel, _| factor * (channel - 128.0) + 128.0)
    }

    /// Multiply the page towards aged-paper yellow. `amount` 0 is a no-op,
    /// 1 is full tint. Dark ink stays dark.
    #[instrument(skip(self), fields(amount))]
    pub fn tint_yellow(self, amount: f32) -> Self {
        if amount <= 0.0 {
            return self;
        }
        let amount = amount.min(1.0);
        self.map_channels(|channel, index| {
            let target = PAPER_YELLOW[index] / 255.0;
            channel * (1.0 - amount * (1.0 - target))
        })
    }

    /// Convert the image to grayscale (luma).
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        Self {
            image: self.image.grayscale(),
        }
    }

    /// Add luminance noise. `strength` 1.0 perturbs each pixel by up to ±64 levels.
    #[instrument(skip(self, rng), fields(strength))]
    pub fn add_noise<R: Rng>(self, strength: f32, rng: &mut R) -> Self {
        if strength <= 0.0 {
            return self;
        }
        let amplitude = strength * 64.0;
        let grayscale = matches!(self.image, DynamicImage::ImageLuma8(_));
        let mut rgb = self.image.to_rgb8();

        for pixel in rgb.pixels_mut() {
            let delta: f32 = rng.gen_range(-amplitude..=amplitude);
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f32 + delta).clamp(0.0, 255.0) as u8;
            }
        }

        let image = DynamicImage::ImageRgb8(rgb);
        Self {
            // Equal per-channel deltas keep a gray page gray.
            image: if grayscale { image.grayscale() } else { image },
        }
    }

    /// Paint a dark frame `thickness` pixels wide along every edge.
    #[instrument(skip(self), fields(thickness))]
    pub fn draw_border(self, thickness: u32) -> Self {
        let mut rgb = self.image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let thickness = thickness.min(width / 2).min(height / 2);
        if thickness == 0 {
            return Self {
                image: DynamicImage::ImageRgb8(rgb),
            };
        }

        let strips = [
            Rect::at(0, 0).of_size(width, thickness),
            Rect::at(0, (height - thickness) as i32).of_size(width, thickness),
            Rect::at(0, 0).of_size(thickness, height),
            Rect::at((width - thickness) as i32, 0).of_size(thickness, height),
        ];
        for strip in strips {
            draw_filled_rect_mut(&mut rgb, strip, BORDER_COLOUR);
        }

        Self {
            image: DynamicImage::ImageRgb8(rgb),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ScanlookError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, ScanlookError> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        // Keep single-channel pages single-channel; JPEG handles both.
        let result = match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
            other => other.to_rgb8().write_with_encoder(encoder),
        };
        result.map_err(|err| {
            ScanlookError::EffectComputation(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    // -- Helpers --------------------------------------------------------------

    /// Apply `op(value, channel_index)` to every colour channel, clamping to u8.
    fn map_channels(self, op: impl Fn(f32, usize) -> f32) -> Self {
        let grayscale = matches!(self.image, DynamicImage::ImageLuma8(_));
        let mut rgb = self.image.to_rgb8();
        for pixel in rgb.pixels_mut() {
            for (index, channel) in pixel.0.iter_mut().enumerate() {
                *channel = op(*channel as f32, index).clamp(0.0, 255.0) as u8;
            }
        }
        let image = DynamicImage::ImageRgb8(rgb);
        Self {
            image: if grayscale { image.grayscale() } else { image },
        }
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, ScanlookError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        ScanlookError::EffectComputation(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn page(width: u32, height: u32, value: u8) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([value, value, value]),
        )))
    }

    #[test]
    fn rotation_keeps_canvas_size_and_fills_white() {
        let out = page(80, 120, 0).rotate(10.0, Interpolation::Bilinear);
        assert_eq!((out.width(), out.height()), (80, 120));
        // The top-left corner rotates out of the page and is filled white.
        let corner = out.as_dynamic().to_rgb8().get_pixel(0, 0).0;
        assert_eq!(corner, [255, 255, 255]);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let out = page(4, 4, 200).adjust_brightness(1.5).into_dynamic().to_rgb8();
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);

        let out = page(4, 4, 100).adjust_brightness(0.5).into_dynamic().to_rgb8();
        assert_eq!(out.get_pixel(0, 0).0, [50, 50, 50]);
    }

    #[test]
    fn yellow_tint_lowers_blue_most() {
        let out = page(2, 2, 255).tint_yellow(1.0).into_dynamic().to_rgb8();
        let [r, g, b] = out.get_pixel(0, 0).0;
        assert_eq!(r, 255);
        assert!(g < r && b < g);
    }

    #[test]
    fn grayscale_survives_channel_ops() {
        let out = page(4, 4, 90).grayscale().adjust_contrast(1.2);
        assert!(matches!(out.as_dynamic(), DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn noise_is_reproducible_for_a_seed() {
        let a = page(16, 16, 128)
            .add_noise(0.5, &mut StdRng::seed_from_u64(9))
            .into_dynamic()
            .to_rgb8();
        let b = page(16, 16, 128)
            .add_noise(0.5, &mut StdRng::seed_from_u64(9))
            .into_dynamic()
            .to_rgb8();
        assert_eq!(a, b);
        assert!(a.pixels().any(|p| p.0[0] != 128));
    }

    #[test]
    fn border_darkens_edges_only() {
        let out = page(50, 50, 255).draw_border(3).into_dynamic().to_rgb8();
        assert_eq!(out.get_pixel(0, 25).0, BORDER_COLOUR.0);
        assert_eq!(out.get_pixel(49, 49).0, BORDER_COLOUR.0);
        assert_eq!(out.get_pixel(25, 25).0, [255, 255, 255]);
    }

    #[test]
    fn box_blur_smooths_an_edge() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        for y in 0..20 {
            for x in 0..10 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .box_blur(2)
            .into_dynamic()
            .to_rgb8();
        let edge = out.get_pixel(10, 10).0[0];
        assert!(edge > 0 && edge < 255);
    }

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let bytes = page(33, 21, 180).to_jpeg_bytes(85).unwrap();
        let decoded = ImageProcessor::from_bytes(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (33, 21));
    }

    #[test]
    fn undecodable_bytes_are_an_effect_error() {
        let err = ImageProcessor::from_bytes(b"not an image").err().unwrap();
        assert!(matches!(err, ScanlookError::EffectComputation(_)));
    }
}
