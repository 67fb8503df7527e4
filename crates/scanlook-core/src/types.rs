// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanlook batch engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanlookError};

/// MIME type strings understood by the processor registry.
pub mod mime {
    pub const PDF: &str = "application/pdf";
    pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    pub const DOC: &str = "application/msword";
    pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
    pub const PPT: &str = "application/vnd.ms-powerpoint";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Input document formats Scanlook knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Docx,
    Doc,
    Pptx,
    Ppt,
}

impl DocumentType {
    /// MIME type string declared for documents of this type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => mime::PDF,
            Self::Docx => mime::DOCX,
            Self::Doc => mime::DOC,
            Self::Pptx => mime::PPTX,
            Self::Ppt => mime::PPT,
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }
}

/// One input file. Read-only for the whole batch; cloning shares the bytes.
#[derive(Debug, Clone)]
pub struct InputDocument {
    /// Display name, usually the file name.
    pub name: String,
    /// Declared MIME type. Dispatch is driven by this, not by sniffing.
    pub mime_type: String,
    /// Raw document bytes.
    pub bytes: Arc<[u8]>,
    /// Logical path the caller picked the file from (e.g. inside a ZIP).
    pub original_path: String,
}

impl InputDocument {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        original_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            original_path: original_path.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Colour handling for the simulated scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    Colorful,
    Grayscale,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 2] = [ColorSpace::Colorful, ColorSpace::Grayscale];
}

/// Visual parameters applied uniformly to every page of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Base rotation in degrees.
    pub rotate: f32,
    /// Per-page rotation jitter in degrees, drawn from `[-rotate_var, rotate_var]`.
    pub rotate_var: f32,
    /// Gaussian blur sigma.
    pub blur: f32,
    /// Noise strength (0 = none, 1 = heavy).
    pub noise: f32,
    /// Rasterization scale relative to the page's native size.
    pub scale: f32,
    /// Multiplicative brightness (1 = unchanged).
    pub brightness: f32,
    /// Blend factor towards aged-paper yellow.
    pub yellowish: f32,
    /// Contrast factor around mid-grey (1 = unchanged).
    pub contrast: f32,
    /// Draw a dark scanner-bed border around the page.
    pub border: bool,
    pub colorspace: ColorSpace,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            rotate: 1.0,
            rotate_var: 0.5,
            blur: 0.3,
            noise: 0.1,
            scale: 2.0,
            brightness: 1.0,
            yellowish: 0.0,
            contrast: 1.0,
            border: false,
            colorspace: ColorSpace::Grayscale,
        }
    }
}

impl EffectConfig {
    /// Check every numeric field against its domain bounds.
    pub fn validate(&self) -> Result<()> {
        for field in EffectField::ALL {
            let value = field.get(self);
            if !field.domain().contains(value) {
                return Err(ScanlookError::InvalidConfig(format!(
                    "{} = {} is outside {}",
                    field.name(),
                    value,
                    field.domain()
                )));
            }
        }
        Ok(())
    }
}

/// The numeric fields of [`EffectConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectField {
    Rotate,
    RotateVar,
    Blur,
    Noise,
    Scale,
    Brightness,
    Yellowish,
    Contrast,
}

impl EffectField {
    pub const ALL: [EffectField; 8] = [
        EffectField::Rotate,
        EffectField::RotateVar,
        EffectField::Blur,
        EffectField::Noise,
        EffectField::Scale,
        EffectField::Brightness,
        EffectField::Yellowish,
        EffectField::Contrast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotate => "rotate",
            Self::RotateVar => "rotate_var",
            Self::Blur => "blur",
            Self::Noise => "noise",
            Self::Scale => "scale",
            Self::Brightness => "brightness",
            Self::Yellowish => "yellowish",
            Self::Contrast => "contrast",
        }
    }

    /// Hard limits for the field. Random ranges must sit inside these.
    pub fn domain(&self) -> FieldRange {
        match self {
            Self::Rotate => FieldRange::new(-5.0, 5.0),
            Self::RotateVar => FieldRange::new(0.0, 2.0),
            Self::Blur => FieldRange::new(0.0, 2.0),
            Self::Noise => FieldRange::new(0.0, 1.0),
            Self::Scale => FieldRange::new(1.0, 3.0),
            Self::Brightness => FieldRange::new(0.0, 2.0),
            Self::Yellowish => FieldRange::new(0.0, 1.0),
            Self::Contrast => FieldRange::new(0.0, 2.0),
        }
    }

    pub fn get(&self, config: &EffectConfig) -> f32 {
        match self {
            Self::Rotate => config.rotate,
            Self::RotateVar => config.rotate_var,
            Self::Blur => config.blur,
            Self::Noise => config.noise,
            Self::Scale => config.scale,
            Self::Brightness => config.brightness,
            Self::Yellowish => config.yellowish,
            Self::Contrast => config.contrast,
        }
    }

    pub fn set(&self, config: &mut EffectConfig, value: f32) {
        match self {
            Self::Rotate => config.rotate = value,
            Self::RotateVar => config.rotate_var = value,
            Self::Blur => config.blur = value,
            Self::Noise => config.noise = value,
            Self::Scale => config.scale = value,
            Self::Brightness => config.brightness = value,
            Self::Yellowish => config.yellowish = value,
            Self::Contrast => config.contrast = value,
        }
    }
}

/// Inclusive `[min, max]` interval for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f32,
    pub max: f32,
}

impl FieldRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for FieldRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Per-field sampling ranges used when randomization is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomRanges {
    pub rotate: FieldRange,
    pub rotate_var: FieldRange,
    pub blur: FieldRange,
    pub noise: FieldRange,
    pub scale: FieldRange,
    pub brightness: FieldRange,
    pub yellowish: FieldRange,
    pub contrast: FieldRange,
    /// `true` draws the border flag at random; `false` keeps the base value.
    pub border: bool,
    /// `true` draws the colorspace at random; `false` keeps the base value.
    pub colorspace: bool,
}

impl Default for RandomRanges {
    fn default() -> Self {
        Self {
            rotate: FieldRange::new(-2.0, 2.0),
            rotate_var: FieldRange::new(0.0, 1.0),
            blur: FieldRange::new(0.1, 1.0),
            noise: FieldRange::new(0.1, 0.5),
            scale: FieldRange::new(1.5, 3.0),
            brightness: FieldRange::new(0.8, 1.2),
            yellowish: FieldRange::new(0.0, 0.3),
            contrast: FieldRange::new(0.9, 1.1),
            border: true,
            colorspace: true,
        }
    }
}

impl RandomRanges {
    pub fn range(&self, field: EffectField) -> FieldRange {
        match field {
            EffectField::Rotate => self.rotate,
            EffectField::RotateVar => self.rotate_var,
            EffectField::Blur => self.blur,
            EffectField::Noise => self.noise,
            EffectField::Scale => self.scale,
            EffectField::Brightness => self.brightness,
            EffectField::Yellowish => self.yellowish,
            EffectField::Contrast => self.contrast,
        }
    }

    /// Every range must be ordered, finite, and inside its field's domain.
    pub fn validate(&self) -> Result<()> {
        for field in EffectField::ALL {
            let range = self.range(field);
            let domain = field.domain();
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(ScanlookError::InvalidConfig(format!(
                    "{} range {} is not a valid interval",
                    field.name(),
                    range
                )));
            }
            if !domain.contains(range.min) || !domain.contains(range.max) {
                return Err(ScanlookError::InvalidConfig(format!(
                    "{} range {} exceeds domain {}",
                    field.name(),
                    range,
                    domain
                )));
            }
        }
        Ok(())
    }
}

/// Whether to randomize per document, and within which ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomSettings {
    pub enabled: bool,
    pub ranges: RandomRanges,
}

/// One rasterized (or effect-applied) page image.
///
/// `width`/`height` always describe the encoded image in `data`; after the
/// effect runs they are the post-effect dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Encoded image bytes (PNG or JPEG).
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Resolution in dots per inch.
    pub dpi: f32,
}

impl RenderedPage {
    pub fn new(data: impl Into<Arc<[u8]>>, width: u32, height: u32, dpi: f32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            dpi,
        }
    }
}

/// One successfully processed input document.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Derived output file name, e.g. `report_scanned.pdf`.
    pub output_name: String,
    /// The assembled output PDF.
    pub output: Vec<u8>,
    /// The input this result came from.
    pub source: InputDocument,
    pub original_path: String,
}

/// Extensions replaced when deriving output names.
const RECOGNISED_EXTENSIONS: [&str; 5] = ["pdf", "docx", "doc", "ppt", "pptx"];

/// Derive the output name for `input_name`: a trailing recognised document
/// extension (case-insensitive) is replaced by `suffix` plus `.{extension}`.
/// Names without a recognised extension come back unchanged.
pub fn output_name(input_name: &str, suffix: &str, extension: &str) -> String {
    if let Some((stem, ext)) = input_name.rsplit_once('.') {
        let ext = ext.to_ascii_lowercase();
        if RECOGNISED_EXTENSIONS.contains(&ext.as_str()) {
            return format!("{stem}{suffix}.{extension}");
        }
    }
    input_name.to_string()
}
