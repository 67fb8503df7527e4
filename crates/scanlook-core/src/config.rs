// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline settings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanlookError};

/// Which effect engine implementation to run.
///
/// Chosen explicitly by whoever builds the pipeline rather than detected at
/// process start, so tests can force either path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectStrategy {
    /// Bilinear rotation and Gaussian blur.
    #[default]
    Precise,
    /// Nearest-neighbour rotation and box blur. Noticeably cheaper on large pages.
    Fast,
}

/// Scheduling and output settings for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Documents processed concurrently (outer bound).
    pub file_concurrency: usize,
    /// Pages of one document processed concurrently (inner bound).
    pub page_concurrency: usize,
    /// Resolution written into the output when a page carries no better value.
    pub default_dpi: f32,
    /// Appended to the input stem when naming outputs.
    pub output_suffix: String,
    /// Effect engine implementation.
    pub effect_strategy: EffectStrategy,
    /// JPEG quality (1-100) for effect-applied pages.
    pub jpeg_quality: u8,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            file_concurrency: 2,
            page_concurrency: 3,
            default_dpi: 96.0,
            output_suffix: "_scanned".into(),
            effect_strategy: EffectStrategy::Precise,
            jpeg_quality: 85,
        }
    }
}

impl PipelineSettings {
    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.file_concurrency == 0 {
            return Err(ScanlookError::InvalidConfig(
                "file_concurrency must be at least 1".into(),
            ));
        }
        if self.page_concurrency == 0 {
            return Err(ScanlookError::InvalidConfig(
                "page_concurrency must be at least 1".into(),
            ));
        }
        if !(self.default_dpi.is_finite() && self.default_dpi > 0.0) {
            return Err(ScanlookError::InvalidConfig(format!(
                "default_dpi must be positive, got {}",
                self.default_dpi
            )));
        }
        if self.output_suffix.is_empty() {
            return Err(ScanlookError::InvalidConfig(
                "output_suffix must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ScanlookError::InvalidConfig(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.file_concurrency, 2);
        assert_eq!(settings.page_concurrency, 3);
        assert_eq!(settings.default_dpi, 96.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_bounds_rejected() {
        let settings = PipelineSettings {
            page_concurrency: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: PipelineSettings =
            serde_json::from_str(r#"{"file_concurrency": 4, "effect_strategy": "fast"}"#).unwrap();
        assert_eq!(settings.file_concurrency, 4);
        assert_eq!(settings.page_concurrency, 3);
        assert_eq!(settings.effect_strategy, EffectStrategy::Fast);
    }
}
