// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings file for the command-line front end.

use std::path::Path;

use scanlook_core::config::{EffectStrategy, PipelineSettings};
use scanlook_core::error::Result;
use scanlook_core::types::{EffectConfig, RandomSettings};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything one run needs. Every section is optional in the JSON file.
///
/// ```json
/// {
///   "pipeline": { "file_concurrency": 4, "effect_strategy": "fast" },
///   "effect": { "rotate": 0.5, "colorspace": "colorful" },
///   "random": { "enabled": true }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub pipeline: PipelineSettings,
    pub effect: EffectConfig,
    pub random: RandomSettings,
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Apply command-line switches on top of the file values.
    pub fn with_overrides(mut self, random: bool, fast: bool) -> Self {
        if random {
            self.random.enabled = true;
        }
        if fast {
            self.pipeline.effect_strategy = EffectStrategy::Fast;
        }
        self
    }
}
