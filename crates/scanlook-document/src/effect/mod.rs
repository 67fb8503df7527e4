// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan effect module — the effect engine interface, the raster implementation,
// and the per-document cache that deduplicates effect work.

pub mod cache;
pub mod raster;

use scanlook_core::error::Result;
use scanlook_core::types::{EffectConfig, RenderedPage};

pub use cache::{CacheKey, EffectCache};
pub use raster::RasterEffectEngine;

/// Applies the scanned look to one rendered page.
///
/// `seed` drives every random choice the engine makes (rotation jitter,
/// noise), so the same page, configuration, and seed always produce the same
/// output. The returned page carries the post-effect width and height.
pub trait EffectEngine: Send + Sync {
    fn apply(&self, page: &RenderedPage, config: &EffectConfig, seed: u64) -> Result<RenderedPage>;
}
