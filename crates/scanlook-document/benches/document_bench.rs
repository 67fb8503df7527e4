// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scan effect in the scanlook-document crate:
// both engine strategies on a synthetic page, and the cache hit path.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use scanlook_core::{EffectConfig, EffectStrategy, RenderedPage};
use scanlook_document::{EffectCache, EffectEngine, ImageProcessor, RasterEffectEngine};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 400x560 page: white paper with dark "text" bars.
fn synthetic_page() -> RenderedPage {
    let (width, height) = (400u32, 560u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([250, 250, 250]));
    for line in 0..20 {
        let y0 = 40 + line * 24;
        for y in y0..y0 + 8 {
            for x in 40..360 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
    }
    let png = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
        .to_png_bytes()
        .expect("encode synthetic page");
    RenderedPage::new(png, width, height, 144.0)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_effect_strategies(c: &mut Criterion) {
    let page = synthetic_page();
    let config = EffectConfig {
        blur: 0.8,
        noise: 0.3,
        border: true,
        ..Default::default()
    };

    for (label, strategy) in [
        ("effect_precise (400x560)", EffectStrategy::Precise),
        ("effect_fast (400x560)", EffectStrategy::Fast),
    ] {
        let engine = RasterEffectEngine::new(strategy, 85);
        c.bench_function(label, |b| {
            b.iter(|| black_box(engine.apply(black_box(&page), &config, 42).expect("effect")));
        });
    }
}

/// Repeated requests for an already computed key never reach the engine.
fn bench_cache_hit(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let page = synthetic_page();
    let config = EffectConfig::default();
    let cache = EffectCache::new(Arc::new(RasterEffectEngine::default()));
    runtime
        .block_on(cache.apply(&page, &config))
        .expect("warm cache");

    c.bench_function("effect_cache_hit (400x560)", |b| {
        b.iter(|| black_box(runtime.block_on(cache.apply(&page, &config)).expect("hit")));
    });
}

criterion_group!(benches, bench_effect_strategies, bench_cache_hit);
criterion_main!(benches);
