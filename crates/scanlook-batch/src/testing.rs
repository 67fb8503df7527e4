// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles for the batch pipeline: a processor with injectable latency and
// concurrency tracking, and an effect engine that counts its calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{EffectConfig, InputDocument, RenderedPage};
use scanlook_document::{DocumentProcessor, EffectEngine, ImageProcessor};

/// PNG of `width` x `height`, filled with `shade`.
pub fn png_page(width: u32, height: u32, shade: u8) -> RenderedPage {
    let png = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([shade, shade, shade]),
    )))
    .to_png_bytes()
    .expect("encode test page");
    RenderedPage::new(png, width, height, 72.0)
}

/// High-water marks of concurrent rendering, shared by every clone.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    active: Mutex<HashMap<String, usize>>,
    max_documents: AtomicUsize,
    max_pages_per_document: AtomicUsize,
}

impl ConcurrencyGauge {
    fn enter(&self, document: &str) {
        let mut active = self.active.lock().expect("gauge lock");
        let pages = active.entry(document.to_string()).or_insert(0);
        *pages += 1;
        self.max_pages_per_document.fetch_max(*pages, Ordering::SeqCst);
        let documents = active.values().filter(|&&count| count > 0).count();
        self.max_documents.fetch_max(documents, Ordering::SeqCst);
    }

    fn leave(&self, document: &str) {
        let mut active = self.active.lock().expect("gauge lock");
        if let Some(pages) = active.get_mut(document) {
            *pages -= 1;
        }
    }

    pub fn max_documents(&self) -> usize {
        self.max_documents.load(Ordering::SeqCst)
    }

    pub fn max_pages_per_document(&self) -> usize {
        self.max_pages_per_document.load(Ordering::SeqCst)
    }
}

/// Processor for a made-up MIME type. Page `n` renders as a `10n` x 10 image
/// (or a fixed 10 x 10 image when `identical_pages` is set).
pub struct FakeProcessor {
    pub mime_type: &'static str,
    pub pages: u32,
    /// Sleep before rendering page `n` (1-based).
    pub latency: fn(u32, u32) -> Duration,
    pub identical_pages: bool,
    pub fail_on_page: Option<u32>,
    pub gauge: Arc<ConcurrencyGauge>,
    pub renders: Arc<AtomicUsize>,
}

impl FakeProcessor {
    pub fn new(mime_type: &'static str, pages: u32) -> Self {
        Self {
            mime_type,
            pages,
            latency: |_, _| Duration::from_millis(5),
            identical_pages: false,
            fail_on_page: None,
            gauge: Arc::new(ConcurrencyGauge::default()),
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Later pages finish first.
    pub fn reversed_latency(mut self) -> Self {
        self.latency = |page, pages| Duration::from_millis(15 * u64::from(pages - page + 1));
        self
    }

    pub fn with_latency(mut self, latency: fn(u32, u32) -> Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn identical_pages(mut self) -> Self {
        self.identical_pages = true;
        self
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }
}

impl DocumentProcessor for FakeProcessor {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn can_handle(&self, document: &InputDocument) -> bool {
        document.mime_type == self.mime_type
    }

    fn page_count(&self, _document: &InputDocument) -> Result<u32> {
        Ok(self.pages)
    }

    fn render_page(&self, document: &InputDocument, page: u32, _scale: f32) -> Result<RenderedPage> {
        self.gauge.enter(&document.name);
        std::thread::sleep((self.latency)(page, self.pages));
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.gauge.leave(&document.name);

        if self.fail_on_page == Some(page) {
            return Err(ScanlookError::PageRender {
                page,
                reason: "injected failure".into(),
            });
        }
        if self.identical_pages {
            Ok(png_page(10, 10, 200))
        } else {
            Ok(png_page(10 * page, 10, 200))
        }
    }
}

/// Returns pages unchanged and counts calls.
#[derive(Default)]
pub struct CountingEngine {
    pub calls: AtomicUsize,
}

impl CountingEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EffectEngine for CountingEngine {
    fn apply(&self, page: &RenderedPage, _config: &EffectConfig, _seed: u64) -> Result<RenderedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(page.clone())
    }
}
