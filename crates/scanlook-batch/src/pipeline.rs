// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page pipeline — rasterize and apply the effect to every page of one document.

use std::sync::Arc;

use futures::future::try_join_all;
use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{EffectConfig, InputDocument, RenderedPage};
use scanlook_document::{DocumentProcessor, EffectCache};
use tracing::{debug, instrument};

/// Runs one document's pages in chunks of at most `page_concurrency`.
///
/// Every page of a chunk runs in parallel and the next chunk starts only when
/// the whole chunk is done. Results land in a slot per page index, so the
/// returned pages are in page order whatever order they completed in. Any
/// page failure fails the document.
pub struct PagePipeline<'a> {
    processor: Arc<dyn DocumentProcessor>,
    cache: &'a EffectCache,
    page_concurrency: usize,
}

impl<'a> PagePipeline<'a> {
    pub fn new(
        processor: Arc<dyn DocumentProcessor>,
        cache: &'a EffectCache,
        page_concurrency: usize,
    ) -> Self {
        Self {
            processor,
            cache,
            page_concurrency: page_concurrency.max(1),
        }
    }

    #[instrument(skip_all, fields(document = %document.name, processor = self.processor.name()))]
    pub async fn run(&self, document: &InputDocument, config: &EffectConfig) -> Result<Vec<RenderedPage>> {
        let page_count = {
            let processor = Arc::clone(&self.processor);
            let document = document.clone();
            tokio::task::spawn_blocking(move || processor.page_count(&document))
                .await
                .map_err(|err| {
                    ScanlookError::InvalidDocument(format!("page count task join error: {}", err))
                })??
        };
        debug!(pages = page_count, "Page count known");

        let mut slots: Vec<Option<RenderedPage>> = (0..page_count).map(|_| None).collect();
        let page_numbers: Vec<u32> = (1..=page_count).collect();

        for (chunk_index, chunk) in page_numbers.chunks(self.page_concurrency).enumerate() {
            debug!(chunk = chunk_index, first_page = chunk[0], size = chunk.len(), "Page chunk started");

            let finished = try_join_all(
                chunk
                    .iter()
                    .map(|&page| self.process_page(document, page, config)),
            )
            .await?;

            for (page, rendered) in finished {
                slots[(page - 1) as usize] = Some(rendered);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| ScanlookError::PageRender {
                    page: index as u32 + 1,
                    reason: "page produced no output".into(),
                })
            })
            .collect()
    }

    async fn process_page(
        &self,
        document: &InputDocument,
        page: u32,
        config: &EffectConfig,
    ) -> Result<(u32, RenderedPage)> {
        let processor = Arc::clone(&self.processor);
        let owned = document.clone();
        let scale = config.scale;

        let rendered = tokio::task::spawn_blocking(move || processor.render_page(&owned, page, scale))
            .await
            .map_err(|err| ScanlookError::PageRender {
                page,
                reason: format!("render task join error: {}", err),
            })??;

        let applied = self.cache.apply(&rendered, config).await?;
        debug!(page, width = applied.width, height = applied.height, "Page done");
        Ok((page, applied))
    }
}
