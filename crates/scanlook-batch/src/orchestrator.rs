// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator — runs documents through the page pipeline and assembly
// in chunks of at most `file_concurrency`, dropping failed documents without
// disturbing their siblings.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use scanlook_core::config::PipelineSettings;
use scanlook_core::error::Result;
use scanlook_core::random::{ConfigGenerator, RandomSource};
use scanlook_core::types::{BatchResult, EffectConfig, InputDocument, RandomSettings, output_name};
use scanlook_document::{Assembler, EffectCache, EffectEngine, ProcessorRegistry, RasterEffectEngine};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::pipeline::PagePipeline;
use crate::progress::{NoProgress, ProgressObserver};
use crate::report::{BatchReport, DocumentFailure};

/// Extension of every output document.
const OUTPUT_EXTENSION: &str = "pdf";

/// Entry point for batch processing.
///
/// Holds the processor registry, the effect engine shared by every
/// per-document cache, the assembler, and the randomness source used to give
/// each document its own configuration.
pub struct BatchOrchestrator {
    registry: ProcessorRegistry,
    engine: Arc<dyn EffectEngine>,
    assembler: Assembler,
    settings: PipelineSettings,
    random: Mutex<RandomSource>,
}

impl BatchOrchestrator {
    pub fn new(
        registry: ProcessorRegistry,
        engine: Arc<dyn EffectEngine>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            registry,
            engine,
            assembler: Assembler::new(settings.default_dpi),
            settings,
            random: Mutex::new(RandomSource::from_entropy()),
        }
    }

    /// Stock processors and the raster engine selected by `settings`.
    pub fn standard(settings: PipelineSettings) -> Self {
        let engine = RasterEffectEngine::new(settings.effect_strategy, settings.jpeg_quality);
        Self::new(ProcessorRegistry::standard(), Arc::new(engine), settings)
    }

    /// Replace the randomness source, e.g. with [`RandomSource::seeded`] for
    /// reproducible batches.
    pub fn with_random_source(mut self, source: RandomSource) -> Self {
        self.random = Mutex::new(source);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process a batch and return the successful documents only.
    ///
    /// Failed documents are simply absent; use
    /// [`BatchOrchestrator::process_batch_with_report`] to learn why.
    pub async fn process_batch(
        &self,
        documents: Vec<InputDocument>,
        base: &EffectConfig,
        random: &RandomSettings,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Vec<BatchResult>> {
        self.process_batch_with_report(documents, base, random, observer)
            .await
            .map(|report| report.results)
    }

    /// Process a batch and return successes together with a failure record
    /// for every dropped document.
    ///
    /// The only batch-wide error is invalid settings or configuration, which
    /// is reported before any document is touched.
    #[instrument(skip_all, fields(documents = documents.len(), randomized = random.enabled))]
    pub async fn process_batch_with_report(
        &self,
        documents: Vec<InputDocument>,
        base: &EffectConfig,
        random: &RandomSettings,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<BatchReport> {
        self.settings.validate()?;
        ConfigGenerator::validate(base, random)?;

        let observer = observer.unwrap_or(&NoProgress);
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        let total = documents.len();

        info!(%batch_id, total, file_concurrency = self.settings.file_concurrency, "Batch started");

        // One independent configuration per document, drawn in input order.
        let jobs: Vec<(InputDocument, EffectConfig)> = {
            let mut source = self.random.lock().unwrap_or_else(PoisonError::into_inner);
            documents
                .into_iter()
                .map(|document| {
                    let config = ConfigGenerator::for_document(base, random, &mut source.fork());
                    (document, config)
                })
                .collect()
        };

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut completed = 0usize;

        for (chunk_index, chunk) in jobs.chunks(self.settings.file_concurrency).enumerate() {
            debug!(chunk = chunk_index, size = chunk.len(), "Document chunk started");

            let mut in_flight: FuturesUnordered<_> = chunk
                .iter()
                .map(|(document, config)| async move {
                    (document, self.process_document(document, config).await)
                })
                .collect();

            while let Some((document, outcome)) = in_flight.next().await {
                completed += 1;
                let name = output_name(&document.name, &self.settings.output_suffix, OUTPUT_EXTENSION);

                match outcome {
                    Ok(result) => results.push(result),
                    Err(err) => {
                        warn!(document = %document.name, kind = ?err.kind(), %err, "Document dropped");
                        observer.on_document_failed(&name, &err);
                        failures.push(DocumentFailure::new(document, &err));
                    }
                }

                observer.on_progress(completed as f64 / total as f64, &name);
            }
        }

        observer.on_progress(1.0, "");

        info!(
            %batch_id,
            succeeded = results.len(),
            failed = failures.len(),
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Batch finished"
        );

        Ok(BatchReport {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            total,
            results,
            failures,
        })
    }

    /// Everything for one document: dispatch, pages, effect, assembly.
    #[instrument(skip_all, fields(document = %document.name))]
    async fn process_document(
        &self,
        document: &InputDocument,
        config: &EffectConfig,
    ) -> Result<BatchResult> {
        let clock = Instant::now();
        let processor = self.registry.processor_for(document)?;

        // The cache lives exactly as long as this document's run.
        let cache = EffectCache::new(Arc::clone(&self.engine));
        let pages = PagePipeline::new(processor, &cache, self.settings.page_concurrency)
            .run(document, config)
            .await?;
        debug!(
            pages = pages.len(),
            cache_hits = cache.hits(),
            cache_misses = cache.misses(),
            "Pages ready for assembly"
        );

        let output = self.assembler.assemble(pages, &document.name, None).await?;
        let output_name = output_name(&document.name, &self.settings.output_suffix, OUTPUT_EXTENSION);

        info!(
            output = %output_name,
            bytes = output.len(),
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Document finished"
        );

        Ok(BatchResult {
            output_name,
            output,
            original_path: document.original_path.clone(),
            source: document.clone(),
        })
    }
}
