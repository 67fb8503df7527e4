// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanlook-batch — Drives a batch of documents through rasterization, the scan
// effect, and assembly under two nested concurrency bounds (documents, and
// pages within a document), isolating failures per document.

pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod report;

#[cfg(test)]
mod testing;

pub use orchestrator::BatchOrchestrator;
pub use pipeline::PagePipeline;
pub use progress::{ChannelObserver, NoProgress, ProgressEvent, ProgressObserver};
pub use report::{BatchReport, DocumentFailure};
