// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and the single batch run they describe.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use scanlook_batch::{BatchOrchestrator, BatchReport, ProgressObserver};
use scanlook_core::error::ScanlookError;
use scanlook_core::human_errors::humanize_error;
use scanlook_core::random::RandomSource;
use tracing::{info, warn};

use crate::inputs::load_documents;
use crate::settings::AppSettings;

/// Turn PDF and Word documents into scanned-looking PDFs.
#[derive(Debug, Parser)]
#[command(name = "scanlook", version, about, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Files or directories to process (directories are read one level deep).
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory the scanned PDFs are written to.
    #[arg(short, long, default_value = "scanned")]
    pub output: PathBuf,

    /// Draw an independent effect configuration for every document.
    #[arg(long)]
    pub random: bool,

    /// Seed for reproducible randomized runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON settings file with optional `pipeline`, `effect` and `random` sections.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the cheaper effect engine.
    #[arg(long)]
    pub fast: bool,

    /// Do not print per-document progress.
    #[arg(short, long)]
    pub quiet: bool,
}

const LONG_ABOUT: &str = "\
Turn PDF and Word documents into scanned-looking PDFs.

PDF pages are drawn from their embedded page images, so scans and photo \
PDFs work. Pages made only of text or vector graphics have nothing to draw \
and the document is skipped with an explanation.

Word documents are typeset as plain text on a single A4 page; formatting, \
images and tables are not reproduced.

Two inputs with the same file name get distinct outputs: the second is \
written as <name>_scanned-2.pdf, and so on.";

/// Prints one line per progress call, plus an explanation for dropped files.
struct ConsoleProgress {
    quiet: bool,
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, fraction: f64, name: &str) {
        if !self.quiet && !name.is_empty() {
            eprintln!("[{:>3.0}%] {name}", fraction * 100.0);
        }
    }

    fn on_document_failed(&self, name: &str, error: &ScanlookError) {
        eprintln!("{}", skip_line(name, error));
    }
}

fn skip_line(name: &str, error: &ScanlookError) -> String {
    let human = humanize_error(error);
    format!(
        "skipped {name} ({}): {} {}",
        human.severity.label(),
        human.message,
        human.suggestion
    )
}

/// Run one batch as described by `cli` and write its outputs.
pub async fn run(cli: Cli) -> Result<BatchReport> {
    let settings = match &cli.config {
        Some(path) => AppSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => AppSettings::default(),
    }
    .with_overrides(cli.random, cli.fast);

    let documents = load_documents(&cli.inputs).context("failed to read input files")?;

    let mut orchestrator = BatchOrchestrator::standard(settings.pipeline.clone());
    if let Some(seed) = cli.seed {
        orchestrator = orchestrator.with_random_source(RandomSource::seeded(seed));
    }

    let progress = ConsoleProgress { quiet: cli.quiet };
    let report = orchestrator
        .process_batch_with_report(documents, &settings.effect, &settings.random, Some(&progress))
        .await
        .context("batch could not start")?;

    write_outputs(&cli.output, &report)?;

    info!(
        written = report.succeeded(),
        skipped = report.failed(),
        output = %cli.output.display(),
        "Run complete"
    );
    Ok(report)
}

/// Write every successful result under `dir`, creating it if needed.
///
/// Results whose output names collide within the batch are written with a
/// `-2`, `-3`, ... suffix before the extension, in report order.
pub fn write_outputs(dir: &Path, report: &BatchReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut taken = HashSet::new();
    report
        .results
        .iter()
        .map(|result| {
            let name = unique_name(&result.output_name, &mut taken);
            if name != result.output_name {
                warn!(
                    source = %result.original_path,
                    wanted = %result.output_name,
                    written = %name,
                    "Output name already used in this batch"
                );
            }
            let path = dir.join(&name);
            std::fs::write(&path, &result.output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

/// `name`, or the first of `stem-2.ext`, `stem-3.ext`, ... not yet in `taken`.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (name, String::new()),
    };
    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}
