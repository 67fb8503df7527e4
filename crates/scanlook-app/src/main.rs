// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanlook — batch engine that turns PDF and Word documents into
// scanned-looking PDFs.
//
// Entry point. Initialises logging, parses arguments, and runs one batch.

mod cli;
mod inputs;
mod settings;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(inputs = cli.inputs.len(), "Scanlook starting");

    match cli::run(cli).await {
        Ok(report) => {
            eprintln!(
                "{} of {} documents scanned",
                report.succeeded(),
                report.total
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
