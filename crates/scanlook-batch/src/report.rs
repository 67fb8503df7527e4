// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch outcome: the successful results plus a record of every dropped document.

use chrono::{DateTime, Utc};
use scanlook_core::error::{ErrorKind, ScanlookError};
use scanlook_core::types::{BatchResult, InputDocument};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why one document is missing from the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub name: String,
    pub original_path: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl DocumentFailure {
    pub fn new(document: &InputDocument, error: &ScanlookError) -> Self {
        Self {
            name: document.name.clone(),
            original_path: document.original_path.clone(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything one batch run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of input documents.
    pub total: usize,
    /// Successful documents, in completion order.
    pub results: Vec<BatchResult>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Failure record for the input named `name`, if it was dropped.
    pub fn failure_for(&self, name: &str) -> Option<&DocumentFailure> {
        self.failures.iter().find(|failure| failure.name == name)
    }
}
