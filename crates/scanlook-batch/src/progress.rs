// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch progress reporting.
//
// Cadence: one `on_progress` call per finished document (success or failure)
// in completion order, carrying the fraction done and that document's output
// name, then one final `on_progress(1.0, "")` when the batch is over.

use scanlook_core::error::{ErrorKind, ScanlookError};
use tokio::sync::mpsc;

/// Receives batch progress.
pub trait ProgressObserver: Send + Sync {
    /// `fraction` is in `[0, 1]`; `name` is the finished document's output
    /// name, or empty for the final call.
    fn on_progress(&self, fraction: f64, name: &str);

    /// Called just before the progress call for a document that was dropped.
    fn on_document_failed(&self, _name: &str, _error: &ScanlookError) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn on_progress(&self, fraction: f64, name: &str) {
        self(fraction, name)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _fraction: f64, _name: &str) {}
}

/// One progress notification, as delivered by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress { fraction: f64, name: String },
    Failed {
        name: String,
        kind: ErrorKind,
        message: String,
    },
}

/// Forwards notifications into an unbounded tokio channel so a UI task can
/// consume them at its own pace. Sends after the receiver is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, fraction: f64, name: &str) {
        let _ = self.sender.send(ProgressEvent::Progress {
            fraction,
            name: name.to_string(),
        });
    }

    fn on_document_failed(&self, name: &str, error: &ScanlookError) {
        let _ = self.sender.send(ProgressEvent::Failed {
            name: name.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}
