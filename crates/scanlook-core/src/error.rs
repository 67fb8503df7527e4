// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanlook.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for all Scanlook operations.
///
/// Any variant raised while one document is being processed abandons that
/// document only; the batch orchestrator records it and moves on.
#[derive(Debug, Error)]
pub enum ScanlookError {
    // -- Dispatch --
    #[error("no processor available for file type: {mime_type} ({name})")]
    UnsupportedFormat { mime_type: String, name: String },

    #[error("not implemented yet: {0}")]
    NotImplemented(String),

    #[error("document could not be opened: {0}")]
    InvalidDocument(String),

    // -- Page pipeline --
    #[error("failed to render page {page}: {reason}")]
    PageRender { page: u32, reason: String },

    #[error("scan effect failed: {0}")]
    EffectComputation(String),

    // -- Assembly --
    #[error("failed to load image for page {page}: {reason}")]
    ImageDecode { page: u32, reason: String },

    #[error("failed to assemble output document: {0}")]
    Assembly(String),

    // -- Settings --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stable discriminant of a [`ScanlookError`], suitable for reports and
/// assertions where the message text does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedFormat,
    NotImplemented,
    InvalidDocument,
    PageRender,
    EffectComputation,
    ImageDecode,
    Assembly,
    InvalidConfig,
    Io,
    Serialization,
}

impl ScanlookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::InvalidDocument(_) => ErrorKind::InvalidDocument,
            Self::PageRender { .. } => ErrorKind::PageRender,
            Self::EffectComputation(_) => ErrorKind::EffectComputation,
            Self::ImageDecode { .. } => ErrorKind::ImageDecode,
            Self::Assembly(_) => ErrorKind::Assembly,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanlookError>;
