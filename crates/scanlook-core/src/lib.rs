// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanlook — Core types, settings, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod random;
pub mod types;

pub use config::{EffectStrategy, PipelineSettings};
pub use error::{ErrorKind, ScanlookError};
pub use random::{ConfigGenerator, RandomSource};
pub use types::*;
