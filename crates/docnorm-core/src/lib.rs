// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docnorm-core — shared types, configuration, and error definitions for the
// document normalization engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::{HashAlgorithm, PipelineConfig};
pub use error::{NormalizeError, Result};
pub use types::*;
