// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the normalization pipeline.

use thiserror::Error;

/// Terminal failures of a normalization call.
///
/// Every variant aborts the current document; the pipeline never retries
/// internally. Best-effort sub-steps (text extraction, deskew, denoise,
/// contrast) degrade gracefully instead of surfacing here.
#[derive(Debug, Error)]
pub enum NormalizeError {
    // -- Validation failures (before any expensive work) --
    #[error("input is corrupted or malformed: {0}")]
    CorruptedInput(String),

    #[error("PDF is encrypted and cannot be processed")]
    EncryptedInput,

    #[error("document has {actual} pages, exceeding maximum allowed {max}")]
    TooManyPages { actual: usize, max: usize },

    #[error("format '{detected}' is not supported")]
    UnsupportedFormat { detected: String },

    // -- Processing failures --
    #[error("page rasterizer unavailable: {0}")]
    Rasterizer(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal pipeline failure: {0}")]
    Internal(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NormalizeError>;
