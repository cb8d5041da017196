// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docnorm-pipeline — the document normalization pipeline.
//
// Takes untrusted PDF or raster-image bytes plus a claimed MIME type and
// produces a deterministic sequence of corrected, re-encoded page artifacts:
// validation, page rasterization, EXIF/deskew/resize geometry correction,
// optional enhancement, scanned/digital classification, and adaptive
// encoding.

pub mod hash;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the primary entry points so callers can use
// `docnorm_pipeline::DocumentPipeline` directly.
pub use docnorm_core::{
    HashAlgorithm, ImageEncoding, NormalizeError, NormalizedDocument, NormalizedPage,
    PipelineConfig, Result, SourceFormat,
};
pub use pipeline::DocumentPipeline;
