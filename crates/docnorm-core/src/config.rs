// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Target DPI for page rasterization and nominal output resolution.
pub const DEFAULT_TARGET_DPI: u32 = 200;

/// Maximum pixel dimension of a normalized page (larger side).
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

/// Maximum number of PDF pages accepted per document.
pub const DEFAULT_MAX_PAGES: usize = 100;

/// JPEG quality used for size-optimized (scanned) pages.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Minimum trimmed character count for a page to count as text-native.
///
/// Empirically tuned: low enough to tolerate short captions, high enough to
/// reject pages whose text layer is effectively absent.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;

/// Skew angles at or below this magnitude are treated as estimator noise and
/// not worth the resampling cost. Empirically tuned.
pub const DESKEW_NOISE_FLOOR_DEGREES: f32 = 0.5;

/// Skew angles at or above this magnitude indicate a genuine orientation
/// problem outside deskew's purview and are left uncorrected.
pub const DESKEW_CEILING_DEGREES: f32 = 10.0;

/// Contrast stretch factor applied when contrast enhancement is enabled.
pub const DEFAULT_CONTRAST_FACTOR: f32 = 1.5;

/// Per-call tuning for a normalization run.
///
/// All knobs are passed explicitly; the pipeline reads nothing from the
/// ambient environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rasterization DPI for PDF pages and the nominal DPI stamped on output.
    pub target_dpi: u32,
    /// Pages whose larger side exceeds this are scaled down (never up).
    pub max_dimension: u32,
    /// PDF documents with more pages than this are rejected.
    pub max_pages: usize,
    /// JPEG quality (1-100) for lossy-encoded pages.
    pub jpeg_quality: u8,
    /// Apply EXIF orientation rotation to image inputs.
    pub auto_rotate: bool,
    /// Estimate and correct small rotational skew.
    pub deskew: bool,
    /// Apply non-local-means-style denoising.
    pub denoise: bool,
    /// Apply midpoint contrast stretching.
    pub enhance_contrast: bool,
    /// Contrast stretch factor; 1.0 is a no-op.
    pub contrast_factor: f32,
    /// Trimmed character threshold for scanned-page classification.
    pub min_text_chars: usize,
    /// Lower bound (exclusive) of the corrective deskew window, degrees.
    pub deskew_noise_floor: f32,
    /// Upper bound (exclusive) of the corrective deskew window, degrees.
    pub deskew_ceiling: f32,
    /// Worker threads for per-page processing. The pool lives for a single
    /// call only.
    pub worker_threads: usize,
    /// Digest algorithm for the content hash.
    pub hash_algorithm: HashAlgorithm,
}

/// Supported content-hash digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_dpi: DEFAULT_TARGET_DPI,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_pages: DEFAULT_MAX_PAGES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            auto_rotate: true,
            deskew: true,
            denoise: false,
            enhance_contrast: false,
            contrast_factor: DEFAULT_CONTRAST_FACTOR,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            deskew_noise_floor: DESKEW_NOISE_FLOOR_DEGREES,
            deskew_ceiling: DESKEW_CEILING_DEGREES,
            worker_threads: default_worker_threads(),
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
