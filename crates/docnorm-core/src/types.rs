// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Domain types for normalized documents.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque key/value metadata attached to pages and documents.
///
/// The pipeline only ever adds entries (original dimensions, EXIF tags, PDF
/// info fields); it never interprets them.
pub type Metadata = BTreeMap<String, String>;

/// Input families the pipeline can normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Pdf,
    Image,
}

impl SourceFormat {
    /// MIME types accepted for each family.
    pub const PDF_MIME_TYPES: &'static [&'static str] = &["application/pdf"];
    pub const IMAGE_MIME_TYPES: &'static [&'static str] = &[
        "image/jpeg",
        "image/png",
        "image/webp",
        "image/tiff",
    ];

    /// Map a declared MIME type to a processing family, if supported.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        if Self::PDF_MIME_TYPES.contains(&mime_type) {
            Some(Self::Pdf)
        } else if Self::IMAGE_MIME_TYPES.contains(&mime_type) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Output raster encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Lossy, size-optimized. Used for scanned pages.
    Jpeg,
    /// Lossless, fidelity-preserving. Used for text-native pages.
    Png,
}

impl ImageEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// One rasterized, corrected page of a normalized document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPage {
    /// 1-based position in document reading order.
    pub page_number: u32,
    /// Encoded raster payload; decodes to exactly `width` x `height` pixels.
    pub image_bytes: Vec<u8>,
    pub image_format: ImageEncoding,
    pub width: u32,
    pub height: u32,
    /// Nominal resolution used for normalization, not the source DPI.
    pub dpi: u32,
    /// Embedded text layer, present only when the source carried one and it
    /// is non-empty.
    pub text_content: Option<String>,
    /// True when the page is image-only and needs downstream OCR.
    pub is_scanned: bool,
    pub page_metadata: Metadata,
}

/// The aggregate result of one normalization call.
///
/// Created fresh per invocation and owned exclusively by the caller; the
/// pipeline retains nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub original_filename: String,
    pub declared_mime_type: String,
    /// Hex digest of the original, unmodified input bytes — the stable
    /// deduplication key, independent of any processing configuration.
    pub content_hash: String,
    /// Always equals `pages.len()`.
    pub total_pages: usize,
    /// Sorted by `page_number`, contiguous from 1.
    pub pages: Vec<NormalizedPage>,
    pub document_metadata: Metadata,
    /// Wall-clock time spent inside the pipeline.
    pub processing_duration: Duration,
}
