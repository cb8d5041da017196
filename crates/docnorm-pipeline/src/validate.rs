// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format validation — admission checks on untrusted bytes, run before any
// rasterization or encoding work. Operates purely on the in-memory buffer.

use docnorm_core::{NormalizeError, Result, SourceFormat};
use image::DynamicImage;
use lopdf::Document;
use tracing::{debug, warn};

/// A PDF that passed admission checks. The parsed document is handed on so
/// later stages do not re-parse the untrusted input.
#[derive(Debug)]
pub struct ValidatedPdf {
    pub document: Document,
    pub page_count: usize,
}

/// A raster image that passed admission checks.
#[derive(Debug)]
pub struct ValidatedImage {
    pub image: DynamicImage,
    pub format: image::ImageFormat,
}

/// Resolve a declared MIME type to a processing family, rejecting everything
/// outside the supported set before any decoding happens.
pub fn resolve_format(mime_type: &str) -> Result<SourceFormat> {
    SourceFormat::from_mime(mime_type).ok_or_else(|| NormalizeError::UnsupportedFormat {
        detected: mime_type.to_owned(),
    })
}

/// Validate a claimed PDF: parse the container, reject encrypted documents,
/// and enforce the page-count policy.
pub fn validate_pdf(data: &[u8], max_pages: usize) -> Result<ValidatedPdf> {
    let document = match Document::load_mem(data) {
        Ok(document) => document,
        Err(err) => {
            // An encrypted file can fail parsing outright depending on the
            // cipher; it must still be reported as encrypted, not corrupted.
            if contains_encrypt_marker(data) {
                warn!("PDF failed to parse and carries an /Encrypt marker");
                return Err(NormalizeError::EncryptedInput);
            }
            warn!(%err, "PDF container failed to parse");
            return Err(NormalizeError::CorruptedInput(format!(
                "PDF parse failed: {err}"
            )));
        }
    };

    if document.trailer.get(b"Encrypt").is_ok() {
        warn!("PDF trailer carries /Encrypt");
        return Err(NormalizeError::EncryptedInput);
    }

    let page_count = document.get_pages().len();
    debug!(page_count, "PDF admitted");

    if page_count > max_pages {
        return Err(NormalizeError::TooManyPages {
            actual: page_count,
            max: max_pages,
        });
    }

    Ok(ValidatedPdf {
        document,
        page_count,
    })
}

/// Validate a claimed raster image: sniff the container, confirm the format
/// is a supported raster family, and decode it.
pub fn validate_image(data: &[u8]) -> Result<ValidatedImage> {
    let format = image::guess_format(data).map_err(|err| {
        warn!(%err, "image container not recognized");
        NormalizeError::CorruptedInput(format!("unrecognized image container: {err}"))
    })?;

    let mime = format.to_mime_type();
    if !SourceFormat::IMAGE_MIME_TYPES.contains(&mime) {
        return Err(NormalizeError::UnsupportedFormat {
            detected: mime.to_owned(),
        });
    }

    let decoded = image::load_from_memory_with_format(data, format).map_err(|err| {
        warn!(%err, detected = mime, "image decode failed");
        NormalizeError::CorruptedInput(format!("image decode failed: {err}"))
    })?;

    debug!(
        detected = mime,
        width = decoded.width(),
        height = decoded.height(),
        "image admitted"
    );

    Ok(ValidatedImage {
        image: decoded,
        format,
    })
}

/// Cheap scan for the PDF encryption marker, used only when the container
/// itself refuses to parse.
fn contains_encrypt_marker(data: &[u8]) -> bool {
    data.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use lopdf::{Object, dictionary};

    #[test]
    fn garbage_bytes_are_corrupted() {
        let result = validate_pdf(b"definitely not a pdf", 100);
        assert!(matches!(result, Err(NormalizeError::CorruptedInput(_))));
    }

    #[test]
    fn truncated_pdf_is_corrupted() {
        let mut bytes = fixtures::pdf_with_text(2, "truncation test page");
        bytes.truncate(40);
        let result = validate_pdf(&bytes, 100);
        assert!(matches!(result, Err(NormalizeError::CorruptedInput(_))));
    }

    #[test]
    fn valid_pdf_reports_page_count() {
        let bytes = fixtures::pdf_with_text(3, "a perfectly ordinary page");
        let validated = validate_pdf(&bytes, 100).unwrap();
        assert_eq!(validated.page_count, 3);
    }

    #[test]
    fn page_count_over_policy_is_rejected_with_counts() {
        let bytes = fixtures::pdf_with_text(3, "page");
        match validate_pdf(&bytes, 2) {
            Err(NormalizeError::TooManyPages { actual, max }) => {
                assert_eq!(actual, 3);
                assert_eq!(max, 2);
            }
            other => panic!("expected TooManyPages, got {other:?}"),
        }
    }

    #[test]
    fn encrypt_trailer_entry_is_reported_as_encrypted() {
        let mut document = fixtures::pdf_document(1, "secret");
        document.trailer.set(
            "Encrypt",
            Object::Dictionary(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
            }),
        );
        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();

        let result = validate_pdf(&bytes, 100);
        assert!(matches!(result, Err(NormalizeError::EncryptedInput)));
    }

    #[test]
    fn png_bytes_are_admitted() {
        let bytes = fixtures::png_bytes(64, 48);
        let validated = validate_image(&bytes).unwrap();
        assert_eq!(validated.format, image::ImageFormat::Png);
        assert_eq!(validated.image.width(), 64);
        assert_eq!(validated.image.height(), 48);
    }

    #[test]
    fn bmp_payload_is_unsupported_with_detected_mime() {
        let bytes = fixtures::bmp_bytes(16, 16);
        match validate_image(&bytes) {
            Err(NormalizeError::UnsupportedFormat { detected }) => {
                assert_eq!(detected, "image/bmp");
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn truncated_png_is_corrupted() {
        let mut bytes = fixtures::png_bytes(64, 64);
        bytes.truncate(bytes.len() / 2);
        let result = validate_image(&bytes);
        assert!(matches!(result, Err(NormalizeError::CorruptedInput(_))));
    }

    #[test]
    fn unknown_container_is_corrupted() {
        let result = validate_image(&[0u8; 32]);
        assert!(matches!(result, Err(NormalizeError::CorruptedInput(_))));
    }

    #[test]
    fn mime_dispatch_rejects_unsupported_types() {
        match resolve_format("image/bmp") {
            Err(NormalizeError::UnsupportedFormat { detected }) => {
                assert_eq!(detected, "image/bmp");
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert!(matches!(resolve_format("application/pdf"), Ok(SourceFormat::Pdf)));
        assert!(matches!(resolve_format("image/webp"), Ok(SourceFormat::Image)));
    }
}
