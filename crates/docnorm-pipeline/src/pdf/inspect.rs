// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural inspection of parsed PDFs: document information dictionary,
// per-page text extraction and the scanned-versus-text-native split.

use docnorm_core::Metadata;
use lopdf::{Document, Object};
use tracing::{debug, warn};

const INFO_KEYS: &[&[u8]] = &[
    b"Title",
    b"Author",
    b"Subject",
    b"Creator",
    b"Producer",
    b"CreationDate",
    b"ModDate",
];

/// Read the document information dictionary from the trailer.
///
/// Missing dictionaries and non-string entries are skipped rather than
/// treated as errors; metadata is best-effort.
pub fn extract_document_metadata(document: &Document) -> Metadata {
    let mut metadata = Metadata::new();
    let Ok(info) = document.trailer.get(b"Info") else {
        return metadata;
    };
    let info = match info {
        Object::Reference(id) => match document.get_object(*id).and_then(Object::as_dict) {
            Ok(dict) => dict,
            Err(_) => return metadata,
        },
        Object::Dictionary(dict) => dict,
        _ => return metadata,
    };
    for key in INFO_KEYS {
        if let Ok(Object::String(bytes, _)) = info.get(key) {
            let value = decode_pdf_string(bytes);
            if !value.is_empty() {
                metadata.insert(String::from_utf8_lossy(key).to_string(), value);
            }
        }
    }
    debug!(fields = metadata.len(), "document metadata extracted");
    metadata
}

/// Extract the text content of a single page.
///
/// Extraction failures are logged and mapped to an empty string; a page
/// whose content stream defeats the extractor is handled the same way as a
/// page with no text at all.
pub fn extract_page_text(document: &Document, page_number: u32) -> String {
    match document.extract_text(&[page_number]) {
        Ok(text) => text,
        Err(err) => {
            warn!(page = page_number, %err, "text extraction failed, treating page as scanned");
            String::new()
        }
    }
}

/// A page with fewer meaningful characters than the threshold is assumed to
/// be a scan (or an image-only page) rather than text-native.
pub fn is_scanned_page(text: &str, min_text_chars: usize) -> bool {
    text.trim().chars().count() < min_text_chars
}

/// PDF text strings are either UTF-16BE with a BOM or byte strings in
/// PDFDocEncoding; the latter is close enough to Latin-1 for metadata.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
