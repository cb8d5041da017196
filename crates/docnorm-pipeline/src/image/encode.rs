// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page encoding — adaptive choice between size-optimized JPEG (scanned
// pages, re-read only by an extraction model that tolerates compression
// artifacts) and lossless PNG (text-native pages, where glyph fidelity
// matters).

use docnorm_core::{ImageEncoding, NormalizeError, PipelineConfig, Result};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

/// Encodes corrected page images for storage and model transmission.
pub struct PageEncoder {
    jpeg_quality: u8,
}

impl PageEncoder {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Encode a page, choosing the output format from its classification.
    pub fn encode(&self, image: &DynamicImage, is_scanned: bool) -> Result<(Vec<u8>, ImageEncoding)> {
        if is_scanned {
            Ok((self.to_jpeg_bytes(image)?, ImageEncoding::Jpeg))
        } else {
            Ok((to_png_bytes(image)?, ImageEncoding::Png))
        }
    }

    /// Encode as JPEG at the configured quality. The buffer is flattened to
    /// RGB first; JPEG has no alpha.
    pub fn to_jpeg_bytes(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| NormalizeError::Image(format!("JPEG encoding failed: {err}")))?;
        debug!(bytes = buffer.len(), quality = self.jpeg_quality, "JPEG encoded");
        Ok(buffer)
    }
}

/// Encode as lossless PNG.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| NormalizeError::Image(format!("PNG encoding failed: {err}")))?;
    debug!(bytes = buffer.len(), "PNG encoded");
    Ok(buffer)
}
