// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestration. Stages run in a fixed order: hash, format
// dispatch, validation, rasterization (PDF only), geometry correction,
// enhancement, classification, encoding. Rasterization is sequential
// because pdfium is not thread-safe; the per-page stages after it run on a
// bounded rayon pool.

use std::io::Read;
use std::time::Instant;

use docnorm_core::{
    Metadata, NormalizeError, NormalizedDocument, NormalizedPage, PipelineConfig, Result,
    SourceFormat,
};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::image::{Enhancer, GeometryCorrector, PageEncoder, metadata};
use crate::pdf::{self, PageRasterizer, RasterizedPage};
use crate::{hash, validate};

/// The normalization pipeline. Construct once per configuration and reuse
/// across documents; `normalize` takes `&self` and holds no mutable state.
pub struct DocumentPipeline {
    config: PipelineConfig,
    geometry: GeometryCorrector,
    enhancer: Enhancer,
    encoder: PageEncoder,
}

impl DocumentPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            geometry: GeometryCorrector::from_config(&config),
            enhancer: Enhancer::from_config(&config),
            encoder: PageEncoder::from_config(&config),
            config,
        }
    }

    /// Normalize a document held in memory.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn normalize(
        &self,
        data: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<NormalizedDocument> {
        let started = Instant::now();
        // Hash the bytes as received, before any decoding touches them.
        let content_hash = hash::hash_bytes(self.config.hash_algorithm, data);

        let format = validate::resolve_format(mime_type)?;
        let (pages, document_metadata) = match format {
            SourceFormat::Pdf => self.normalize_pdf(data)?,
            SourceFormat::Image => self.normalize_image(data)?,
        };

        let document = NormalizedDocument {
            original_filename: filename.to_owned(),
            declared_mime_type: mime_type.to_owned(),
            content_hash,
            total_pages: pages.len(),
            pages,
            document_metadata,
            processing_duration: started.elapsed(),
        };
        info!(
            pages = document.total_pages,
            elapsed_ms = document.processing_duration.as_millis() as u64,
            "document normalized"
        );
        Ok(document)
    }

    /// Normalize a document from a reader. The input is buffered in full;
    /// every downstream stage needs random access to the bytes.
    pub fn normalize_reader<R: Read>(
        &self,
        reader: &mut R,
        filename: &str,
        mime_type: &str,
    ) -> Result<NormalizedDocument> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.normalize(&data, filename, mime_type)
    }

    fn normalize_pdf(&self, data: &[u8]) -> Result<(Vec<NormalizedPage>, Metadata)> {
        // Structural validation runs before the rasterizer binds, so
        // corrupted and oversized inputs are rejected without pdfium.
        let validated = validate::validate_pdf(data, self.config.max_pages)?;
        let document_metadata = pdf::extract_document_metadata(&validated.document);

        let rasterizer = PageRasterizer::new(self.config.target_dpi)?;
        let rasterized = rasterizer.rasterize(data)?;
        ensure_consistent_page_count(validated.page_count, rasterized.len())?;

        let inputs: Vec<(RasterizedPage, String)> = rasterized
            .into_iter()
            .map(|page| {
                let text = pdf::extract_page_text(&validated.document, page.page_number);
                (page, text)
            })
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()
            .map_err(|err| NormalizeError::Internal(format!("worker pool: {err}")))?;
        let mut pages = pool.install(|| {
            inputs
                .into_par_iter()
                .map(|(page, text)| self.finish_page(page, text))
                .collect::<Result<Vec<_>>>()
        })?;
        pages.sort_by_key(|page| page.page_number);
        Ok((pages, document_metadata))
    }

    /// Correct, classify and encode one rasterized PDF page.
    fn finish_page(&self, page: RasterizedPage, text: String) -> Result<NormalizedPage> {
        let is_scanned = pdf::is_scanned_page(&text, self.config.min_text_chars);
        // Raster dimensions before any correction, preserved alongside the
        // corrected output.
        let mut page_metadata = Metadata::new();
        page_metadata.insert("original_width".to_owned(), page.image.width().to_string());
        page_metadata.insert("original_height".to_owned(), page.image.height().to_string());
        let corrected = self.geometry.correct(page.image, None);
        let enhanced = self.enhancer.enhance(corrected);
        let (width, height) = (enhanced.width(), enhanced.height());
        let (image_bytes, image_format) = self.encoder.encode(&enhanced, is_scanned)?;
        Ok(NormalizedPage {
            page_number: page.page_number,
            image_bytes,
            image_format,
            width,
            height,
            dpi: self.config.target_dpi,
            text_content: if text.trim().is_empty() { None } else { Some(text) },
            is_scanned,
            page_metadata,
        })
    }

    fn normalize_image(&self, data: &[u8]) -> Result<(Vec<NormalizedPage>, Metadata)> {
        let validated = validate::validate_image(data)?;
        let orientation = metadata::read_orientation(data);
        let document_metadata = metadata::extract_exif_fields(data);

        let page_metadata = image_page_metadata(
            validated.format,
            validated.image.width(),
            validated.image.height(),
            &document_metadata,
        );

        let corrected = self.geometry.correct(validated.image, orientation);
        let enhanced = self.enhancer.enhance(corrected);
        let (width, height) = (enhanced.width(), enhanced.height());
        // Standalone images have no text layer; they are always treated as
        // scans and JPEG-encoded.
        let (image_bytes, image_format) = self.encoder.encode(&enhanced, true)?;

        let page = NormalizedPage {
            page_number: 1,
            image_bytes,
            image_format,
            width,
            height,
            dpi: self.config.target_dpi,
            text_content: None,
            is_scanned: true,
            page_metadata,
        };
        Ok((vec![page], document_metadata))
    }
}

/// The page count admitted by the validator and the count the renderer
/// produced must agree; a divergence means the two parsers read the page
/// tree differently and the output would not match what was validated.
fn ensure_consistent_page_count(reported: usize, rendered: usize) -> Result<()> {
    if reported != rendered {
        return Err(NormalizeError::Internal(format!(
            "page count mismatch: validator reported {reported}, renderer produced {rendered}"
        )));
    }
    Ok(())
}

/// Page-level metadata for an image input: the source container and
/// pre-correction dimensions, plus a copy of the EXIF tag dump so consumers
/// reading only pages still see the source EXIF.
fn image_page_metadata(
    format: image::ImageFormat,
    width: u32,
    height: u32,
    exif_fields: &Metadata,
) -> Metadata {
    let mut page_metadata = exif_fields.clone();
    page_metadata.insert("original_format".to_owned(), format.to_mime_type().to_owned());
    page_metadata.insert("original_width".to_owned(), width.to_string());
    page_metadata.insert("original_height".to_owned(), height.to_string());
    page_metadata
}
