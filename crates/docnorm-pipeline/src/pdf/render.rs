// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page rasterization through the pdfium runtime binding. Pdfium is not
// thread-safe, so a rasterizer renders pages sequentially; parallelism
// belongs to the per-page stages downstream.

use docnorm_core::{NormalizeError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, instrument};

const POINTS_PER_INCH: f32 = 72.0;

/// A page rendered out of a PDF, before correction and encoding.
#[derive(Debug)]
pub struct RasterizedPage {
    /// 1-based page number.
    pub page_number: u32,
    pub image: DynamicImage,
}

/// Renders PDF pages to raster images at a fixed DPI.
pub struct PageRasterizer {
    pdfium: Pdfium,
    target_dpi: u32,
}

impl PageRasterizer {
    /// Bind to the pdfium library, preferring a copy next to the executable
    /// over a system-wide installation.
    pub fn new(target_dpi: u32) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| NormalizeError::Rasterizer(format!("pdfium unavailable: {err}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            target_dpi,
        })
    }

    /// Render every page of a PDF in document order.
    #[instrument(skip_all, fields(bytes = data.len()))]
    pub fn rasterize(&self, data: &[u8]) -> Result<Vec<RasterizedPage>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|err| NormalizeError::CorruptedInput(format!("pdfium rejected document: {err}")))?;

        let scale = self.target_dpi as f32 / POINTS_PER_INCH;
        let mut pages = Vec::with_capacity(document.pages().len() as usize);
        for (index, page) in document.pages().iter().enumerate() {
            let pixel_width = (page.width().value * scale) as i32;
            let pixel_height = (page.height().value * scale) as i32;
            let bitmap = page
                .render_with_config(
                    &PdfRenderConfig::new()
                        .set_target_width(pixel_width)
                        .set_target_height(pixel_height)
                        .render_form_data(true)
                        .render_annotations(true),
                )
                .map_err(|err| {
                    NormalizeError::CorruptedInput(format!(
                        "rendering page {} failed: {err}",
                        index + 1
                    ))
                })?;
            let image = bitmap.as_image();
            debug!(
                page = index + 1,
                width = image.width(),
                height = image.height(),
                "page rasterized"
            );
            pages.push(RasterizedPage {
                page_number: (index + 1) as u32,
                image,
            });
        }
        Ok(pages)
    }
}
