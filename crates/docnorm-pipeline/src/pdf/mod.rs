// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

pub mod inspect;
pub mod render;

pub use inspect::{extract_document_metadata, extract_page_text, is_scanned_page};
pub use render::{PageRasterizer, RasterizedPage};
