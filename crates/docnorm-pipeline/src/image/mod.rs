// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — geometry correction (orientation, color, deskew, resize),
// optional enhancement, EXIF metadata, and page encoding.

pub mod encode;
pub mod enhance;
pub mod geometry;
pub mod metadata;

pub use encode::PageEncoder;
pub use enhance::Enhancer;
pub use geometry::{DeskewOutcome, GeometryCorrector};
