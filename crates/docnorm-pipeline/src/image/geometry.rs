// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry correction — EXIF orientation, color normalization, skew
// estimation/correction, and bounded resizing. Applied per page in a fixed
// order: later steps assume earlier ones already normalized orientation and
// color.

use docnorm_core::PipelineConfig;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::hough::{LineDetectionOptions, detect_lines};
use tracing::{debug, warn};

/// Canny hysteresis thresholds for the skew estimator.
const CANNY_LOW_THRESHOLD: f32 = 50.0;
const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// Images smaller than this on either side carry too few edge pixels for a
/// meaningful line vote; skew estimation is skipped.
const MIN_SKEW_IMAGE_DIM: u32 = 64;

/// What the deskew stage decided for one page. Deskew is a quality
/// enhancement, never a correctness requirement, so every branch passes a
/// usable image through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeskewOutcome {
    /// A corrective rotation of `-angle` degrees was applied.
    Applied { angle: f32 },
    /// The median angle was within estimator noise; not worth resampling.
    BelowNoiseFloor { angle: f32 },
    /// The median angle indicates a real orientation problem outside
    /// deskew's purview; left uncorrected.
    ExceedsCeiling { angle: f32 },
    /// No usable line estimate (image too small, no edges, no lines).
    NoEstimate,
}

/// Shared geometric correction for both document families.
pub struct GeometryCorrector {
    auto_rotate: bool,
    deskew_enabled: bool,
    deskew_noise_floor: f32,
    deskew_ceiling: f32,
    max_dimension: u32,
}

impl GeometryCorrector {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            auto_rotate: config.auto_rotate,
            deskew_enabled: config.deskew,
            deskew_noise_floor: config.deskew_noise_floor,
            deskew_ceiling: config.deskew_ceiling,
            max_dimension: config.max_dimension,
        }
    }

    /// Run the full correction chain: orientation, color normalization,
    /// deskew, resize.
    pub fn correct(&self, image: DynamicImage, exif_orientation: Option<u32>) -> DynamicImage {
        let image = if self.auto_rotate {
            apply_orientation(image, exif_orientation)
        } else {
            image
        };

        let image = normalize_color(image);

        let image = if self.deskew_enabled {
            let (image, outcome) = self.deskew(image);
            match outcome {
                DeskewOutcome::Applied { angle } => {
                    debug!(angle, "skew corrected");
                }
                DeskewOutcome::BelowNoiseFloor { angle } => {
                    debug!(angle, "skew within noise floor, left unrotated");
                }
                DeskewOutcome::ExceedsCeiling { angle } => {
                    warn!(angle, "skew exceeds deskew ceiling, left uncorrected");
                }
                DeskewOutcome::NoEstimate => {
                    debug!("no skew estimate, image passed through");
                }
            }
            image
        } else {
            image
        };

        self.resize(image)
    }

    /// Estimate the dominant skew angle and rotate only when it falls inside
    /// the corrective window.
    pub fn deskew(&self, image: DynamicImage) -> (DynamicImage, DeskewOutcome) {
        let Some(angle) = estimate_skew_angle(&image.to_luma8()) else {
            return (image, DeskewOutcome::NoEstimate);
        };

        let outcome = self.evaluate_angle(angle);
        match outcome {
            DeskewOutcome::Applied { .. } => {
                // The estimate is the clockwise tilt of the content, so the
                // correction rotates counter-clockwise by the same amount.
                let corrected = rotate_preserving_color(image, -angle.to_radians());
                (corrected, outcome)
            }
            _ => (image, outcome),
        }
    }

    /// Pure decision on an estimated angle against the corrective window.
    pub fn evaluate_angle(&self, angle: f32) -> DeskewOutcome {
        let magnitude = angle.abs();
        if magnitude <= self.deskew_noise_floor {
            DeskewOutcome::BelowNoiseFloor { angle }
        } else if magnitude >= self.deskew_ceiling {
            DeskewOutcome::ExceedsCeiling { angle }
        } else {
            DeskewOutcome::Applied { angle }
        }
    }

    /// Scale down so the larger dimension equals the configured maximum.
    /// Never upscales; both axes use the identical factor, rounded
    /// independently.
    fn resize(&self, image: DynamicImage) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        let max_dim = width.max(height);
        if max_dim <= self.max_dimension {
            return image;
        }

        let scale = self.max_dimension as f32 / max_dim as f32;
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        debug!(
            from_w = width,
            from_h = height,
            new_width,
            new_height,
            "resizing oversized page"
        );
        image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    }
}

/// Map an EXIF orientation value to the rotation needed to display the image
/// upright. Values 3, 6, and 8 are rotations; everything else (including the
/// mirrored variants) is a no-op. The canvas expands to fit.
fn apply_orientation(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(3) => image.rotate180(),
        Some(6) => image.rotate90(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

/// Normalize to a single consistent color model: three-channel RGB or
/// single-channel greyscale. Alpha is composited onto an opaque white
/// background before being dropped, so transparent regions do not turn black
/// downstream.
fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image {
        keep @ (DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => keep,
        other => DynamicImage::ImageRgb8(flatten_onto_white(&other.to_rgba8())),
    }
}

fn flatten_onto_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let a = a as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * a + 255 * (255 - a)) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Estimate the dominant skew angle in degrees via edge detection and a
/// Hough line vote. Positive values mean the content is tilted clockwise.
///
/// Returns `None` when the image is too small or no lines clear the vote
/// threshold.
pub fn estimate_skew_angle(gray: &GrayImage) -> Option<f32> {
    let (width, height) = gray.dimensions();
    if width < MIN_SKEW_IMAGE_DIM || height < MIN_SKEW_IMAGE_DIM {
        return None;
    }

    let edges = canny(gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);

    // Vote threshold scales with the image diagonal so detection behaves
    // consistently across resolutions; the floor keeps tiny images from
    // producing spurious lines.
    let diagonal = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
    let options = LineDetectionOptions {
        vote_threshold: (diagonal * 0.1).max(100.0) as u32,
        suppression_radius: 8,
    };
    let lines = detect_lines(&edges, options);
    if lines.is_empty() {
        return None;
    }

    // Median over all detected lines: robust to outlier lines from
    // non-text graphics.
    let mut angles: Vec<f32> = lines
        .iter()
        .map(|line| line.angle_in_degrees as f32 - 90.0)
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = angles.len() / 2;
    let median = if angles.len() % 2 == 0 {
        (angles[mid - 1] + angles[mid]) / 2.0
    } else {
        angles[mid]
    };
    debug!(line_count = lines.len(), median, "skew estimated");
    Some(median)
}

/// Rotate about the center with bicubic interpolation, preserving the color
/// model established by [`normalize_color`]. White fill keeps the exposed
/// border consistent with a document background.
fn rotate_preserving_color(image: DynamicImage, theta: f32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(rotate_about_center(
            &gray,
            theta,
            Interpolation::Bicubic,
            Luma([255u8]),
        )),
        other => {
            let rgb = other.to_rgb8();
            DynamicImage::ImageRgb8(rotate_about_center(
                &rgb,
                theta,
                Interpolation::Bicubic,
                Rgb([255u8, 255, 255]),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use imageproc::drawing::draw_line_segment_mut;

    fn corrector() -> GeometryCorrector {
        GeometryCorrector::from_config(&PipelineConfig::default())
    }

    /// A white page with several thick parallel dark lines tilted by
    /// `degrees` (positive = clockwise).
    fn lined_page(degrees: f32) -> GrayImage {
        let mut img = GrayImage::from_pixel(400, 400, Luma([255u8]));
        let slope = degrees.to_radians().tan();
        for y_base in [80.0f32, 160.0, 240.0, 320.0] {
            for thickness in 0..3 {
                let y = y_base + thickness as f32;
                draw_line_segment_mut(
                    &mut img,
                    (20.0, y),
                    (380.0, y + 360.0 * slope),
                    Luma([0u8]),
                );
            }
        }
        img
    }

    #[test]
    fn orientation_six_rotates_quarter_turn() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
        let rotated = apply_orientation(img, Some(6));
        assert_eq!((rotated.width(), rotated.height()), (20, 40));
    }

    #[test]
    fn orientation_three_keeps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
        let rotated = apply_orientation(img, Some(3));
        assert_eq!((rotated.width(), rotated.height()), (40, 20));
    }

    #[test]
    fn unknown_orientation_is_a_no_op() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
        let out = apply_orientation(img.clone(), Some(2));
        assert_eq!(out.to_rgb8(), img.to_rgb8());
        let out = apply_orientation(img.clone(), None);
        assert_eq!(out.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn transparent_pixels_become_white_not_black() {
        let mut rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 1, Rgba([200, 0, 0, 128]));
        let normalized = normalize_color(DynamicImage::ImageRgba8(rgba));

        let rgb = match normalized {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => panic!("expected Rgb8, got {other:?}"),
        };
        // Fully transparent black composites to pure white.
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
        // Half-transparent red blends toward white.
        assert_eq!(*rgb.get_pixel(1, 1), Rgb([227, 127, 127]));
    }

    #[test]
    fn greyscale_and_rgb_pass_color_normalization_unchanged() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 5, Luma([90u8])));
        assert!(matches!(normalize_color(gray), DynamicImage::ImageLuma8(_)));
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([1, 2, 3])));
        assert!(matches!(normalize_color(rgb), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn angle_window_below_noise_floor() {
        assert_eq!(
            corrector().evaluate_angle(0.2),
            DeskewOutcome::BelowNoiseFloor { angle: 0.2 }
        );
        assert_eq!(
            corrector().evaluate_angle(-0.4),
            DeskewOutcome::BelowNoiseFloor { angle: -0.4 }
        );
    }

    #[test]
    fn angle_window_accepts_small_real_skew() {
        assert_eq!(
            corrector().evaluate_angle(3.0),
            DeskewOutcome::Applied { angle: 3.0 }
        );
        assert_eq!(
            corrector().evaluate_angle(-3.0),
            DeskewOutcome::Applied { angle: -3.0 }
        );
    }

    #[test]
    fn angle_window_rejects_large_rotations() {
        assert_eq!(
            corrector().evaluate_angle(15.0),
            DeskewOutcome::ExceedsCeiling { angle: 15.0 }
        );
    }

    #[test]
    fn angle_window_boundaries_are_exclusive() {
        assert_eq!(
            corrector().evaluate_angle(0.5),
            DeskewOutcome::BelowNoiseFloor { angle: 0.5 }
        );
        assert_eq!(
            corrector().evaluate_angle(10.0),
            DeskewOutcome::ExceedsCeiling { angle: 10.0 }
        );
    }

    #[test]
    fn skew_estimate_finds_three_degree_tilt() {
        let angle = estimate_skew_angle(&lined_page(3.0)).expect("should detect lines");
        assert!(
            (angle - 3.0).abs() < 1.5,
            "expected ~3.0 degrees, got {angle}"
        );
    }

    #[test]
    fn skew_estimate_near_zero_for_straight_lines() {
        let angle = estimate_skew_angle(&lined_page(0.0)).expect("should detect lines");
        assert!(angle.abs() < 1.0, "expected ~0 degrees, got {angle}");
    }

    #[test]
    fn skew_estimate_skips_tiny_images() {
        let tiny = GrayImage::from_pixel(32, 32, Luma([128u8]));
        assert_eq!(estimate_skew_angle(&tiny), None);
    }

    #[test]
    fn blank_image_yields_no_estimate() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, Luma([255u8])));
        let (out, outcome) = corrector().deskew(blank);
        assert_eq!(outcome, DeskewOutcome::NoEstimate);
        assert_eq!((out.width(), out.height()), (200, 200));
    }

    #[test]
    fn deskew_straightens_a_tilted_page() {
        let page = DynamicImage::ImageLuma8(lined_page(3.0));
        let (corrected, outcome) = corrector().deskew(page);

        match outcome {
            DeskewOutcome::Applied { angle } => {
                assert!((angle - 3.0).abs() < 1.5, "estimated {angle}")
            }
            other => panic!("expected Applied, got {other:?}"),
        }

        // Re-estimating on the corrected image should land near zero.
        let residual = estimate_skew_angle(&corrected.to_luma8());
        if let Some(residual) = residual {
            assert!(residual.abs() < 1.0, "residual skew {residual}");
        }
    }

    #[test]
    fn oversized_images_scale_to_the_max_dimension() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4000, 2000));
        let out = corrector().resize(img);
        assert_eq!((out.width(), out.height()), (2000, 1000));
    }

    #[test]
    fn resize_rounds_each_axis_independently() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(3000, 1000));
        let out = corrector().resize(img);
        assert_eq!((out.width(), out.height()), (2000, 667));
    }

    #[test]
    fn small_images_are_never_upscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 50));
        let out = corrector().resize(img);
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn full_correction_bounds_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2500, 1500, Rgb([240, 240, 240])));
        let out = corrector().correct(img, None);
        assert!(out.width().max(out.height()) <= 2000);
    }
}
