// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optional enhancement — non-local-means-style denoising and midpoint
// contrast stretching. Both steps are best-effort quality improvements and
// composable; denoise runs before contrast so stretching does not amplify
// residual noise.

use docnorm_core::PipelineConfig;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use tracing::debug;

/// Patch radius for the similarity comparison (3x3 patches).
const NLM_PATCH_RADIUS: i64 = 1;
/// Search window radius around each pixel (11x11 window).
const NLM_SEARCH_RADIUS: i64 = 5;
/// Filtering strength; larger values smooth more aggressively.
const NLM_FILTER_STRENGTH: f32 = 10.0;

/// Configurable best-effort image enhancement.
pub struct Enhancer {
    denoise: bool,
    enhance_contrast: bool,
    contrast_factor: f32,
}

impl Enhancer {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            denoise: config.denoise,
            enhance_contrast: config.enhance_contrast,
            contrast_factor: config.contrast_factor,
        }
    }

    /// Apply the enabled enhancement steps. Disabled steps pass the buffer
    /// through untouched.
    pub fn enhance(&self, image: DynamicImage) -> DynamicImage {
        let image = if self.denoise {
            debug!("applying non-local-means denoise");
            denoise(image)
        } else {
            image
        };

        if self.enhance_contrast {
            debug!(factor = self.contrast_factor, "applying contrast stretch");
            stretch_contrast(image, self.contrast_factor)
        } else {
            image
        }
    }
}

/// Non-local-means-style denoise: each pixel becomes a weighted average of
/// the pixels in a bounded search window, weighted by the similarity of
/// their surrounding patches. Greyscale and RGB buffers are handled in their
/// own color model; anything else is routed through RGB.
fn denoise(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(denoise_gray(&gray)),
        other => DynamicImage::ImageRgb8(denoise_rgb(&other.to_rgb8())),
    }
}

fn denoise_gray(input: &GrayImage) -> GrayImage {
    let (width, height) = input.dimensions();
    let sample = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, width as i64 - 1) as u32;
        let y = y.clamp(0, height as i64 - 1) as u32;
        input.get_pixel(x, y).0[0] as f32
    };

    GrayImage::from_fn(width, height, |cx, cy| {
        let value = nlm_pixel(cx as i64, cy as i64, |x, y| [sample(x, y)]);
        Luma([value[0].round().clamp(0.0, 255.0) as u8])
    })
}

fn denoise_rgb(input: &RgbImage) -> RgbImage {
    let (width, height) = input.dimensions();
    let sample = |x: i64, y: i64| -> [f32; 3] {
        let x = x.clamp(0, width as i64 - 1) as u32;
        let y = y.clamp(0, height as i64 - 1) as u32;
        let Rgb([r, g, b]) = *input.get_pixel(x, y);
        [r as f32, g as f32, b as f32]
    };

    RgbImage::from_fn(width, height, |cx, cy| {
        let value = nlm_pixel(cx as i64, cy as i64, sample);
        Rgb([
            value[0].round().clamp(0.0, 255.0) as u8,
            value[1].round().clamp(0.0, 255.0) as u8,
            value[2].round().clamp(0.0, 255.0) as u8,
        ])
    })
}

/// Weighted average over the search window centred on (cx, cy). The weight
/// of each candidate is derived from the mean squared distance between its
/// patch and the centre patch.
fn nlm_pixel<const C: usize>(
    cx: i64,
    cy: i64,
    sample: impl Fn(i64, i64) -> [f32; C],
) -> [f32; C] {
    let strength_sq = NLM_FILTER_STRENGTH * NLM_FILTER_STRENGTH;
    let mut accum = [0.0f32; C];
    let mut weight_sum = 0.0f32;
    let mut max_weight = 0.0f32;

    for wy in (cy - NLM_SEARCH_RADIUS)..=(cy + NLM_SEARCH_RADIUS) {
        for wx in (cx - NLM_SEARCH_RADIUS)..=(cx + NLM_SEARCH_RADIUS) {
            if wx == cx && wy == cy {
                continue;
            }
            let distance = patch_distance(cx, cy, wx, wy, &sample);
            let weight = (-distance / strength_sq).exp();
            max_weight = max_weight.max(weight);

            let candidate = sample(wx, wy);
            for channel in 0..C {
                accum[channel] += candidate[channel] * weight;
            }
            weight_sum += weight;
        }
    }

    // The centre pixel participates with the largest weight observed among
    // the other candidates, so an isolated impulse cannot dominate its own
    // average.
    let centre_weight = if max_weight > 0.0 { max_weight } else { 1.0 };
    let centre = sample(cx, cy);
    for channel in 0..C {
        accum[channel] += centre[channel] * centre_weight;
    }
    weight_sum += centre_weight;

    for channel in 0..C {
        accum[channel] /= weight_sum;
    }
    accum
}

/// Mean squared difference between the patches centred on (ax, ay) and
/// (bx, by), averaged across channels.
fn patch_distance<const C: usize>(
    ax: i64,
    ay: i64,
    bx: i64,
    by: i64,
    sample: &impl Fn(i64, i64) -> [f32; C],
) -> f32 {
    let mut total = 0.0f32;
    let mut count = 0u32;

    for dy in -NLM_PATCH_RADIUS..=NLM_PATCH_RADIUS {
        for dx in -NLM_PATCH_RADIUS..=NLM_PATCH_RADIUS {
            let a = sample(ax + dx, ay + dy);
            let b = sample(bx + dx, by + dy);
            for channel in 0..C {
                let diff = a[channel] - b[channel];
                total += diff * diff;
                count += 1;
            }
        }
    }

    total / count as f32
}

/// Midpoint contrast stretch: values move away from 128 by `factor`. A
/// factor of 1.0 is a no-op.
fn stretch_contrast(image: DynamicImage, factor: f32) -> DynamicImage {
    let adjust = move |channel: u8| -> u8 {
        (factor * (channel as f32 - 128.0) + 128.0).clamp(0.0, 255.0) as u8
    };

    match image {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, y| {
                Luma([adjust(gray.get_pixel(x, y).0[0])])
            }))
        }
        other => {
            let rgb = other.to_rgb8();
            let (w, h) = rgb.dimensions();
            DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
                let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
                Rgb([adjust(r), adjust(g), adjust(b)])
            }))
        }
    }
}
