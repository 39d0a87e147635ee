//! Dominant-color extraction from a decoded bitmap.

use std::collections::HashMap;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::color::contrast::Rgb;
use crate::color::palette::Palette;

/// Long edge after downsampling.
const SAMPLE_EDGE: u32 = 100;
const PIXEL_STRIDE: usize = 4;
const MIN_ALPHA: u8 = 128;
const QUANTUM: f32 = 20.0;
const TOP_COLORS: usize = 8;

fn quantize(channel: u8) -> u8 {
    ((f32::from(channel) / QUANTUM).round() * QUANTUM).min(255.0) as u8
}

/// The most frequent quantized colors as `#rrggbb`, most frequent first.
///
/// Ties are broken by ascending color value so the result is deterministic.
pub fn dominant_colors(image: &DynamicImage) -> Vec<String> {
    let (width, height) = image.dimensions();
    let sampled = if width.max(height) > SAMPLE_EDGE {
        image.resize(SAMPLE_EDGE, SAMPLE_EDGE, FilterType::Triangle)
    } else {
        image.clone()
    };

    let mut counts: HashMap<Rgb, u32> = HashMap::new();
    for pixel in sampled.to_rgba8().pixels().step_by(PIXEL_STRIDE) {
        let [r, g, b, a] = pixel.0;
        if a < MIN_ALPHA {
            continue;
        }
        *counts
            .entry(Rgb::new(quantize(r), quantize(g), quantize(b)))
            .or_insert(0) += 1;
    }

    let mut ranked: Vec<(Rgb, u32)> = counts.into_iter().collect();
    ranked.sort_by(|(ca, na), (cb, nb)| nb.cmp(na).then(ca.cmp(cb)));
    ranked
        .into_iter()
        .take(TOP_COLORS)
        .map(|(color, _)| color.to_hex())
        .collect()
}

/// Dominant colors bucketed into an image palette.
pub fn image_palette(image: &DynamicImage) -> Palette {
    Palette::from_dominant_colors(&dominant_colors(image))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
