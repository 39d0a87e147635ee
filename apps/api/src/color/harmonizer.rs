//! Contrast-safe color schemes.
//!
//! Every scheme produced here satisfies:
//! - `contrast(text, background) ≥ 4.5`
//! - `contrast(tag_text, tag_background) ≥ 4.5`
//! - `contrast(tag_background, background) ≥ 2.0`
//!
//! The black/white fallback makes each check infallible.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::contrast::{
    black_or_white, contrast_ratio, Rgb, MIN_TAG_CONTRAST, MIN_TEXT_CONTRAST,
};
use crate::color::palette::{catalog, Palette};
use crate::layout::request::{ColorFields, ParsedColors};

pub const DARK_BACKGROUND: Rgb = Rgb::new(0x0f, 0x11, 0x15);
pub const DARK_TEXT: Rgb = Rgb::new(0xf5, 0xf5, 0xf7);
pub const DEFAULT_DARK_THEME_PROBABILITY: f64 = 0.3;

/// Resolved colors for one composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    pub tag_background: String,
    pub tag_text: String,
    /// Spare palette color not used by the other roles.
    pub accent: String,
    pub palette: String,
}

impl ColorScheme {
    pub fn fields(&self) -> ColorFields {
        ColorFields {
            background: self.background.clone(),
            text: self.text.clone(),
            tag_background: self.tag_background.clone(),
            tag_text: self.tag_text.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Harmonizer {
    dark_theme_probability: f64,
    catalog: Vec<Palette>,
}

impl Default for Harmonizer {
    fn default() -> Self {
        Self::new(DEFAULT_DARK_THEME_PROBABILITY)
    }
}

impl Harmonizer {
    pub fn new(dark_theme_probability: f64) -> Self {
        let probability = if dark_theme_probability.is_finite() {
            dark_theme_probability.clamp(0.0, 1.0)
        } else {
            DEFAULT_DARK_THEME_PROBABILITY
        };
        Self {
            dark_theme_probability: probability,
            catalog: catalog(),
        }
    }

    pub fn dark_theme_probability(&self) -> f64 {
        self.dark_theme_probability
    }

    pub fn catalog(&self) -> &[Palette] {
        &self.catalog
    }

    /// Random scheme from `palette`, or from a uniformly picked catalog palette.
    pub fn harmonize<R: Rng + ?Sized>(&self, palette: Option<&Palette>, rng: &mut R) -> ColorScheme {
        let palette = match palette {
            Some(p) => p,
            None => self.catalog.choose(rng).unwrap_or(&self.catalog[0]),
        };

        let backgrounds = Palette::parsed(&palette.backgrounds);
        let accents = Palette::parsed(&palette.accents);
        let vibrant = Palette::parsed(&palette.vibrant);

        let mut background = backgrounds.choose(rng).copied().unwrap_or(Rgb::WHITE);
        let mut text = accents
            .choose(rng)
            .copied()
            .unwrap_or_else(|| black_or_white(background));
        if contrast_ratio(text, background) < MIN_TEXT_CONTRAST {
            text = black_or_white(background);
        }

        let dark = rng.gen_bool(self.dark_theme_probability);
        if dark {
            background = DARK_BACKGROUND;
            text = DARK_TEXT;
        }

        let candidates: Vec<Rgb> = vibrant.choose_multiple(rng, 2).copied().collect();
        let tag_background = separated_tag(&candidates, background);
        let tag_text = legible_on(text, tag_background);

        debug!(palette = %palette.name, dark, "Harmonized color scheme");
        scheme(palette, &accents, background, text, tag_background, tag_text)
    }

    /// Enforces the contrast invariants on caller-chosen colors.
    ///
    /// Text colors failing 4.5 : 1 become black or white. A tag background
    /// failing 2.0 : 1 against the background is replaced by the first
    /// passing vibrant candidate of `palette`, then black or white.
    pub fn reconcile(&self, requested: &ParsedColors, palette: Option<&Palette>) -> ColorScheme {
        let palette = palette.unwrap_or(&self.catalog[0]);
        let accents = Palette::parsed(&palette.accents);
        let background = requested.background;
        let text = legible_on(requested.text, background);

        let tag_background = if contrast_ratio(requested.tag_background, background) >= MIN_TAG_CONTRAST {
            requested.tag_background
        } else {
            separated_tag(&Palette::parsed(&palette.vibrant), background)
        };
        let tag_text = legible_on(requested.tag_text, tag_background);

        scheme(palette, &accents, background, text, tag_background, tag_text)
    }
}

/// First candidate separating from `background`, else black or white.
fn separated_tag(candidates: &[Rgb], background: Rgb) -> Rgb {
    candidates
        .iter()
        .copied()
        .find(|c| contrast_ratio(*c, background) >= MIN_TAG_CONTRAST)
        .unwrap_or_else(|| black_or_white(background))
}

fn legible_on(color: Rgb, backdrop: Rgb) -> Rgb {
    if contrast_ratio(color, backdrop) >= MIN_TEXT_CONTRAST {
        color
    } else {
        black_or_white(backdrop)
    }
}

fn scheme(
    palette: &Palette,
    accents: &[Rgb],
    background: Rgb,
    text: Rgb,
    tag_background: Rgb,
    tag_text: Rgb,
) -> ColorScheme {
    let accent = accents
        .iter()
        .copied()
        .find(|a| *a != text && *a != background && *a != tag_background)
        .unwrap_or(tag_background);
    ColorScheme {
        background: background.to_hex(),
        text: text.to_hex(),
        tag_background: tag_background.to_hex(),
        tag_text: tag_text.to_hex(),
        accent: accent.to_hex(),
        palette: palette.name.clone(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
