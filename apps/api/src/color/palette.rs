//! Candidate color sets feeding the harmonizer.

use serde::{Deserialize, Serialize};

use crate::color::contrast::{ColorError, Rgb};

pub const MAX_BACKGROUNDS: usize = 3;
pub const MAX_ACCENTS: usize = 3;
pub const MAX_VIBRANT: usize = 6;

/// Luminance above which a sampled color counts as a background candidate.
const LIGHT_BAND: f64 = 0.8;
/// Luminance below which a sampled color counts as an accent (text) candidate.
const DARK_BAND: f64 = 0.3;

const FALLBACK_BACKGROUNDS: [&str; 3] = ["#ffffff", "#f5f5f7", "#fafaf9"];
const FALLBACK_ACCENTS: [&str; 3] = ["#111111", "#1f2937", "#0f1115"];
const FALLBACK_VIBRANT: [&str; 3] = ["#2563eb", "#e11d48", "#f59e0b"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteSource {
    #[default]
    Predefined,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    #[serde(default)]
    pub source: PaletteSource,
    pub backgrounds: Vec<String>,
    pub accents: Vec<String>,
    #[serde(default)]
    pub vibrant: Vec<String>,
}

impl Palette {
    fn from_static(name: &str, backgrounds: &[&str], accents: &[&str], vibrant: &[&str]) -> Self {
        let owned = |colors: &[&str]| -> Vec<String> { colors.iter().map(|c| c.to_string()).collect() };
        Self {
            name: name.to_string(),
            source: PaletteSource::Predefined,
            backgrounds: owned(backgrounds),
            accents: owned(accents),
            vibrant: owned(vibrant),
        }
    }

    /// Parses every candidate and truncates the lists to their caps.
    pub fn validated(mut self) -> Result<Self, ColorError> {
        self.backgrounds.truncate(MAX_BACKGROUNDS);
        self.accents.truncate(MAX_ACCENTS);
        self.vibrant.truncate(MAX_VIBRANT);
        for color in self.backgrounds.iter().chain(&self.accents).chain(&self.vibrant) {
            Rgb::parse_hex(color)?;
        }
        Ok(self)
    }

    /// Buckets sampled colors by luminance into background / accent / vibrant
    /// candidates. Empty buckets take generic fallbacks.
    pub fn from_dominant_colors(colors: &[String]) -> Self {
        let mut backgrounds = Vec::new();
        let mut accents = Vec::new();
        let mut vibrant = Vec::new();

        for color in colors.iter().filter_map(|c| Rgb::parse_hex(c).ok()) {
            let luminance = color.relative_luminance();
            let bucket = if luminance > LIGHT_BAND {
                &mut backgrounds
            } else if luminance < DARK_BAND {
                &mut accents
            } else {
                &mut vibrant
            };
            bucket.push(color.to_hex());
        }

        let or_fallback = |mut found: Vec<String>, fallback: &[&str], cap: usize| {
            if found.is_empty() {
                found = fallback.iter().map(|c| c.to_string()).collect();
            }
            found.truncate(cap);
            found
        };

        Self {
            name: "image".to_string(),
            source: PaletteSource::Image,
            backgrounds: or_fallback(backgrounds, &FALLBACK_BACKGROUNDS, MAX_BACKGROUNDS),
            accents: or_fallback(accents, &FALLBACK_ACCENTS, MAX_ACCENTS),
            vibrant: or_fallback(vibrant, &FALLBACK_VIBRANT, MAX_VIBRANT),
        }
    }

    pub(crate) fn parsed(colors: &[String]) -> Vec<Rgb> {
        colors.iter().filter_map(|c| Rgb::parse_hex(c).ok()).collect()
    }
}

/// Named light and dark palettes used when no image or caller palette is given.
pub fn catalog() -> Vec<Palette> {
    vec![
        Palette::from_static(
            "paper",
            &["#ffffff", "#faf7f2", "#f4f1ea"],
            &["#111111", "#2b2b2b", "#3d3a36"],
            &["#e4572e", "#2e86ab", "#f3a712", "#29335c"],
        ),
        Palette::from_static(
            "mist",
            &["#f5f7fa", "#e8edf3", "#eef2f7"],
            &["#0f172a", "#1e293b", "#334155"],
            &["#6366f1", "#0ea5e9", "#14b8a6", "#f43f5e"],
        ),
        Palette::from_static(
            "sunrise",
            &["#fff7ed", "#ffedd5", "#fef3c7"],
            &["#431407", "#7c2d12", "#1c1917"],
            &["#ea580c", "#db2777", "#7c3aed", "#059669"],
        ),
        Palette::from_static(
            "forest",
            &["#f0fdf4", "#ecfccb", "#f7fee7"],
            &["#052e16", "#14532d", "#1a2e05"],
            &["#16a34a", "#ca8a04", "#0369a1", "#be123c"],
        ),
        Palette::from_static(
            "midnight",
            &["#0f1115", "#111827", "#18181b"],
            &["#f5f5f7", "#e5e7eb", "#fafafa"],
            &["#38bdf8", "#a78bfa", "#fb7185", "#facc15"],
        ),
        Palette::from_static(
            "ink",
            &["#0b0b0f", "#1c1c22", "#101418"],
            &["#ffffff", "#d4d4d8", "#f1f5f9"],
            &["#22d3ee", "#f97316", "#84cc16", "#e879f9"],
        ),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
