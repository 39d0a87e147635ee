//! sRGB colors and WCAG 2.x luminance / contrast.

use std::fmt;

use thiserror::Error;

/// Minimum contrast for text against its backdrop (WCAG AA, normal text).
pub const MIN_TEXT_CONTRAST: f64 = 4.5;
/// Minimum separation between the tag pill and the canvas background.
pub const MIN_TAG_CONTRAST: f64 = 2.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex color '{0}': expected #rgb or #rrggbb")]
    InvalidHex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (case-insensitive).
    pub fn parse_hex(input: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(input.to_string());
        let digits = input.trim().strip_prefix('#').ok_or_else(invalid)?;
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let mut bytes = [0u8; 3];
        hex::decode_to_slice(&expanded, &mut bytes).map_err(|_| invalid())?;
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    pub fn relative_luminance(self) -> f64 {
        0.2126 * srgb_to_linear(self.r)
            + 0.7152 * srgb_to_linear(self.g)
            + 0.0722 * srgb_to_linear(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `(L1 + 0.05) / (L2 + 0.05)` with `L1 ≥ L2`. Symmetric, in `[1, 21]`.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// Pure black or pure white, whichever contrasts more with `background`.
///
/// The better of the two is always at least √21 ≈ 4.58 : 1.
pub fn black_or_white(background: Rgb) -> Rgb {
    if contrast_ratio(Rgb::BLACK, background) >= contrast_ratio(Rgb::WHITE, background) {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
