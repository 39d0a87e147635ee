//! Static glyph-width tables behind the `GlyphMetrics` seam.
//!
//! Character widths are in em units (relative to font size). A single
//! humanist-sans table is scaled per width class; this approximates real
//! shaping closely enough for line-breaking decisions while staying fully
//! deterministic. Hosts with a real shaping backend implement `GlyphMetrics`
//! themselves.
//!
//! The table covers ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Measures rendered text width.
///
/// Implementations must be pure: the same arguments always yield the same
/// width. `LayoutEngine` memoizes results per (family, weight, size, text).
pub trait GlyphMetrics: Send + Sync {
    /// Width in px of `text` set in `family` at `weight` and `size_px`.
    fn measure(&self, family: &str, weight: u16, size_px: f32, text: &str) -> f32;
}

/// Font styling that influences measured width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: String,
    pub weight: u16,
    /// Extra advance after every character, in em.
    pub letter_spacing_em: f32,
}

impl TextStyle {
    pub fn new(family: impl Into<String>, weight: u16) -> Self {
        Self {
            family: family.into(),
            weight,
            letter_spacing_em: 0.0,
        }
    }

    pub fn with_letter_spacing(mut self, letter_spacing_em: f32) -> Self {
        self.letter_spacing_em = letter_spacing_em;
        self
    }

    /// Extra width contributed by letter spacing for `text` at `size_px`.
    pub fn spacing_px(&self, size_px: f32, text: &str) -> f32 {
        self.letter_spacing_em * size_px * text.chars().count() as f32
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Width classes
// ────────────────────────────────────────────────────────────────────────────

/// Coarse proportion class of a font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthClass {
    /// Inter-like humanist sans. The base table.
    Humanist,
    /// Round geometric sans (Poppins, Outfit). Approx. 106% of Inter.
    Geometric,
    /// Condensed display sans (Oswald, Bebas). Approx. 72% of Inter.
    Condensed,
    /// Text serif (Garamond, Georgia). Approx. 88% of Inter.
    Serif,
    /// Fixed advance of 0.6em per glyph.
    Monospace,
}

const FAMILY_CLASSES: &[(&str, WidthClass)] = &[
    ("inter", WidthClass::Humanist),
    ("manrope", WidthClass::Humanist),
    ("plus jakarta sans", WidthClass::Humanist),
    ("dm sans", WidthClass::Humanist),
    ("satoshi", WidthClass::Humanist),
    ("general sans", WidthClass::Humanist),
    ("instrument sans", WidthClass::Humanist),
    ("familjen grotesk", WidthClass::Humanist),
    ("system-ui", WidthClass::Humanist),
    ("sans-serif", WidthClass::Humanist),
    ("poppins", WidthClass::Geometric),
    ("outfit", WidthClass::Geometric),
    ("sora", WidthClass::Geometric),
    ("space grotesk", WidthClass::Geometric),
    ("cal sans", WidthClass::Geometric),
    ("cabinet grotesk", WidthClass::Geometric),
    ("clash display", WidthClass::Geometric),
    ("oswald", WidthClass::Condensed),
    ("bebas neue", WidthClass::Condensed),
    ("anton", WidthClass::Condensed),
    ("eb garamond", WidthClass::Serif),
    ("playfair display", WidthClass::Serif),
    ("merriweather", WidthClass::Serif),
    ("georgia", WidthClass::Serif),
    ("serif", WidthClass::Serif),
    ("jetbrains mono", WidthClass::Monospace),
    ("fira code", WidthClass::Monospace),
    ("ibm plex mono", WidthClass::Monospace),
    ("monospace", WidthClass::Monospace),
];

impl WidthClass {
    /// Looks up the class of the first family in a CSS-style font stack.
    ///
    /// Returns `None` for families without a known table.
    pub fn lookup(family: &str) -> Option<Self> {
        let primary = primary_family(family).to_ascii_lowercase();
        FAMILY_CLASSES
            .iter()
            .find(|(name, _)| *name == primary)
            .map(|(_, class)| *class)
    }

    /// Like `lookup`, falling back to the humanist table.
    pub fn for_family(family: &str) -> Self {
        Self::lookup(family).unwrap_or(WidthClass::Humanist)
    }

    fn scale(self) -> f32 {
        match self {
            WidthClass::Humanist | WidthClass::Monospace => 1.0,
            WidthClass::Geometric => 1.06,
            WidthClass::Condensed => 0.72,
            WidthClass::Serif => 0.88,
        }
    }
}

/// First entry of a font stack such as `"Inter, system-ui, sans-serif"`,
/// without surrounding quotes.
pub fn primary_family(family: &str) -> &str {
    family
        .split(',')
        .next()
        .unwrap_or(family)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

// ────────────────────────────────────────────────────────────────────────────
// Static provider
// ────────────────────────────────────────────────────────────────────────────

/// Table-driven `GlyphMetrics`. The default provider for the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGlyphMetrics;

/// Inter widths at 1em, regular weight.
#[rustfmt::skip]
const HUMANIST_WIDTHS: [f32; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
    // 0     1     2     3     4     5     6     7     8     9
    0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
    // :     ;     <     =     >     ?     @
    0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
    // A     B     C     D     E     F     G     H     I     J     K     L     M
    0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
    // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
    0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
    // [     \     ]     ^     _     `
    0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
    // a     b     c     d     e     f     g     h     i     j     k     l     m
    0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
    // n     o     p     q     r     s     t     u     v     w     x     y     z
    0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
    // {     |     }     ~
    0.33, 0.26, 0.33, 0.59,
];

/// Fallback width for characters outside the ASCII table.
const AVERAGE_CHAR_WIDTH: f32 = 0.52;
const MONOSPACE_ADVANCE: f32 = 0.60;

impl StaticGlyphMetrics {
    /// Width of `text` in em at regular weight for the given class.
    pub fn measure_em(class: WidthClass, text: &str) -> f32 {
        if class == WidthClass::Monospace {
            return text.chars().count() as f32 * MONOSPACE_ADVANCE;
        }
        let raw: f32 = text
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    HUMANIST_WIDTHS[code - 32]
                } else {
                    AVERAGE_CHAR_WIDTH
                }
            })
            .sum();
        raw * class.scale()
    }

    /// Heavier weights set wider: +2.5% per 100 units above regular (400).
    fn weight_factor(weight: u16) -> f32 {
        1.0 + (weight as f32 - 400.0) / 100.0 * 0.025
    }
}

impl GlyphMetrics for StaticGlyphMetrics {
    fn measure(&self, family: &str, weight: u16, size_px: f32, text: &str) -> f32 {
        let class = WidthClass::for_family(family);
        Self::measure_em(class, text) * size_px * Self::weight_factor(weight)
    }
}

/// Fixed-advance metrics for tests: every character is `advance_em` wide.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonoMetrics {
    pub advance_em: f32,
}

#[cfg(test)]
impl Default for MonoMetrics {
    fn default() -> Self {
        Self { advance_em: 0.5 }
    }
}

#[cfg(test)]
impl GlyphMetrics for MonoMetrics {
    fn measure(&self, _family: &str, _weight: u16, size_px: f32, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance_em * size_px
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
