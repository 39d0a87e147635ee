//! The engine's input contract and its boundary validation.

use serde::{Deserialize, Serialize};

use crate::color::contrast::{ColorError, Rgb};
use crate::errors::AppError;
use crate::layout::font_metrics::TextStyle;
use crate::layout::grid::template_by_name;
use crate::layout::pattern::PatternChoice;

pub const MIN_DIMENSION: u32 = 320;
pub const MAX_DIMENSION: u32 = 8000;

// ────────────────────────────────────────────────────────────────────────────
// Option enums
// ────────────────────────────────────────────────────────────────────────────

/// Whether the image respects the canvas padding or bleeds to its anchored edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePadding {
    #[default]
    Layout,
    Fill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoPosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPosition {
    #[default]
    Above,
    Below,
}

/// Small / medium / large, used by logo and tag sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementSize {
    S,
    #[default]
    M,
    L,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingMode {
    #[default]
    Auto,
    Explicit { horizontal: u32, vertical: u32 },
}

/// Which placement engine handles the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Box solver with the deterministic pattern rule. Cached.
    #[default]
    Fixed,
    /// Box solver; `auto` patterns are drawn from aspect-banded odds.
    Shuffled,
    /// Golden-ratio grid templates.
    Grid,
}

// ────────────────────────────────────────────────────────────────────────────
// Colors
// ────────────────────────────────────────────────────────────────────────────

/// Caller-supplied hex colors, validated at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorFields {
    pub background: String,
    pub text: String,
    pub tag_background: String,
    pub tag_text: String,
}

impl Default for ColorFields {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            tag_background: "#111111".to_string(),
            tag_text: "#ffffff".to_string(),
        }
    }
}

/// `ColorFields` after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedColors {
    pub background: Rgb,
    pub text: Rgb,
    pub tag_background: Rgb,
    pub tag_text: Rgb,
}

impl ColorFields {
    pub fn parse(&self) -> Result<ParsedColors, ColorError> {
        Ok(ParsedColors {
            background: Rgb::parse_hex(&self.background)?,
            text: Rgb::parse_hex(&self.text)?,
            tag_background: Rgb::parse_hex(&self.tag_background)?,
            tag_text: Rgb::parse_hex(&self.tag_text)?,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// Everything needed to lay out one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutRequest {
    pub width: u32,
    pub height: u32,
    pub headline: String,
    pub sub: String,
    pub font_family: String,
    /// Distinct sub-line family (font pairing). Falls back to `font_family`.
    pub sub_font_family: Option<String>,
    pub headline_weight: u16,
    pub sub_weight: u16,
    pub headline_letter_spacing: f32,
    pub sub_letter_spacing: f32,
    pub headline_line_height: f32,
    pub sub_line_height: f32,
    pub image: Option<String>,
    pub pattern: PatternChoice,
    pub image_rounded: bool,
    pub image_padding: ImagePadding,
    pub logo: Option<String>,
    pub logo_position: LogoPosition,
    pub logo_size: ElementSize,
    pub tag: Option<String>,
    pub tag_position: TagPosition,
    pub tag_size: ElementSize,
    pub padding: PaddingMode,
    pub center_align: bool,
    pub colors: ColorFields,
    pub composition: CompositionMode,
    /// Pins the grid template by name instead of drawing one.
    pub grid_template: Option<String>,
    /// Seeds the random source for this call only.
    pub seed: Option<u64>,
}

impl Default for LayoutRequest {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 675,
            headline: String::new(),
            sub: String::new(),
            font_family: "Inter".to_string(),
            sub_font_family: None,
            headline_weight: 800,
            sub_weight: 400,
            headline_letter_spacing: 0.0,
            sub_letter_spacing: 0.0,
            headline_line_height: 1.20,
            sub_line_height: 1.44,
            image: None,
            pattern: PatternChoice::Auto,
            image_rounded: false,
            image_padding: ImagePadding::Layout,
            logo: None,
            logo_position: LogoPosition::Top,
            logo_size: ElementSize::M,
            tag: None,
            tag_position: TagPosition::Above,
            tag_size: ElementSize::M,
            padding: PaddingMode::Auto,
            center_align: false,
            colors: ColorFields::default(),
            composition: CompositionMode::Fixed,
            grid_template: None,
            seed: None,
        }
    }
}

impl LayoutRequest {
    /// Rejects structurally invalid input and normalizes the rest.
    ///
    /// Colors are rejected when malformed; dimensions are clamped to
    /// `[MIN_DIMENSION, MAX_DIMENSION]`; blank optional references become `None`.
    pub fn validated(mut self) -> Result<Self, AppError> {
        if self.headline.trim().is_empty() {
            return Err(AppError::Validation("headline cannot be empty".to_string()));
        }
        for (name, weight) in [
            ("headline_weight", self.headline_weight),
            ("sub_weight", self.sub_weight),
        ] {
            if !(100..=900).contains(&weight) {
                return Err(AppError::Validation(format!(
                    "{name} must be between 100 and 900, got {weight}"
                )));
            }
        }
        for (name, value) in [
            ("headline_line_height", self.headline_line_height),
            ("sub_line_height", self.sub_line_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::Validation(format!(
                    "{name} must be a positive number"
                )));
            }
        }
        for (name, value) in [
            ("headline_letter_spacing", self.headline_letter_spacing),
            ("sub_letter_spacing", self.sub_letter_spacing),
        ] {
            if !value.is_finite() {
                return Err(AppError::Validation(format!("{name} must be finite")));
            }
        }
        self.colors
            .parse()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.width = self.width.clamp(MIN_DIMENSION, MAX_DIMENSION);
        self.height = self.height.clamp(MIN_DIMENSION, MAX_DIMENSION);
        self.image = non_blank(self.image);
        self.logo = non_blank(self.logo);
        self.tag = non_blank(self.tag);
        self.sub_font_family = non_blank(self.sub_font_family);
        self.grid_template = non_blank(self.grid_template);
        if let Some(name) = &self.grid_template {
            if template_by_name(name).is_none() {
                return Err(AppError::Validation(format!("unknown grid template '{name}'")));
            }
        }
        if self.font_family.trim().is_empty() {
            self.font_family = "Inter".to_string();
        }
        Ok(self)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn has_sub(&self) -> bool {
        !self.sub.trim().is_empty()
    }

    /// Trimmed tag text, if any.
    pub fn tag_text(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn min_dim(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    pub fn headline_style(&self) -> TextStyle {
        TextStyle::new(self.font_family.clone(), self.headline_weight)
            .with_letter_spacing(self.headline_letter_spacing)
    }

    pub fn sub_style(&self) -> TextStyle {
        let family = self
            .sub_font_family
            .clone()
            .unwrap_or_else(|| self.font_family.clone());
        TextStyle::new(family, self.sub_weight).with_letter_spacing(self.sub_letter_spacing)
    }

    /// Hashable view of every field that affects geometry. Colors are excluded.
    pub fn geometry_key(&self) -> GeometryKey {
        GeometryKey {
            width: self.width,
            height: self.height,
            headline: self.headline.clone(),
            sub: self.sub.clone(),
            font_family: self.font_family.clone(),
            sub_font_family: self.sub_font_family.clone(),
            headline_weight: self.headline_weight,
            sub_weight: self.sub_weight,
            spacing_bits: [
                self.headline_letter_spacing.to_bits(),
                self.sub_letter_spacing.to_bits(),
                self.headline_line_height.to_bits(),
                self.sub_line_height.to_bits(),
            ],
            image: self.image.clone(),
            pattern: self.pattern,
            image_rounded: self.image_rounded,
            image_padding: self.image_padding,
            logo: self.logo.clone(),
            logo_position: self.logo_position,
            logo_size: self.logo_size,
            tag: self.tag.clone(),
            tag_position: self.tag_position,
            tag_size: self.tag_size,
            padding: self.padding,
            center_align: self.center_align,
            composition: self.composition,
            grid_template: self.grid_template.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Cache key for solved geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    width: u32,
    height: u32,
    headline: String,
    sub: String,
    font_family: String,
    sub_font_family: Option<String>,
    headline_weight: u16,
    sub_weight: u16,
    spacing_bits: [u32; 4],
    image: Option<String>,
    pattern: PatternChoice,
    image_rounded: bool,
    image_padding: ImagePadding,
    logo: Option<String>,
    logo_position: LogoPosition,
    logo_size: ElementSize,
    tag: Option<String>,
    tag_position: TagPosition,
    tag_size: ElementSize,
    padding: PaddingMode,
    center_align: bool,
    composition: CompositionMode,
    grid_template: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headline: &str) -> LayoutRequest {
        LayoutRequest {
            headline: headline.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_headline_is_rejected() {
        let err = request("   ").validated().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_malformed_color_is_rejected_not_clamped() {
        let mut req = request("Hello");
        req.colors.background = "#12345".to_string();
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_dimensions_are_clamped() {
        let mut req = request("Hello");
        req.width = 100;
        req.height = 20_000;
        let req = req.validated().unwrap();
        assert_eq!((req.width, req.height), (MIN_DIMENSION, MAX_DIMENSION));
    }

    #[test]
    fn test_blank_references_become_none() {
        let mut req = request("Hello");
        req.image = Some("  ".to_string());
        req.tag = Some("".to_string());
        let req = req.validated().unwrap();
        assert!(!req.has_image());
        assert_eq!(req.tag_text(), None);
    }

    #[test]
    fn test_weight_out_of_range_is_rejected() {
        let mut req = request("Hello");
        req.headline_weight = 1000;
        assert!(req.validated().is_err());
    }

    #[test]
    fn test_grid_template_must_exist() {
        let mut req = request("Hello");
        req.grid_template = Some("golden-split".to_string());
        assert!(req.clone().validated().is_ok());
        req.grid_template = Some("mosaic".to_string());
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_geometry_key_ignores_colors() {
        let a = request("Hello");
        let mut b = request("Hello");
        b.colors.background = "#000000".to_string();
        assert_eq!(a.geometry_key(), b.geometry_key());

        let mut c = request("Hello");
        c.tag = Some("NEW".to_string());
        assert_ne!(a.geometry_key(), c.geometry_key());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let req: LayoutRequest = serde_json::from_str(
            r#"{"headline": "Launch Faster", "padding": {"explicit": {"horizontal": 10, "vertical": 60}}, "logo_size": "l"}"#,
        )
        .unwrap();
        assert_eq!(req.width, 1200);
        assert_eq!(req.headline_weight, 800);
        assert_eq!(req.logo_size, ElementSize::L);
        assert_eq!(
            req.padding,
            PaddingMode::Explicit {
                horizontal: 10,
                vertical: 60
            }
        );
    }

    #[test]
    fn test_sub_style_uses_paired_family() {
        let mut req = request("Hello");
        req.sub_font_family = Some("EB Garamond".to_string());
        assert_eq!(req.sub_style().family, "EB Garamond");
        assert_eq!(req.headline_style().family, "Inter");
    }
}
