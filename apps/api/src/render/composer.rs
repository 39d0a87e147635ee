//! Assembles the vector document from solved geometry and a color scheme.
//!
//! Primitive order is fixed: background, image, logo, tag pill + tag text,
//! headline lines, sub lines.

use serde::{Deserialize, Serialize};

use crate::color::harmonizer::ColorScheme;
use crate::layout::cache::MetricsCache;
use crate::layout::font_metrics::GlyphMetrics;
use crate::layout::geometry::{LayoutBox, LayoutResult};
use crate::layout::request::ImagePadding;
use crate::layout::solver::floor_scaled;

pub const IMAGE_RADIUS: f32 = 12.0;
const TAG_WEIGHT: u16 = 500;
const HEADLINE_BASELINE: f32 = 0.20;
const SUB_BASELINE: f32 = 0.44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Fill the box, cropping overflow.
    Cover,
    /// Fit inside the box, letterboxing.
    Contain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: String,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        href: String,
        fit: ImageFit,
        radius: f32,
        /// Custom outline when only some corners are rounded.
        clip_path: Option<String>,
    },
    Text {
        x: f32,
        /// Baseline.
        y: f32,
        text: String,
        font_family: String,
        font_size: u32,
        font_weight: u16,
        /// Pixels.
        letter_spacing: f32,
        fill: String,
        anchor: TextAnchor,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub width: u32,
    pub height: u32,
    pub primitives: Vec<Primitive>,
}

/// Rounded-rectangle outline with per-corner radii `[tl, tr, br, bl]`.
///
/// Always four arcs; a zero radius degenerates to a square corner.
pub fn rounded_rect_path(b: &LayoutBox, radii: [f32; 4]) -> String {
    let [tl, tr, br, bl] = radii;
    let (x, y, r, bottom) = (b.x, b.y, b.right(), b.bottom());
    format!(
        "M{} {} H{} A{tr} {tr} 0 0 1 {} {} V{} A{br} {br} 0 0 1 {} {} H{} A{bl} {bl} 0 0 1 {} {} V{} A{tl} {tl} 0 0 1 {} {} Z",
        x + tl,
        y,
        r - tr,
        r,
        y + tr,
        bottom - br,
        r - br,
        bottom,
        x + bl,
        x,
        bottom - bl,
        y + tl,
        x + tl,
        y,
    )
}

/// Corner radii for a `fill`-mode image: corners on the canvas edge stay square.
fn inner_corner_radii(b: &LayoutBox, width: f32, height: f32, radius: f32) -> [f32; 4] {
    const EPS: f32 = 0.5;
    let on_x_edge = |x: f32| x <= EPS || x >= width - EPS;
    let on_y_edge = |y: f32| y <= EPS || y >= height - EPS;
    let corner = |x: f32, y: f32| {
        if on_x_edge(x) || on_y_edge(y) {
            0.0
        } else {
            radius
        }
    };
    [
        corner(b.x, b.y),
        corner(b.right(), b.y),
        corner(b.right(), b.bottom()),
        corner(b.x, b.bottom()),
    ]
}

pub fn compose<M: GlyphMetrics>(
    layout: &LayoutResult,
    colors: &ColorScheme,
    metrics: &mut MetricsCache<M>,
) -> VectorDocument {
    let style = &layout.style;
    let (width, height) = (layout.width as f32, layout.height as f32);
    let mut primitives = vec![Primitive::Rect {
        x: 0.0,
        y: 0.0,
        w: width,
        h: height,
        radius: 0.0,
        fill: colors.background.clone(),
    }];

    if let (Some(b), Some(href)) = (layout.image_box, &style.image) {
        if b.has_area() {
            let radius = if style.image_rounded {
                IMAGE_RADIUS.min(b.w / 2.0).min(b.h / 2.0)
            } else {
                0.0
            };
            let clip_path = (style.image_rounded && style.image_padding == ImagePadding::Fill)
                .then(|| rounded_rect_path(&b, inner_corner_radii(&b, width, height, radius)));
            primitives.push(Primitive::Image {
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
                href: href.clone(),
                fit: ImageFit::Cover,
                radius,
                clip_path,
            });
        }
    }

    if let (Some(b), Some(href)) = (layout.logo_box, &style.logo) {
        if b.has_area() {
            primitives.push(Primitive::Image {
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
                href: href.clone(),
                fit: ImageFit::Contain,
                radius: 0.0,
                clip_path: None,
            });
        }
    }

    if let (Some(b), Some(text)) = (layout.tag_box, &style.tag_text) {
        let pill_h = b.h;
        let pad_x = floor_scaled(pill_h as u32, 0.4).max(12) as f32;
        let size = floor_scaled(pill_h as u32, 0.6).max(10);
        let text_w = metrics.measure(&style.font_family, TAG_WEIGHT, size as f32, text);
        let pill_w = (text_w + 2.0 * pad_x).min(b.w.max(0.0));
        let (pill_x, text_x, anchor) = if b.centered {
            let cx = b.center_x();
            (cx - pill_w / 2.0, cx, TextAnchor::Middle)
        } else {
            (b.x, b.x + pad_x, TextAnchor::Start)
        };
        primitives.push(Primitive::Rect {
            x: pill_x,
            y: b.y,
            w: pill_w,
            h: pill_h,
            radius: (pill_h * 0.5).floor(),
            fill: colors.tag_background.clone(),
        });
        primitives.push(Primitive::Text {
            x: text_x,
            y: b.y + pill_h * 0.5 + size as f32 * 0.35,
            text: text.clone(),
            font_family: style.font_family.clone(),
            font_size: size,
            font_weight: TAG_WEIGHT,
            letter_spacing: 0.0,
            fill: colors.tag_text.clone(),
            anchor,
        });
    }

    let lines = [
        (
            &layout.headline_lines,
            layout.headline_box,
            layout.headline_size,
            style.headline_line_height,
            HEADLINE_BASELINE,
            &style.font_family,
            style.headline_weight,
            style.headline_letter_spacing,
        ),
        (
            &layout.sub_lines,
            layout.sub_box,
            layout.sub_size,
            style.sub_line_height,
            SUB_BASELINE,
            &style.sub_font_family,
            style.sub_weight,
            style.sub_letter_spacing,
        ),
    ];
    for (texts, b, size, line_height, baseline, family, weight, spacing_em) in lines {
        let (x, anchor) = if b.centered {
            (b.center_x(), TextAnchor::Middle)
        } else {
            (b.x, TextAnchor::Start)
        };
        let size_px = size as f32;
        for (i, line) in texts.iter().enumerate() {
            primitives.push(Primitive::Text {
                x,
                y: b.y + (i + 1) as f32 * size_px * line_height - size_px * baseline,
                text: line.clone(),
                font_family: family.clone(),
                font_size: size,
                font_weight: weight,
                letter_spacing: spacing_em * size_px,
                fill: colors.text.clone(),
                anchor,
            });
        }
    }

    VectorDocument {
        width: layout.width,
        height: layout.height,
        primitives,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
