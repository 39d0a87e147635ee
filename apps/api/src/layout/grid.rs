//! Golden-ratio grid compositions.
//!
//! Trades typographic optimality for variety: sizes come from canvas
//! fractions rather than a search, and the template is drawn from the RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::layout::cache::MetricsCache;
use crate::layout::font_metrics::GlyphMetrics;
use crate::layout::geometry::{LayoutBox, LayoutResult, Padding, StyleEcho};
use crate::layout::pattern::Pattern;
use crate::layout::request::{LayoutRequest, PaddingMode};
use crate::layout::solver::{floor_scaled, SolverConfig};
use crate::layout::wrap::{wrap_no_break, Wrapped};
use GridElement::{Image, Logo, Tag, Text};

pub const GOLDEN_RATIO: f32 = 1.618;

const MIN_HEADLINE: u32 = 12;
const MIN_SUB: u32 = 10;
const TAG_BAND_GAP: f32 = 8.0;
const MAX_TAG_WIDTH: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridElement {
    Image,
    Text,
    Logo,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub element: GridElement,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

const fn cell(element: GridElement, row: usize, col: usize, row_span: usize, col_span: usize) -> GridCell {
    GridCell {
        element,
        row,
        col,
        row_span,
        col_span,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridTemplate {
    pub name: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub cells: &'static [GridCell],
}

impl GridTemplate {
    pub fn has(&self, element: GridElement) -> bool {
        self.cells.iter().any(|c| c.element == element)
    }
}

/// Template catalog.
pub static TEMPLATES: [GridTemplate; 5] = [
    GridTemplate {
        name: "2x2-grid",
        rows: 2,
        cols: 2,
        cells: &[cell(Image, 0, 0, 2, 1), cell(Text, 0, 1, 1, 1), cell(Logo, 1, 1, 1, 1)],
    },
    GridTemplate {
        name: "3x2-grid",
        rows: 3,
        cols: 2,
        cells: &[
            cell(Image, 0, 0, 1, 2),
            cell(Text, 1, 0, 1, 1),
            cell(Logo, 1, 1, 1, 1),
            cell(Tag, 2, 1, 1, 1),
        ],
    },
    GridTemplate {
        name: "2x3-grid",
        rows: 2,
        cols: 3,
        cells: &[cell(Text, 0, 0, 1, 2), cell(Logo, 0, 2, 1, 1), cell(Image, 1, 0, 1, 3)],
    },
    GridTemplate {
        name: "golden-split",
        rows: 2,
        cols: 2,
        cells: &[cell(Text, 0, 0, 1, 2), cell(Image, 1, 0, 1, 1), cell(Logo, 1, 1, 1, 1)],
    },
    GridTemplate {
        name: "sidebar-layout",
        rows: 3,
        cols: 3,
        cells: &[
            cell(Image, 0, 0, 3, 1),
            cell(Text, 0, 1, 2, 2),
            cell(Logo, 2, 1, 1, 1),
            cell(Tag, 2, 2, 1, 1),
        ],
    },
];

/// Uniform pick from the catalog.
pub fn pick_template<R: Rng + ?Sized>(rng: &mut R) -> &'static GridTemplate {
    TEMPLATES.choose(rng).unwrap_or(&TEMPLATES[0])
}

pub fn template_by_name(name: &str) -> Option<&'static GridTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Track sizes: golden split for two tracks, equal thirds for three.
pub fn split_tracks(available: f32, count: usize) -> Vec<f32> {
    match count {
        2 => {
            let unit = available / (1.0 + GOLDEN_RATIO);
            vec![(unit * GOLDEN_RATIO).floor(), unit.floor()]
        }
        3 => vec![(available / 3.0).floor(); 3],
        _ => vec![available],
    }
}

/// Lays `request` out on `template`.
pub fn layout_grid<M: GlyphMetrics>(
    request: &LayoutRequest,
    template: &GridTemplate,
    config: &SolverConfig,
    metrics: &mut MetricsCache<M>,
) -> LayoutResult {
    let min_dim = request.min_dim();
    let padding = match request.padding {
        PaddingMode::Auto => {
            let raw = (f64::from(min_dim) * 0.06).clamp(20.0, 60.0);
            Padding::uniform(((raw / 8.0).round() * 8.0) as u32)
        }
        explicit => config.resolve_padding(explicit, min_dim),
    };
    let (pad_x, pad_y) = (padding.x as f32, padding.y as f32);
    let gap = floor_scaled(min_dim, 0.02).max(16) as f32;

    let content_w = request.width as f32 - 2.0 * pad_x;
    let content_h = request.height as f32 - 2.0 * pad_y;
    let col_widths = split_tracks(content_w - (template.cols - 1) as f32 * gap, template.cols);
    let row_heights = split_tracks(content_h - (template.rows - 1) as f32 * gap, template.rows);
    let cell_padding = ((gap * 0.5).floor()).max(8.0);

    let inner_box = |c: &GridCell| -> LayoutBox {
        let x = pad_x + col_widths[..c.col].iter().map(|w| w + gap).sum::<f32>();
        let y = pad_y + row_heights[..c.row].iter().map(|h| h + gap).sum::<f32>();
        let span = |tracks: &[f32], start: usize, len: usize| {
            let end = (start + len).min(tracks.len());
            tracks[start..end].iter().sum::<f32>() + (end - start).saturating_sub(1) as f32 * gap
        };
        let w = span(&col_widths, c.col, c.col_span);
        let h = span(&row_heights, c.row, c.row_span);
        LayoutBox::new(
            x + cell_padding,
            y + cell_padding,
            (w - 2.0 * cell_padding).max(0.0),
            (h - 2.0 * cell_padding).max(0.0),
        )
    };

    let tag_h = floor_scaled(min_dim, 0.04).max(28) as f32;
    let has_tag = request.tag_text().is_some();
    let has_sub = request.has_sub();

    let mut image_box = None;
    let mut logo_box = None;
    let mut tag_box = None;
    let mut text = None;

    for c in template.cells {
        let inner = inner_box(c);
        match c.element {
            GridElement::Image if request.has_image() => image_box = Some(inner),
            GridElement::Logo if request.has_logo() => {
                let edge = inner
                    .w
                    .min(inner.h)
                    .min(floor_scaled(min_dim, 0.08).max(40) as f32);
                logo_box = Some(LayoutBox::new(
                    inner.x + ((inner.w - edge) / 2.0).floor(),
                    inner.y + ((inner.h - edge) / 2.0).floor(),
                    edge,
                    edge,
                ));
            }
            GridElement::Tag if has_tag => {
                let width = inner.w.min(MAX_TAG_WIDTH);
                tag_box = Some(
                    LayoutBox::new(
                        inner.x + ((inner.w - width) / 2.0).floor(),
                        inner.y + ((inner.h - tag_h) / 2.0).floor(),
                        width,
                        tag_h,
                    )
                    .centered(),
                );
            }
            GridElement::Text => text = Some(inner),
            _ => {}
        }
    }

    let mut text_cell = text.unwrap_or_else(|| LayoutBox::new(pad_x, pad_y, content_w, content_h));
    if has_tag && !template.has(GridElement::Tag) {
        tag_box = Some(LayoutBox::new(text_cell.x, text_cell.y, text_cell.w, tag_h));
        let band = tag_h + TAG_BAND_GAP;
        text_cell.y += band;
        text_cell.h = (text_cell.h - band).max(0.0);
    }

    let headline_style = request.headline_style();
    let sub_style = request.sub_style();
    let mut headline_size = floor_scaled(min_dim, 0.05).clamp(18, 100);
    let mut sub_size = floor_scaled(headline_size, 0.7).max(12);

    let (headline, sub, text_gap, block_h) = loop {
        let text_gap = floor_scaled(headline_size, 0.25).max(8);
        let headline = wrap_no_break(
            &mut |size, t: &str| metrics.measure_styled(&headline_style, size, t),
            headline_size as f32,
            &request.headline,
            text_cell.w,
        );
        let sub = if has_sub {
            wrap_no_break(
                &mut |size, t: &str| metrics.measure_styled(&sub_style, size, t),
                sub_size as f32,
                &request.sub,
                text_cell.w,
            )
        } else {
            Wrapped::default()
        };
        let headline_h = headline.lines.len() as f32 * headline_size as f32 * request.headline_line_height;
        let sub_h = sub.lines.len() as f32 * sub_size as f32 * request.sub_line_height;
        let block_h = if has_sub {
            headline_h + text_gap as f32 + sub_h
        } else {
            headline_h
        };

        let at_floor = headline_size == MIN_HEADLINE && sub_size == MIN_SUB;
        if block_h <= text_cell.h || at_floor {
            break (headline, sub, text_gap, (headline_h, sub_h));
        }
        headline_size = floor_scaled(headline_size, 0.9).max(MIN_HEADLINE);
        sub_size = floor_scaled(sub_size, 0.9).max(MIN_SUB);
    };

    let (headline_h, sub_h) = block_h;
    let total = if has_sub {
        headline_h + text_gap as f32 + sub_h
    } else {
        headline_h
    };
    let text_y = text_cell.y + ((text_cell.h - total) / 2.0).floor().max(0.0);
    let headline_box = LayoutBox::new(text_cell.x, text_y, text_cell.w, headline_h);
    let sub_box = LayoutBox::new(
        text_cell.x,
        headline_box.bottom() + text_gap as f32,
        text_cell.w,
        sub_h,
    );

    let mut result = LayoutResult {
        width: request.width,
        height: request.height,
        padding,
        headline_size,
        sub_size,
        gap: text_gap,
        image_text_gap: gap as u32,
        headline_too_wide: headline.too_wide,
        sub_too_wide: sub.too_wide,
        headline_lines: headline.lines,
        sub_lines: sub.lines,
        headline_box,
        sub_box,
        image_box,
        logo_box,
        tag_box,
        pattern: if request.has_image() {
            Pattern::Grid
        } else {
            Pattern::None
        },
        grid_template: Some(template.name.to_string()),
        degrade_trace: Vec::new(),
        style: StyleEcho::from_request(request),
    };
    result.clamp_boxes();
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
