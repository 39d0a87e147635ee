//! Output geometry shared by the box solver, the grid alternative and the composer.

use serde::{Deserialize, Serialize};

use crate::layout::pattern::Pattern;
use crate::layout::request::{
    ColorFields, ElementSize, ImagePadding, LayoutRequest, LogoPosition, TagPosition,
};

/// Axis-aligned rectangle in canvas pixels (origin top-left, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// `x`/`w` describe a centering envelope rather than a left edge.
    #[serde(default)]
    pub centered: bool,
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            centered: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Shrinks the box so it lies inside a `width × height` canvas.
    pub fn clamped_to(self, width: f32, height: f32) -> Self {
        let x = self.x.clamp(0.0, width);
        let y = self.y.clamp(0.0, height);
        Self {
            x,
            y,
            w: self.w.max(0.0).min(width - x),
            h: self.h.max(0.0).min(height - y),
            centered: self.centered,
        }
    }

    pub fn contained_in(&self, width: f32, height: f32) -> bool {
        const EPS: f32 = 1e-3;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= width + EPS
            && self.bottom() <= height + EPS
    }
}

/// Resolved horizontal (`x`) and vertical (`y`) canvas padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub x: u32,
    pub y: u32,
}

impl Padding {
    pub fn uniform(value: u32) -> Self {
        Self { x: value, y: value }
    }
}

/// Parameters of one solver attempt, recorded in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradeStep {
    pub padding: Padding,
    pub side_fraction: f32,
    pub top_fraction: f32,
    pub pattern: Pattern,
    pub fit: bool,
}

/// Styling fields echoed from the request for the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleEcho {
    pub font_family: String,
    pub sub_font_family: String,
    pub headline_weight: u16,
    pub sub_weight: u16,
    pub headline_letter_spacing: f32,
    pub sub_letter_spacing: f32,
    pub headline_line_height: f32,
    pub sub_line_height: f32,
    pub image: Option<String>,
    pub image_rounded: bool,
    pub image_padding: ImagePadding,
    pub logo: Option<String>,
    pub logo_position: LogoPosition,
    pub tag_text: Option<String>,
    pub tag_position: TagPosition,
    pub tag_size: ElementSize,
    pub center_align: bool,
    pub colors: ColorFields,
}

impl StyleEcho {
    pub fn from_request(request: &LayoutRequest) -> Self {
        Self {
            font_family: request.font_family.clone(),
            sub_font_family: request.sub_style().family,
            headline_weight: request.headline_weight,
            sub_weight: request.sub_weight,
            headline_letter_spacing: request.headline_letter_spacing,
            sub_letter_spacing: request.sub_letter_spacing,
            headline_line_height: request.headline_line_height,
            sub_line_height: request.sub_line_height,
            image: request.image.clone(),
            image_rounded: request.image_rounded,
            image_padding: request.image_padding,
            logo: request.logo.clone(),
            logo_position: request.logo_position,
            tag_text: request.tag_text().map(str::to_string),
            tag_position: request.tag_position,
            tag_size: request.tag_size,
            center_align: request.center_align,
            colors: request.colors.clone(),
        }
    }
}

/// Solved geometry for one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub width: u32,
    pub height: u32,
    pub padding: Padding,
    pub headline_size: u32,
    pub sub_size: u32,
    /// Vertical gap between the headline and sub blocks.
    pub gap: u32,
    pub image_text_gap: u32,
    pub headline_lines: Vec<String>,
    pub sub_lines: Vec<String>,
    pub headline_too_wide: bool,
    pub sub_too_wide: bool,
    pub headline_box: LayoutBox,
    pub sub_box: LayoutBox,
    pub image_box: Option<LayoutBox>,
    pub logo_box: Option<LayoutBox>,
    pub tag_box: Option<LayoutBox>,
    pub pattern: Pattern,
    pub grid_template: Option<String>,
    pub degrade_trace: Vec<DegradeStep>,
    pub style: StyleEcho,
}

impl LayoutResult {
    /// All boxes present in the result.
    pub fn boxes(&self) -> Vec<LayoutBox> {
        let mut boxes = vec![self.headline_box, self.sub_box];
        boxes.extend(self.image_box);
        boxes.extend(self.logo_box);
        boxes.extend(self.tag_box);
        boxes
    }

    /// Clamps every box to the canvas.
    pub(crate) fn clamp_boxes(&mut self) {
        let (w, h) = (self.width as f32, self.height as f32);
        self.headline_box = self.headline_box.clamped_to(w, h);
        self.sub_box = self.sub_box.clamped_to(w, h);
        self.image_box = self.image_box.map(|b| b.clamped_to(w, h));
        self.logo_box = self.logo_box.map(|b| b.clamped_to(w, h));
        self.tag_box = self.tag_box.map(|b| b.clamped_to(w, h));
        debug_assert!(self.boxes().iter().all(|b| b.contained_in(w, h)));
    }
}
