//! Box Solver: largest headline size that fits, with a bounded degrade loop.
//!
//! # Algorithm
//! 1. Resolve padding (auto from the canvas, or explicit floored per axis).
//! 2. `attempt` binary-searches the integer headline size in
//!    `[min_headline, headline_max]` for the current padding and image share.
//! 3. If nothing fits, the degrade loop shrinks the image share toward
//!    `min_fraction`, then the padding toward `min_padding`, at most
//!    `max_degrade_steps` times. On exhaustion the image is dropped and a final
//!    attempt runs at minimum padding; if even that fails the minimum size is
//!    accepted and boxes are clamped to the canvas.
//! 4. Comfort shrink, then translation into absolute canvas boxes.
//!
//! The solver is pure and synchronous. It runs on a blocking thread in the
//! service; nothing here awaits.

use tracing::{debug, warn};

use crate::layout::cache::MetricsCache;
use crate::layout::font_metrics::{GlyphMetrics, TextStyle};
use crate::layout::geometry::{DegradeStep, LayoutBox, LayoutResult, Padding, StyleEcho};
use crate::layout::pattern::Pattern;
use crate::layout::request::{
    ElementSize, ImagePadding, LayoutRequest, LogoPosition, PaddingMode, TagPosition,
};
use crate::layout::wrap::{wrap_no_break, Wrapped};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry-affecting constants. Changing any of them invalidates the
/// engine's caches.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Headline size / sub size.
    pub sub_ratio: f64,
    pub gap_ratio: f64,
    pub min_gap: u32,
    pub image_gap_ratio: f64,
    pub min_image_gap: u32,
    pub min_headline: u32,
    pub min_sub: u32,
    pub headline_max_ratio: f64,
    pub headline_max_floor: u32,
    pub headline_max_cap: u32,
    pub auto_padding_ratio: f64,
    pub auto_padding_min: f64,
    pub auto_padding_max: f64,
    pub explicit_padding_floor: u32,
    pub min_padding: u32,
    pub padding_decay: f64,
    pub side_fraction: f32,
    pub top_fraction: f32,
    /// Upper bound on the top band when the copy is long.
    pub long_top_fraction: f32,
    pub min_fraction: f32,
    pub fraction_step: f32,
    pub max_degrade_steps: usize,
    pub comfort_factor: f64,
    pub comfort_min_headline: u32,
    pub comfort_min_sub: u32,
    pub logo_gap: u32,
    pub tag_gap: u32,
    pub long_headline_chars: usize,
    pub long_sub_chars: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sub_ratio: 1.6,
            gap_ratio: 0.40,
            min_gap: 10,
            image_gap_ratio: 0.5,
            min_image_gap: 16,
            min_headline: 12,
            min_sub: 10,
            headline_max_ratio: 0.14,
            headline_max_floor: 28,
            headline_max_cap: 200,
            auto_padding_ratio: 0.10,
            auto_padding_min: 24.0,
            auto_padding_max: 120.0,
            explicit_padding_floor: 48,
            min_padding: 12,
            padding_decay: 0.9,
            side_fraction: 0.40,
            top_fraction: 0.56,
            long_top_fraction: 0.40,
            min_fraction: 0.26,
            fraction_step: 0.04,
            max_degrade_steps: 16,
            comfort_factor: 0.95,
            comfort_min_headline: 12,
            comfort_min_sub: 9,
            logo_gap: 12,
            tag_gap: 8,
            long_headline_chars: 60,
            long_sub_chars: 80,
        }
    }
}

impl SolverConfig {
    /// `clamp(floor, ⌊ratio · min_dim⌋, cap)`.
    pub fn headline_max(&self, min_dim: u32) -> u32 {
        floor_scaled(min_dim, self.headline_max_ratio)
            .clamp(self.headline_max_floor, self.headline_max_cap)
    }

    pub fn sub_size_for(&self, headline_size: u32) -> u32 {
        ((f64::from(headline_size) / self.sub_ratio).floor() as u32).max(self.min_sub)
    }

    pub fn gap_for(&self, headline_size: u32) -> u32 {
        floor_scaled(headline_size, self.gap_ratio).max(self.min_gap)
    }

    pub fn image_gap_for(&self, headline_size: u32) -> u32 {
        floor_scaled(headline_size, self.image_gap_ratio).max(self.min_image_gap)
    }

    pub fn resolve_padding(&self, mode: PaddingMode, min_dim: u32) -> Padding {
        match mode {
            PaddingMode::Auto => {
                let raw = (f64::from(min_dim) * self.auto_padding_ratio)
                    .clamp(self.auto_padding_min, self.auto_padding_max);
                Padding::uniform(round8(raw))
            }
            PaddingMode::Explicit {
                horizontal,
                vertical,
            } => Padding {
                x: horizontal.max(self.explicit_padding_floor),
                y: vertical.max(self.explicit_padding_floor),
            },
        }
    }

    fn shrink_padding(&self, padding: Padding) -> Padding {
        let shrink =
            |value: u32| floor_scaled(value, self.padding_decay).max(self.min_padding).min(value);
        Padding {
            x: shrink(padding.x),
            y: shrink(padding.y),
        }
    }
}

/// Logo square edge: `s = max(48, ⌊0.8b⌋)`, `m = max(64, b)`, `l = max(88, ⌊1.4b⌋)`
/// with `b = ⌊0.10 · min_dim⌋`.
pub fn logo_edge(min_dim: u32, size: ElementSize) -> u32 {
    let base = floor_scaled(min_dim, 0.10);
    match size {
        ElementSize::S => floor_scaled(base, 0.8).max(48),
        ElementSize::M => base.max(64),
        ElementSize::L => floor_scaled(base, 1.4).max(88),
    }
}

/// Tag pill height: `s = max(20, ⌊0.8b⌋)`, `m = max(28, b)`, `l = max(36, ⌊1.2b⌋)`
/// with `b = ⌊0.06 · min_dim⌋`.
pub fn tag_height(min_dim: u32, size: ElementSize) -> u32 {
    let base = floor_scaled(min_dim, 0.06);
    match size {
        ElementSize::S => floor_scaled(base, 0.8).max(20),
        ElementSize::M => base.max(28),
        ElementSize::L => floor_scaled(base, 1.2).max(36),
    }
}

pub(crate) fn floor_scaled(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).floor().max(0.0) as u32
}

fn round8(value: f64) -> u32 {
    ((value / 8.0).round() * 8.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Attempt
// ────────────────────────────────────────────────────────────────────────────

/// Parameters of a single attempt.
#[derive(Debug, Clone, Copy)]
struct Frame {
    pattern: Pattern,
    padding: Padding,
    side_fraction: f32,
    top_fraction: f32,
}

#[derive(Debug, Clone, Copy)]
enum ImageRegion {
    /// Column width (`side` / `left`).
    Column(f32),
    /// Band height (`top`).
    Band(f32),
}

/// Content-relative geometry at one headline size.
#[derive(Debug, Clone)]
struct Fit {
    frame: Frame,
    headline_size: u32,
    sub_size: u32,
    image_text_gap: u32,
    headline: Wrapped,
    sub: Wrapped,
    content_w: f32,
    content_h: f32,
    text_x: f32,
    text_w: f32,
    /// Height taken above the text column by a top image and its gap.
    band: f32,
    image: Option<ImageRegion>,
    logo_h: u32,
    tag_h: u32,
}

struct Solver<'a, M> {
    request: &'a LayoutRequest,
    config: &'a SolverConfig,
    metrics: &'a mut MetricsCache<M>,
    headline_style: TextStyle,
    sub_style: TextStyle,
    has_sub: bool,
    is_long: bool,
    logo_edge: Option<u32>,
    tag_height: Option<u32>,
}

impl<'a, M: GlyphMetrics> Solver<'a, M> {
    fn new(
        request: &'a LayoutRequest,
        config: &'a SolverConfig,
        metrics: &'a mut MetricsCache<M>,
    ) -> Self {
        let min_dim = request.min_dim();
        let sub_chars = request.sub.trim().chars().count();
        let headline_chars = request.headline.trim().chars().count();
        Self {
            headline_style: request.headline_style(),
            sub_style: request.sub_style(),
            has_sub: request.has_sub(),
            is_long: sub_chars > config.long_sub_chars
                || headline_chars > config.long_headline_chars,
            logo_edge: request
                .has_logo()
                .then(|| logo_edge(min_dim, request.logo_size)),
            tag_height: request
                .tag_text()
                .map(|_| tag_height(min_dim, request.tag_size)),
            request,
            config,
            metrics,
        }
    }

    /// Geometry at `headline_size`, and whether the text block fits.
    fn layout_at(&mut self, frame: Frame, headline_size: u32) -> (Fit, bool) {
        let cfg = self.config;
        let req = self.request;

        let content_w = req.width as f32 - 2.0 * frame.padding.x as f32;
        let content_h = req.height as f32 - 2.0 * frame.padding.y as f32;
        let sub_size = cfg.sub_size_for(headline_size);
        let gap = cfg.gap_for(headline_size);
        let image_text_gap = cfg.image_gap_for(headline_size);
        let logo_h = self.logo_edge.map_or(0, |edge| edge.max(sub_size));
        let tag_h = self.tag_height.unwrap_or(0);

        let mut text_x = 0.0;
        let mut text_w = content_w;
        let mut text_h = content_h;
        let mut band = 0.0;
        let image = match frame.pattern {
            Pattern::Side | Pattern::Left => {
                let column = (content_w * frame.side_fraction).floor();
                text_w = content_w - column - image_text_gap as f32;
                if frame.pattern == Pattern::Left {
                    text_x = column + image_text_gap as f32;
                }
                Some(ImageRegion::Column(column))
            }
            Pattern::Top => {
                let fraction = if self.is_long {
                    frame.top_fraction.min(cfg.long_top_fraction)
                } else {
                    frame.top_fraction
                };
                let height = (content_h * fraction).floor();
                text_h = content_h - height - image_text_gap as f32;
                band = height + image_text_gap as f32;
                Some(ImageRegion::Band(height))
            }
            Pattern::None | Pattern::Grid => None,
        };

        let (reserve_top, reserve_bottom) = self.reservations(logo_h, tag_h);
        let available = text_h - reserve_top - reserve_bottom;

        let metrics = &mut *self.metrics;
        let headline_style = &self.headline_style;
        let headline = wrap_no_break(
            &mut |size, text: &str| metrics.measure_styled(headline_style, size, text),
            headline_size as f32,
            &req.headline,
            text_w,
        );
        let sub = if self.has_sub {
            let sub_style = &self.sub_style;
            wrap_no_break(
                &mut |size, text: &str| metrics.measure_styled(sub_style, size, text),
                sub_size as f32,
                &req.sub,
                text_w,
            )
        } else {
            Wrapped::default()
        };

        let headline_h = block_height(&headline, headline_size, req.headline_line_height);
        let sub_h = if self.has_sub {
            gap as f32 + block_height(&sub, sub_size, req.sub_line_height)
        } else {
            0.0
        };
        let fits = text_w > 0.0 && headline_h + sub_h <= available;

        let fit = Fit {
            frame,
            headline_size,
            sub_size,
            image_text_gap,
            headline,
            sub,
            content_w,
            content_h,
            text_x,
            text_w,
            band,
            image,
            logo_h,
            tag_h,
        };
        (fit, fits)
    }

    /// Bands carved from the top and bottom of the text region.
    fn reservations(&self, logo_h: u32, tag_h: u32) -> (f32, f32) {
        let cfg = self.config;
        let logo = self
            .logo_edge
            .map_or(0.0, |_| (logo_h + cfg.logo_gap) as f32);
        let tag = self.tag_height.map_or(0.0, |_| (tag_h + cfg.tag_gap) as f32);

        let (mut top, mut bottom) = (0.0, 0.0);
        match self.request.logo_position {
            LogoPosition::Top => top += logo,
            LogoPosition::Bottom => bottom += logo,
        }
        match self.request.tag_position {
            TagPosition::Above => top += tag,
            TagPosition::Below => bottom += tag,
        }
        (top, bottom)
    }

    /// Largest fitting headline size for `frame`.
    fn attempt(&mut self, frame: Frame) -> Option<Fit> {
        let mut lo = self.config.min_headline;
        let mut hi = self.config.headline_max(self.request.min_dim());
        let mut best = None;
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let (fit, fits) = self.layout_at(frame, mid);
            if fits {
                best = Some(fit);
                lo = mid + 1;
            } else if mid == 0 {
                break;
            } else {
                hi = mid - 1;
            }
        }
        best
    }

    fn run(mut self, pattern: Pattern) -> LayoutResult {
        let cfg = self.config;
        let mut frame = Frame {
            pattern,
            padding: cfg.resolve_padding(self.request.padding, self.request.min_dim()),
            side_fraction: cfg.side_fraction,
            top_fraction: cfg.top_fraction,
        };
        let mut trace = Vec::new();
        let mut found = None;

        for _ in 0..cfg.max_degrade_steps {
            let fit = self.attempt(frame);
            trace.push(step(frame, fit.is_some()));
            if fit.is_some() {
                found = fit;
                break;
            }
            if frame.pattern.is_column() && frame.side_fraction > cfg.min_fraction {
                frame.side_fraction = (frame.side_fraction - cfg.fraction_step).max(cfg.min_fraction);
            } else if frame.pattern == Pattern::Top && frame.top_fraction > cfg.min_fraction {
                frame.top_fraction = (frame.top_fraction - cfg.fraction_step).max(cfg.min_fraction);
            } else if frame.padding.x > cfg.min_padding || frame.padding.y > cfg.min_padding {
                frame.padding = cfg.shrink_padding(frame.padding);
            } else {
                break;
            }
        }

        let fit = match found {
            Some(fit) => fit,
            None => {
                warn!(
                    requested = ?pattern,
                    attempts = trace.len(),
                    "No headline size fits; dropping the image at minimum padding"
                );
                frame.pattern = Pattern::None;
                frame.padding = Padding::uniform(cfg.min_padding);
                let retry = self.attempt(frame);
                trace.push(step(frame, retry.is_some()));
                match retry {
                    Some(fit) => fit,
                    None => {
                        warn!(
                            headline_chars = self.request.headline.chars().count(),
                            "Text does not fit even without the image; using minimum size"
                        );
                        self.layout_at(frame, cfg.min_headline).0
                    }
                }
            }
        };

        debug!(
            pattern = ?fit.frame.pattern,
            headline_size = fit.headline_size,
            attempts = trace.len(),
            "Box solver converged"
        );
        self.place(fit, trace)
    }

    /// Comfort shrink and translation into canvas coordinates.
    fn place(&self, fit: Fit, degrade_trace: Vec<DegradeStep>) -> LayoutResult {
        let cfg = self.config;
        let req = self.request;
        let (canvas_w, canvas_h) = (req.width as f32, req.height as f32);
        let padding = fit.frame.padding;
        let (pad_x, pad_y) = (padding.x as f32, padding.y as f32);

        let headline_size =
            floor_scaled(fit.headline_size, cfg.comfort_factor).max(cfg.comfort_min_headline);
        let sub_size = floor_scaled(fit.sub_size, cfg.comfort_factor).max(cfg.comfort_min_sub);
        let gap = cfg.gap_for(headline_size);

        let (reserve_top, _) = self.reservations(fit.logo_h, fit.tag_h);
        let text_x = pad_x + fit.text_x;
        let column_top = pad_y + fit.band;

        let headline_box = LayoutBox::new(
            text_x,
            column_top + reserve_top,
            fit.text_w,
            block_height(&fit.headline, headline_size, req.headline_line_height),
        );
        let sub_h = if self.has_sub {
            block_height(&fit.sub, sub_size, req.sub_line_height)
        } else {
            0.0
        };
        let sub_box = LayoutBox::new(
            text_x,
            headline_box.bottom() + gap as f32,
            fit.text_w,
            sub_h,
        );

        let fill = req.image_padding == ImagePadding::Fill;
        let image_box = fit.image.map(|region| match (fit.frame.pattern, region) {
            (Pattern::Left, ImageRegion::Column(w)) => {
                if fill {
                    LayoutBox::new(0.0, pad_y, w + pad_x, fit.content_h)
                } else {
                    LayoutBox::new(pad_x, pad_y, w, fit.content_h)
                }
            }
            (_, ImageRegion::Column(w)) => {
                let x = pad_x + fit.content_w - w;
                let extra = if fill { pad_x } else { 0.0 };
                LayoutBox::new(x, pad_y, w + extra, fit.content_h)
            }
            (_, ImageRegion::Band(h)) => {
                if fill {
                    LayoutBox::new(pad_x, 0.0, fit.content_w, h + pad_y)
                } else {
                    LayoutBox::new(pad_x, pad_y, fit.content_w, h)
                }
            }
        });

        let logo_h = fit.logo_h as f32;
        let tag_h = fit.tag_h as f32;
        let logo_box = self.logo_edge.map(|_| {
            let y = match req.logo_position {
                LogoPosition::Top => column_top,
                LogoPosition::Bottom => canvas_h - pad_y - logo_h,
            };
            LayoutBox::new(text_x, y, logo_h, logo_h)
        });
        let tag_box = self.tag_height.map(|_| {
            let y = match (req.tag_position, req.logo_position, logo_box.is_some()) {
                (TagPosition::Above, LogoPosition::Top, true) => {
                    column_top + logo_h + cfg.logo_gap as f32
                }
                (TagPosition::Above, _, _) => column_top,
                (TagPosition::Below, LogoPosition::Bottom, true) => {
                    canvas_h - pad_y - tag_h - logo_h - cfg.logo_gap as f32
                }
                (TagPosition::Below, _, _) => canvas_h - pad_y - tag_h,
            };
            LayoutBox::new(text_x, y, fit.text_w, tag_h)
        });

        let mut result = LayoutResult {
            width: req.width,
            height: req.height,
            padding,
            headline_size,
            sub_size,
            gap,
            image_text_gap: fit.image_text_gap,
            headline_too_wide: fit.headline.too_wide,
            sub_too_wide: fit.sub.too_wide,
            headline_lines: fit.headline.lines,
            sub_lines: fit.sub.lines,
            headline_box,
            sub_box,
            image_box,
            logo_box,
            tag_box,
            pattern: fit.frame.pattern,
            grid_template: None,
            degrade_trace,
            style: StyleEcho::from_request(req),
        };

        if req.center_align
            && req.is_portrait()
            && matches!(result.pattern, Pattern::Top | Pattern::None)
        {
            center_across(&mut result, canvas_w);
        }
        result.clamp_boxes();
        result
    }
}

fn step(frame: Frame, fit: bool) -> DegradeStep {
    DegradeStep {
        padding: frame.padding,
        side_fraction: frame.side_fraction,
        top_fraction: frame.top_fraction,
        pattern: frame.pattern,
        fit,
    }
}

fn block_height(wrapped: &Wrapped, size: u32, line_height: f32) -> f32 {
    wrapped.lines.len() as f32 * size as f32 * line_height
}

/// Text boxes become full-width centering envelopes; the logo square is centered.
fn center_across(result: &mut LayoutResult, canvas_w: f32) {
    let envelope = |b: LayoutBox| LayoutBox::new(0.0, b.y, canvas_w, b.h).centered();
    result.headline_box = envelope(result.headline_box);
    result.sub_box = envelope(result.sub_box);
    result.tag_box = result.tag_box.map(envelope);
    result.logo_box = result
        .logo_box
        .map(|b| LayoutBox::new((canvas_w - b.w) / 2.0, b.y, b.w, b.h));
}

/// Solves `request` with an already-resolved `pattern`.
///
/// Total for validated requests: infeasible geometry degrades instead of failing.
pub fn solve<M: GlyphMetrics>(
    request: &LayoutRequest,
    pattern: Pattern,
    config: &SolverConfig,
    metrics: &mut MetricsCache<M>,
) -> LayoutResult {
    Solver::new(request, config, metrics).run(pattern)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::MonoMetrics;
    use crate::layout::pattern::{choose, PatternChoice};
    use proptest::prelude::*;

    fn metrics() -> MetricsCache<MonoMetrics> {
        MetricsCache::new(MonoMetrics::default(), 1024)
    }

    fn request(width: u32, height: u32, headline: &str, sub: &str) -> LayoutRequest {
        LayoutRequest {
            width,
            height,
            headline: headline.to_string(),
            sub: sub.to_string(),
            ..Default::default()
        }
    }

    fn run(req: &LayoutRequest) -> LayoutResult {
        let pattern = choose(req.pattern, req.aspect(), req.has_image());
        solve(req, pattern, &SolverConfig::default(), &mut metrics())
    }

    // ── Configuration ───────────────────────────────────────────────────────

    #[test]
    fn test_auto_padding_rounds_to_eight() {
        let cfg = SolverConfig::default();
        // 0.10 * 675 = 67.5 → 64
        assert_eq!(cfg.resolve_padding(PaddingMode::Auto, 675), Padding::uniform(64));
        // clamped to 24 on tiny canvases, 120 on huge ones
        assert_eq!(cfg.resolve_padding(PaddingMode::Auto, 200), Padding::uniform(24));
        assert_eq!(cfg.resolve_padding(PaddingMode::Auto, 4000), Padding::uniform(120));
    }

    #[test]
    fn test_explicit_padding_is_floored_per_axis() {
        let cfg = SolverConfig::default();
        let padding = cfg.resolve_padding(
            PaddingMode::Explicit {
                horizontal: 10,
                vertical: 60,
            },
            1080,
        );
        assert_eq!(padding, Padding { x: 48, y: 60 });
    }

    #[test]
    fn test_element_size_maps() {
        // min_dim 1080: logo base 108, tag base 64
        assert_eq!(logo_edge(1080, ElementSize::S), 86);
        assert_eq!(logo_edge(1080, ElementSize::M), 108);
        assert_eq!(logo_edge(1080, ElementSize::L), 151);
        assert_eq!(tag_height(1080, ElementSize::S), 51);
        assert_eq!(tag_height(1080, ElementSize::M), 64);
        assert_eq!(tag_height(1080, ElementSize::L), 76);
        // floors on small canvases
        assert_eq!(logo_edge(320, ElementSize::M), 64);
        assert_eq!(tag_height(320, ElementSize::S), 20);
    }

    #[test]
    fn test_headline_max_bounds() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.headline_max(675), 94);
        assert_eq!(cfg.headline_max(150), 28);
        assert_eq!(cfg.headline_max(8000), 200);
    }

    // ── Scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_text_only_landscape() {
        let req = request(1200, 675, "Launch Faster", "Ship automated layouts in seconds");
        let result = run(&req);

        assert_eq!(result.pattern, Pattern::None);
        assert!(result.image_box.is_none());
        assert_eq!(result.padding, Padding::uniform(64));
        assert_eq!(result.headline_box.x, 64.0);
        assert_eq!(result.headline_box.y, 64.0);

        let expected_gap = ((result.headline_size as f64 * 0.4).floor() as u32).max(10);
        assert_eq!(result.gap, expected_gap);
        let spacing = result.sub_box.y - result.headline_box.bottom();
        assert!((spacing - expected_gap as f32).abs() < 1e-3);
        assert_eq!(result.headline_lines, vec!["Launch Faster"]);
        assert_eq!(result.sub_lines, vec!["Ship automated layouts in seconds"]);
    }

    #[test]
    fn test_scenario_wide_canvas_with_image_goes_side() {
        let mut req = request(1920, 1080, "Launch Faster", "Ship automated layouts in seconds");
        req.image = Some("hero.png".to_string());
        let result = run(&req);

        assert_eq!(result.pattern, Pattern::Side);
        let image = result.image_box.expect("image box");
        let right_edge = 1920.0 - result.padding.x as f32;
        assert!((image.right() - right_edge).abs() < 1e-3);
        assert!(image.x > result.headline_box.right());
        assert_eq!(image.y, result.padding.y as f32);
    }

    #[test]
    fn test_scenario_tall_canvas_with_image_goes_top() {
        let mut req = request(1080, 1920, "Launch Faster", "Ship automated layouts in seconds");
        req.image = Some("hero.png".to_string());
        let result = run(&req);

        assert_eq!(result.pattern, Pattern::Top);
        let image = result.image_box.expect("image box");
        assert_eq!(image.y, result.padding.y as f32);
        assert!(result.headline_box.y >= image.bottom());
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[test]
    fn test_sizes_stay_within_bounds() {
        let cfg = SolverConfig::default();
        let copies = [
            ("Hi", ""),
            ("Launch Faster", "Ship automated layouts in seconds"),
            (
                "The quick brown fox jumps over the lazy dog again and again until dusk",
                "Every sentence in this paragraph exists to push the sub line past eighty characters",
            ),
        ];
        for (w, h) in [(320, 320), (1200, 675), (1080, 1920), (8000, 8000)] {
            for (headline, sub) in copies {
                for image in [None, Some("hero.png".to_string())] {
                    let mut req = request(w, h, headline, sub);
                    req.image = image;
                    let result = run(&req);
                    let max = cfg.headline_max(req.min_dim());
                    assert!(result.headline_size >= 12, "{w}x{h} {headline}");
                    assert!(result.headline_size <= max, "{w}x{h} {headline}");
                    assert!(result.sub_size >= 9);
                }
            }
        }
    }

    #[test]
    fn test_wrapped_lines_fit_their_boxes() {
        let mut req = request(
            1080,
            1080,
            "Design systems that scale with your team and your ambitions",
            "A layout engine that picks sizes, breaks lines and places every element for you",
        );
        req.image = Some("hero.png".to_string());
        req.pattern = PatternChoice::Left;
        let result = run(&req);

        let mono = MonoMetrics::default();
        for line in &result.headline_lines {
            let width = mono.measure("Inter", 800, result.headline_size as f32, line);
            assert!(width <= result.headline_box.w || !line.contains(' '), "{line}");
        }
        for line in &result.sub_lines {
            let width = mono.measure("Inter", 400, result.sub_size as f32, line);
            assert!(width <= result.sub_box.w || !line.contains(' '), "{line}");
        }
    }

    #[test]
    fn test_identical_geometry_ignores_colors() {
        let a = request(1200, 675, "Launch Faster", "Ship automated layouts in seconds");
        let mut b = a.clone();
        b.colors.background = "#000000".to_string();
        b.colors.text = "#ffffff".to_string();

        let (ra, rb) = (run(&a), run(&b));
        assert_eq!(ra.boxes(), rb.boxes());
        assert_eq!(ra.headline_lines, rb.headline_lines);
        assert_eq!(ra.sub_lines, rb.sub_lines);
    }

    #[test]
    fn test_degrade_trace_is_monotonic_and_bounded() {
        let headline = "word ".repeat(80);
        let mut req = request(320, 320, headline.trim(), "");
        req.image = Some("hero.png".to_string());
        req.pattern = PatternChoice::Side;
        let result = run(&req);

        assert!(result.degrade_trace.len() > 1);
        assert!(result.degrade_trace.len() <= 17);
        for pair in result.degrade_trace.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            assert!(next.padding.x <= prev.padding.x);
            assert!(next.padding.y <= prev.padding.y);
            assert!(next.side_fraction <= prev.side_fraction);
            assert!(next.top_fraction <= prev.top_fraction);
        }
        assert!(result.degrade_trace.last().is_some_and(|s| s.fit));
    }

    #[test]
    fn test_pathological_text_falls_back_to_minimum_without_image() {
        let headline = "word ".repeat(400);
        let mut req = request(320, 320, headline.trim(), "");
        req.image = Some("hero.png".to_string());
        let result = run(&req);

        assert_eq!(result.pattern, Pattern::None);
        assert!(result.image_box.is_none());
        assert_eq!(result.headline_size, 12);
        assert_eq!(result.padding, Padding::uniform(12));
        for b in result.boxes() {
            assert!(b.contained_in(320.0, 320.0), "{b:?}");
        }
    }

    // ── Placement ───────────────────────────────────────────────────────────

    #[test]
    fn test_logo_and_tag_stack_above_headline() {
        let mut req = request(1200, 675, "Launch Faster", "");
        req.logo = Some("logo.png".to_string());
        req.tag = Some("NEW".to_string());
        let result = run(&req);

        let logo = result.logo_box.expect("logo");
        let tag = result.tag_box.expect("tag");
        let pad = result.padding.y as f32;
        assert_eq!(logo.y, pad);
        assert_eq!(tag.y, pad + logo.h + 12.0);
        assert_eq!(result.headline_box.y, tag.y + tag.h + 8.0);
        assert_eq!(logo.x, result.headline_box.x);
    }

    #[test]
    fn test_logo_and_tag_stack_at_bottom() {
        let mut req = request(1200, 675, "Launch Faster", "");
        req.logo = Some("logo.png".to_string());
        req.logo_position = LogoPosition::Bottom;
        req.tag = Some("NEW".to_string());
        req.tag_position = TagPosition::Below;
        let result = run(&req);

        let logo = result.logo_box.expect("logo");
        let tag = result.tag_box.expect("tag");
        let bottom = 675.0 - result.padding.y as f32;
        assert!((logo.bottom() - bottom).abs() < 1e-3);
        assert!((tag.bottom() - (logo.y - 12.0)).abs() < 1e-3);
        assert_eq!(result.headline_box.y, result.padding.y as f32);
    }

    #[test]
    fn test_left_pattern_puts_text_right_of_image() {
        let mut req = request(1200, 675, "Launch Faster", "Ship it");
        req.image = Some("hero.png".to_string());
        req.pattern = PatternChoice::Left;
        let result = run(&req);

        let image = result.image_box.expect("image");
        assert_eq!(image.x, result.padding.x as f32);
        let expected_x = image.right() + result.image_text_gap as f32;
        assert!((result.headline_box.x - expected_x).abs() < 1e-3);
    }

    #[test]
    fn test_fill_mode_bleeds_to_anchored_edge_only() {
        let mut req = request(1920, 1080, "Launch Faster", "");
        req.image = Some("hero.png".to_string());
        req.image_padding = ImagePadding::Fill;
        let result = run(&req);

        let image = result.image_box.expect("image");
        assert!((image.right() - 1920.0).abs() < 1e-3);
        assert_eq!(image.y, result.padding.y as f32);

        req.pattern = PatternChoice::Top;
        let result = run(&req);
        let image = result.image_box.expect("image");
        assert_eq!(image.y, 0.0);
        assert_eq!(image.x, result.padding.x as f32);
    }

    #[test]
    fn test_center_align_on_portrait_uses_full_width_envelopes() {
        let mut req = request(1080, 1920, "Launch Faster", "Ship automated layouts");
        req.center_align = true;
        req.logo = Some("logo.png".to_string());
        req.tag = Some("NEW".to_string());
        let result = run(&req);

        for b in [result.headline_box, result.sub_box, result.tag_box.unwrap()] {
            assert!(b.centered);
            assert_eq!((b.x, b.w), (0.0, 1080.0));
        }
        let logo = result.logo_box.unwrap();
        assert!((logo.center_x() - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_center_align_ignored_on_landscape() {
        let mut req = request(1200, 675, "Launch Faster", "");
        req.center_align = true;
        let result = run(&req);
        assert!(!result.headline_box.centered);
        assert_eq!(result.headline_box.x, result.padding.x as f32);
    }

    #[test]
    fn test_long_copy_caps_top_band() {
        let long_sub = "This sub line is intentionally long so that it crosses the eighty character mark with room";
        let mut req = request(1080, 1920, "Launch Faster", long_sub);
        req.image = Some("hero.png".to_string());
        let result = run(&req);

        let image = result.image_box.expect("image");
        let content_h = 1920.0 - 2.0 * result.padding.y as f32;
        assert!(image.h <= (content_h * 0.40).floor() + 1e-3);
    }

    // ── Generated requests ──────────────────────────────────────────────────

    fn copy(max_words: usize) -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Z]{1,16}", 0..max_words).prop_map(|words| words.join(" "))
    }

    fn generated_request() -> impl Strategy<Value = LayoutRequest> {
        (
            (320u32..=2400, 320u32..=2400),
            ("[a-zA-Z]{1,12}", copy(30), copy(40)),
            (any::<bool>(), any::<bool>(), any::<bool>()),
            prop_oneof![
                Just(PatternChoice::Auto),
                Just(PatternChoice::Side),
                Just(PatternChoice::Left),
                Just(PatternChoice::Top),
            ],
        )
            .prop_map(|((width, height), (first, rest, sub), (image, logo, tag), pattern)| {
                let headline = format!("{first} {rest}");
                let mut req = request(width, height, headline.trim(), &sub);
                req.image = image.then(|| "https://cdn.example.com/hero.png".to_string());
                req.logo = logo.then(|| "https://cdn.example.com/logo.png".to_string());
                req.tag = tag.then(|| "NEW".to_string());
                req.pattern = pattern;
                req
            })
    }

    proptest! {
        #[test]
        fn test_generated_layouts_respect_bounds(req in generated_request()) {
            let cfg = SolverConfig::default();
            let result = run(&req);

            let max = cfg.headline_max(req.min_dim());
            prop_assert!(result.headline_size >= 12);
            prop_assert!(result.headline_size <= max, "{} > {}", result.headline_size, max);
            prop_assert!(result.sub_size >= 9);

            let (w, h) = (req.width as f32, req.height as f32);
            for b in result.boxes() {
                prop_assert!(b.contained_in(w, h), "{:?} outside {}x{}", b, w, h);
            }
        }

        #[test]
        fn test_generated_degrade_traces_are_monotonic(req in generated_request()) {
            let cfg = SolverConfig::default();
            let result = run(&req);

            prop_assert!(!result.degrade_trace.is_empty());
            prop_assert!(result.degrade_trace.len() <= cfg.max_degrade_steps + 1);
            for pair in result.degrade_trace.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                prop_assert!(next.padding.x <= prev.padding.x);
                prop_assert!(next.padding.y <= prev.padding.y);
                prop_assert!(next.side_fraction <= prev.side_fraction);
                prop_assert!(next.top_fraction <= prev.top_fraction);
            }
            if req.image.is_none() {
                prop_assert!(result.image_box.is_none());
            }
        }
    }
}
