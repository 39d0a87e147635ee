//! `LayoutEngine`: the stateful owner of caches, configuration and randomness.
//!
//! Everything below the engine is pure. The engine adds memoization (glyph
//! widths and fixed-composition geometry), the solver configuration and a
//! seedable generator for shuffled/grid compositions and themed colors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::color::contrast::ColorError;
use crate::color::harmonizer::{ColorScheme, Harmonizer};
use crate::color::palette::Palette;
use crate::config::Config;
use crate::layout::cache::{BoundedCache, MetricsCache};
use crate::layout::font_metrics::{GlyphMetrics, StaticGlyphMetrics};
use crate::layout::geometry::LayoutResult;
use crate::layout::grid::{layout_grid, pick_template, template_by_name};
use crate::layout::pattern::{choose, choose_shuffled};
use crate::layout::request::{CompositionMode, GeometryKey, LayoutRequest, ParsedColors};
use crate::layout::solver::{solve, SolverConfig};
use crate::render::composer::{compose, VectorDocument};

/// Layout, colors and document for one request.
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub layout: LayoutResult,
    pub colors: ColorScheme,
    pub document: VectorDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub metrics_entries: usize,
    pub metrics_hits: u64,
    pub metrics_misses: u64,
    pub layout_entries: usize,
    pub layout_hits: u64,
    pub layout_misses: u64,
}

pub struct LayoutEngine<M: GlyphMetrics = StaticGlyphMetrics> {
    metrics: MetricsCache<M>,
    layouts: BoundedCache<GeometryKey, LayoutResult>,
    layout_hits: u64,
    layout_misses: u64,
    config: SolverConfig,
    harmonizer: Harmonizer,
    rng: StdRng,
}

impl LayoutEngine {
    /// Engine with the static width tables.
    pub fn new(config: &Config) -> Self {
        Self::with_metrics(StaticGlyphMetrics, config)
    }
}

impl<M: GlyphMetrics> LayoutEngine<M> {
    pub fn with_metrics(provider: M, config: &Config) -> Self {
        let rng = match config.engine_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let harmonizer = Harmonizer::new(config.dark_theme_probability);
        info!(
            metrics_capacity = config.metrics_cache_capacity,
            layout_capacity = config.layout_cache_capacity,
            dark_theme_probability = harmonizer.dark_theme_probability(),
            seeded = config.engine_seed.is_some(),
            "Layout engine initialized"
        );
        Self {
            metrics: MetricsCache::new(provider, config.metrics_cache_capacity),
            layouts: BoundedCache::new(config.layout_cache_capacity),
            layout_hits: 0,
            layout_misses: 0,
            config: SolverConfig::default(),
            harmonizer,
            rng,
        }
    }

    /// Replaces the solver constants. Both caches are cleared.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        debug!(
            metrics = self.metrics.len(),
            layouts = self.layouts.len(),
            "Invalidating engine caches"
        );
        self.metrics.clear();
        self.layouts.clear();
    }

    pub fn palettes(&self) -> &[Palette] {
        self.harmonizer.catalog()
    }

    pub fn stats(&self) -> EngineStats {
        let (metrics_hits, metrics_misses) = self.metrics.stats();
        EngineStats {
            metrics_entries: self.metrics.len(),
            metrics_hits,
            metrics_misses,
            layout_entries: self.layouts.len(),
            layout_hits: self.layout_hits,
            layout_misses: self.layout_misses,
        }
    }

    /// Per-call generator: the request seed when given, otherwise a draw from
    /// the engine's own generator.
    fn request_rng(&mut self, seed: Option<u64>) -> StdRng {
        StdRng::seed_from_u64(seed.unwrap_or_else(|| self.rng.gen()))
    }

    /// Solves geometry for a validated request.
    pub fn solve(&mut self, request: &LayoutRequest) -> LayoutResult {
        let mut rng = self.request_rng(request.seed);
        self.solve_with(request, &mut rng)
    }

    fn solve_with(&mut self, request: &LayoutRequest, rng: &mut StdRng) -> LayoutResult {
        match request.composition {
            CompositionMode::Fixed => {
                let key = request.geometry_key();
                if let Some(hit) = self.layouts.get(&key) {
                    self.layout_hits += 1;
                    let mut result = hit.clone();
                    result.style.colors = request.colors.clone();
                    return result;
                }
                self.layout_misses += 1;
                let pattern = choose(request.pattern, request.aspect(), request.has_image());
                let result = solve(request, pattern, &self.config, &mut self.metrics);
                self.layouts.insert(key, result.clone());
                result
            }
            CompositionMode::Shuffled => {
                let pattern =
                    choose_shuffled(request.pattern, request.aspect(), request.has_image(), rng);
                solve(request, pattern, &self.config, &mut self.metrics)
            }
            CompositionMode::Grid => {
                let template = request
                    .grid_template
                    .as_deref()
                    .and_then(template_by_name)
                    .unwrap_or_else(|| pick_template(rng));
                debug!(template = template.name, "Grid template picked");
                layout_grid(request, template, &self.config, &mut self.metrics)
            }
        }
    }

    pub fn compose(&mut self, layout: &LayoutResult, colors: &ColorScheme) -> VectorDocument {
        compose(layout, colors, &mut self.metrics)
    }

    /// Fresh scheme from `palette` (or a random catalog palette).
    pub fn harmonize(&mut self, palette: Option<&Palette>, seed: Option<u64>) -> ColorScheme {
        let mut rng = self.request_rng(seed);
        self.harmonizer.harmonize(palette, &mut rng)
    }

    /// Caller-chosen colors with contrast enforced.
    pub fn reconcile(&self, requested: &ParsedColors, palette: Option<&Palette>) -> ColorScheme {
        self.harmonizer.reconcile(requested, palette)
    }

    /// Full pipeline: geometry, colors, document.
    ///
    /// With `auto_colors` the scheme is harmonized and echoed into the layout;
    /// otherwise the request colors are reconciled.
    pub fn run(
        &mut self,
        request: &LayoutRequest,
        palette: Option<&Palette>,
        auto_colors: bool,
    ) -> Result<Composition, ColorError> {
        let mut rng = self.request_rng(request.seed);
        let mut layout = self.solve_with(request, &mut rng);
        let colors = if auto_colors {
            self.harmonizer.harmonize(palette, &mut rng)
        } else {
            self.reconcile(&request.colors.parse()?, palette)
        };
        layout.style.colors = colors.fields();
        let document = self.compose(&layout, &colors);
        debug!(
            pattern = ?layout.pattern,
            headline_size = layout.headline_size,
            primitives = document.primitives.len(),
            "Composition complete"
        );
        Ok(Composition {
            layout,
            colors,
            document,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
