use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::assets::{gather, GatheredAssets};
use crate::color::palette::Palette;
use crate::color::sampler::image_palette;
use crate::errors::AppError;
use crate::layout::engine::Composition;
use crate::layout::geometry::LayoutResult;
use crate::layout::request::LayoutRequest;
use crate::render::svg::to_svg;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    #[serde(flatten)]
    pub layout: LayoutRequest,
    /// Harmonize a fresh scheme instead of reconciling `colors`.
    #[serde(default)]
    pub auto_colors: bool,
    /// Palette for harmonizing and for reconciling `colors`; sampled from
    /// the decoded image when absent.
    #[serde(default)]
    pub palette: Option<Palette>,
}

#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    #[serde(flatten)]
    pub composition: Composition,
    pub svg: String,
    pub warnings: Vec<String>,
}

/// POST /api/v1/layout
pub async fn handle_compose(
    State(state): State<AppState>,
    Json(req): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    let request = req.layout.validated()?;
    let palette = req.palette.map(Palette::validated).transpose()?;
    let auto_colors = req.auto_colors;

    let GatheredAssets {
        request,
        image,
        mut warnings,
    } = gather(request, state.font_loader.as_ref(), state.decoder.clone()).await?;

    let palette = match (palette, image) {
        (Some(palette), _) => Some(palette),
        (None, Some(bitmap)) => Some(
            tokio::task::spawn_blocking(move || image_palette(&bitmap))
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("spawn_blocking failed in sampling: {e}"))
                })?,
        ),
        _ => None,
    };

    let had_image = request.has_image();
    let composition = state
        .with_engine(move |engine| engine.run(&request, palette.as_ref(), auto_colors))
        .await??;

    let layout = &composition.layout;
    if layout.headline_too_wide {
        warnings.push("headline contains a word wider than its box".to_string());
    }
    if layout.sub_too_wide {
        warnings.push("sub-line contains a word wider than its box".to_string());
    }
    if had_image && layout.image_box.is_none() {
        warnings.push("image was dropped to fit the text".to_string());
    }

    info!(
        pattern = ?layout.pattern,
        headline_size = layout.headline_size,
        warnings = warnings.len(),
        "Layout composed"
    );
    let svg = to_svg(&composition.document);
    Ok(Json(ComposeResponse {
        composition,
        svg,
        warnings,
    }))
}

/// POST /api/v1/layout/solve
/// Geometry only. Broken assets are treated as absent.
pub async fn handle_solve(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResult>, AppError> {
    let request = req.validated()?;
    let gathered = gather(request, state.font_loader.as_ref(), state.decoder.clone()).await?;
    for warning in &gathered.warnings {
        warn!("{warning}");
    }
    let request = gathered.request;
    let layout = state.with_engine(move |engine| engine.solve(&request)).await?;
    Ok(Json(layout))
}

/// DELETE /api/v1/cache
pub async fn handle_invalidate(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let cleared = state
        .with_engine(|engine| {
            let stats = engine.stats();
            engine.invalidate();
            stats
        })
        .await?;
    info!(
        metrics = cleared.metrics_entries,
        layouts = cleared.layout_entries,
        "Engine caches invalidated"
    );
    Ok(Json(json!({ "cleared": cleared })))
}
