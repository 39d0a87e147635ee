use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::harmonizer::ColorScheme;
use crate::color::palette::Palette;
use crate::color::sampler::dominant_colors;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HarmonizeRequest {
    pub palette: Option<Palette>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub dominant_colors: Vec<String>,
    pub palette: Palette,
}

/// POST /api/v1/colors/harmonize
pub async fn handle_harmonize(
    State(state): State<AppState>,
    Json(req): Json<HarmonizeRequest>,
) -> Result<Json<ColorScheme>, AppError> {
    let palette = req.palette.map(Palette::validated).transpose()?;
    let seed = req.seed;
    let scheme = state
        .with_engine(move |engine| engine.harmonize(palette.as_ref(), seed))
        .await?;
    Ok(Json(scheme))
}

/// GET /api/v1/colors/palettes
pub async fn handle_list_palettes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Palette>>, AppError> {
    let palettes = state
        .with_engine(|engine| engine.palettes().to_vec())
        .await?;
    Ok(Json(palettes))
}

/// POST /api/v1/colors/extract
/// Multipart upload with an `image` field.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            upload = Some(field.bytes().await.map_err(multipart_error)?);
            break;
        }
    }
    let bytes =
        upload.ok_or_else(|| AppError::Validation("multipart field 'image' is required".to_string()))?;

    let decoder = state.decoder.clone();
    let (colors, palette) = tokio::task::spawn_blocking(move || {
        let bitmap = decoder.decode_bytes(&bytes)?;
        let colors = dominant_colors(&bitmap);
        let palette = Palette::from_dominant_colors(&colors);
        Ok::<_, AppError>((colors, palette))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

    info!(colors = colors.len(), "Dominant colors extracted");
    Ok(Json(ExtractResponse {
        dominant_colors: colors,
        palette,
    }))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    }
}
