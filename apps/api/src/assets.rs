//! Asset preconditions gathered before the engine runs.
//!
//! # Architecture
//! - `FontLoader` is the async seam for font availability. `StaticFontLoader`
//!   accepts every family the static width tables know.
//! - `ImageDecoder` turns an opaque reference into a bitmap. Only base64
//!   data URIs are decoded; http(s) URLs are kept undecoded and anything
//!   else is rejected, so no server path is ever opened. Decoding is
//!   CPU-bound and runs via `tokio::task::spawn_blocking`.
//! - `gather` never fails on a bad asset: the asset is dropped from the
//!   request (so geometry treats it as absent) and a warning is returned.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::layout::font_metrics::WidthClass;
use crate::layout::request::LayoutRequest;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported data URI (only base64 payloads are accepted)")]
    UnsupportedDataUri,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported image reference (expected a data URI or an http(s) URL)")]
    UnsupportedReference,

    #[error("asset is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("font '{0}' is not available")]
    FontUnavailable(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait FontLoader: Send + Sync {
    /// Resolves once `family` can be measured accurately.
    async fn ensure_loaded(&self, family: &str) -> Result<(), AssetError>;
}

/// Accepts the families covered by the static width tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticFontLoader;

#[async_trait]
impl FontLoader for StaticFontLoader {
    async fn ensure_loaded(&self, family: &str) -> Result<(), AssetError> {
        match WidthClass::lookup(family) {
            Some(_) => Ok(()),
            None => Err(AssetError::FontUnavailable(family.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Images
// ────────────────────────────────────────────────────────────────────────────

pub trait ImageDecoder: Send + Sync {
    /// `Ok(None)` means the reference is valid but not decoded here (remote
    /// URLs): it still takes part in geometry, it just cannot be sampled.
    fn decode(&self, reference: &str) -> Result<Option<DynamicImage>, AssetError>;

    fn decode_bytes(&self, bytes: &[u8]) -> Result<DynamicImage, AssetError>;
}

/// Decodes base64 data URIs and passes http(s) URLs through.
#[derive(Debug, Clone, Copy)]
pub struct DefaultImageDecoder {
    max_bytes: usize,
}

impl DefaultImageDecoder {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    fn check_size(&self, size: usize) -> Result<(), AssetError> {
        if size > self.max_bytes {
            return Err(AssetError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl ImageDecoder for DefaultImageDecoder {
    fn decode(&self, reference: &str) -> Result<Option<DynamicImage>, AssetError> {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(None);
        }
        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, payload) = rest.split_once(',').ok_or(AssetError::UnsupportedDataUri)?;
            if !meta.ends_with(";base64") {
                return Err(AssetError::UnsupportedDataUri);
            }
            let bytes = STANDARD.decode(payload.trim())?;
            return self.decode_bytes(&bytes).map(Some);
        }
        Err(AssetError::UnsupportedReference)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<DynamicImage, AssetError> {
        self.check_size(bytes.len())?;
        Ok(image::load_from_memory(bytes)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gathering
// ────────────────────────────────────────────────────────────────────────────

// Client-facing; the decode error itself only goes to the log.
const IMAGE_DROPPED: &str = "image could not be loaded and was ignored";
const LOGO_DROPPED: &str = "logo could not be loaded and was ignored";

/// A request whose remaining asset references are usable.
pub struct GatheredAssets {
    pub request: LayoutRequest,
    /// Decoded main image, when it could be decoded locally.
    pub image: Option<DynamicImage>,
    pub warnings: Vec<String>,
}

/// Ensures fonts and decodes image/logo references for `request`.
///
/// Failed assets are removed from the returned request and reported in
/// `warnings`; only a failed blocking task is an error.
pub async fn gather(
    mut request: LayoutRequest,
    fonts: &dyn FontLoader,
    decoder: Arc<dyn ImageDecoder>,
) -> Result<GatheredAssets, AppError> {
    let mut warnings = Vec::new();

    let mut families = vec![request.font_family.clone()];
    families.extend(request.sub_font_family.clone());
    families.dedup();
    for family in families {
        if let Err(e) = fonts.ensure_loaded(&family).await {
            warn!(%family, "Font unavailable: {e}");
            warnings.push(format!("{e}; measuring with fallback metrics"));
        }
    }

    let image_ref = request.image.clone();
    let logo_ref = request.logo.clone();
    let (image, logo) = tokio::task::spawn_blocking(move || {
        let decode = |r: Option<String>| r.map(|r| decoder.decode(&r));
        (decode(image_ref), decode(logo_ref))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed while decoding assets: {e}")))?;

    let mut bitmap = None;
    match image {
        Some(Ok(decoded)) => bitmap = decoded,
        Some(Err(e)) => {
            warn!("Image dropped: {e}");
            warnings.push(IMAGE_DROPPED.to_string());
            request.image = None;
        }
        None => {}
    }
    if let Some(Err(e)) = logo {
        warn!("Logo dropped: {e}");
        warnings.push(LOGO_DROPPED.to_string());
        request.logo = None;
    }

    debug!(
        warnings = warnings.len(),
        has_bitmap = bitmap.is_some(),
        "Assets gathered"
    );
    Ok(GatheredAssets {
        request,
        image: bitmap,
        warnings,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
