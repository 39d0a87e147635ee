pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::color::handlers as color;
use crate::layout::handlers as layout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Room for base64 data URIs in JSON bodies.
    let body_limit = state.config.max_upload_bytes.saturating_mul(2);
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout", post(layout::handle_compose))
        .route("/api/v1/layout/solve", post(layout::handle_solve))
        .route("/api/v1/cache", delete(layout::handle_invalidate))
        // Color API
        .route("/api/v1/colors/palettes", get(color::handle_list_palettes))
        .route("/api/v1/colors/harmonize", post(color::handle_harmonize))
        .route("/api/v1/colors/extract", post(color::handle_extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assets::{DefaultImageDecoder, StaticFontLoader};
    use crate::config::Config;
    use crate::layout::LayoutEngine;

    fn app() -> Router {
        let config = Config {
            engine_seed: Some(1),
            ..Config::default()
        };
        build_router(AppState {
            engine: Arc::new(Mutex::new(LayoutEngine::new(&config))),
            font_loader: Arc::new(StaticFontLoader),
            decoder: Arc::new(DefaultImageDecoder::new(config.max_upload_bytes)),
            config,
        })
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn png(rgba: [u8; 4]) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(rgba)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "headliner-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/api/v1/colors/extract")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    // ── Health ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "headliner");
    }

    // ── Layout ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_compose_returns_layout_document_and_svg() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({
                    "headline": "Launch faster with layouts that fit",
                    "sub": "Sized, wrapped and placed for every canvas",
                    "tag": "New"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["layout"]["headline_size"].as_u64().unwrap() >= 12);
        assert!(!body["document"]["primitives"].as_array().unwrap().is_empty());
        assert!(body["svg"].as_str().unwrap().contains("<svg"));
        assert_eq!(body["colors"]["background"], "#ffffff");
        assert_eq!(body["warnings"], json!([]));
    }

    #[tokio::test]
    async fn test_compose_rejects_blank_headline() {
        let (status, body) = send(
            app(),
            json_request("POST", "/api/v1/layout", json!({ "headline": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_compose_rejects_malformed_color() {
        let (status, _) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({ "headline": "Hello", "colors": { "background": "white" } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compose_drops_undecodable_image_with_warning() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({ "headline": "Hello world", "image": "data:image/png;base64,!!!" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["layout"]["image_box"].is_null());
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_compose_never_opens_server_paths() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({ "headline": "Hello world", "image": "/etc/passwd", "logo": "../logo.png" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["layout"]["image_box"].is_null());
        assert!(body["layout"]["logo_box"].is_null());
        let warnings = body["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 2);
        for warning in warnings {
            let text = warning.as_str().unwrap();
            assert!(!text.contains("/etc") && !text.contains("logo.png"), "{text}");
        }
    }

    #[tokio::test]
    async fn test_compose_reconciles_tag_from_image_palette() {
        // #3cb4b4 sits in the mid luminance band and separates from white.
        let image = format!("data:image/png;base64,{}", STANDARD.encode(png([60, 180, 180, 255])));
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({
                    "headline": "Hello world",
                    "tag": "New",
                    "image": image,
                    "colors": { "tag_background": "#fefefe" }
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["colors"]["palette"], "image");
        assert_eq!(body["colors"]["background"], "#ffffff");
        assert_eq!(body["colors"]["text"], "#111111");
        assert_eq!(body["colors"]["tag_background"], "#3cb4b4");
    }

    #[tokio::test]
    async fn test_solve_returns_geometry_only() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout/solve",
                json!({ "headline": "Hello world", "width": 100, "height": 100 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["width"], 320);
        assert!(body.get("headline_box").is_some());
        assert!(body.get("svg").is_none());
    }

    #[tokio::test]
    async fn test_invalidate_reports_cleared_entries() {
        let app = app();
        send(
            app.clone(),
            json_request("POST", "/api/v1/layout/solve", json!({ "headline": "Hello" })),
        )
        .await;
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/v1/cache")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"]["layout_entries"], 1);
    }

    // ── Colors ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_harmonize_is_reproducible_with_seed() {
        let body = json!({ "seed": 11 });
        let (status, first) = send(
            app(),
            json_request("POST", "/api/v1/colors/harmonize", body.clone()),
        )
        .await;
        let (_, second) = send(app(), json_request("POST", "/api/v1/colors/harmonize", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert!(first["palette"].is_string());
    }

    #[tokio::test]
    async fn test_list_palettes_returns_catalog() {
        let request = Request::builder()
            .uri("/api/v1/colors/palettes")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        let palettes = body.as_array().unwrap();
        assert_eq!(palettes.len(), 6);
        assert_eq!(palettes[0]["source"], "predefined");
    }

    #[tokio::test]
    async fn test_unknown_grid_template_is_rejected() {
        let (status, _) = send(
            app(),
            json_request(
                "POST",
                "/api/v1/layout",
                json!({ "headline": "Hello", "composition": "grid", "grid_template": "nope" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_samples_uploaded_image() {
        let (status, body) = send(app(), multipart_request("image", &png([200, 40, 60, 255]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dominant_colors"][0], "#c8283c");
        assert_eq!(body["palette"]["source"], "image");
    }

    #[tokio::test]
    async fn test_extract_requires_image_field() {
        let (status, body) = send(app(), multipart_request("file", &png([0, 0, 0, 255]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
