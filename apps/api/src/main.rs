mod assets;
mod color;
mod config;
mod errors;
mod layout;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assets::{DefaultImageDecoder, StaticFontLoader};
use crate::config::Config;
use crate::layout::LayoutEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Headliner API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the layout engine (metrics + geometry caches, seeded RNG)
    let engine = LayoutEngine::new(&config);
    info!(
        "Dark theme probability: {:.2}, upload limit: {} bytes",
        config.dark_theme_probability, config.max_upload_bytes
    );

    // Build app state
    let state = AppState {
        engine: Arc::new(Mutex::new(engine)),
        font_loader: Arc::new(StaticFontLoader),
        decoder: Arc::new(DefaultImageDecoder::new(config.max_upload_bytes)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
