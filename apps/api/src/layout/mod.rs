// Layout engine: metrics, wrapping, pattern selection, the box solver and the
// golden-ratio grid. CPU-bound work runs inside tokio::task::spawn_blocking.

pub mod cache;
pub mod engine;
pub mod font_metrics;
pub mod geometry;
pub mod grid;
pub mod handlers;
pub mod pattern;
pub mod request;
pub mod solver;
pub mod wrap;

// Re-export the public API consumed by the service layer.
pub use engine::LayoutEngine;
