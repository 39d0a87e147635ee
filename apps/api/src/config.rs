use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Glyph-width memoization entries. 0 disables the cache.
    pub metrics_cache_capacity: usize,
    /// Solved-geometry memoization entries. 0 disables the cache.
    pub layout_cache_capacity: usize,
    pub dark_theme_probability: f64,
    /// Seeds the engine's generator; entropy when unset.
    pub engine_seed: Option<u64>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            metrics_cache_capacity: 4096,
            layout_cache_capacity: 256,
            dark_theme_probability: 0.3,
            engine_seed: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let dark_theme_probability =
            parse_env("DARK_THEME_PROBABILITY", defaults.dark_theme_probability)?;
        if !(0.0..=1.0).contains(&dark_theme_probability) {
            anyhow::bail!("DARK_THEME_PROBABILITY must be between 0 and 1");
        }

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            metrics_cache_capacity: parse_env(
                "METRICS_CACHE_CAPACITY",
                defaults.metrics_cache_capacity,
            )?,
            layout_cache_capacity: parse_env(
                "LAYOUT_CACHE_CAPACITY",
                defaults.layout_cache_capacity,
            )?,
            dark_theme_probability,
            engine_seed: match std::env::var("ENGINE_SEED") {
                Ok(raw) => Some(
                    raw.parse::<u64>()
                        .context("ENGINE_SEED must be an unsigned integer")?,
                ),
                Err(_) => None,
            },
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
