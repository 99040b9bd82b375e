use serde::Deserialize;

use crate::scoring::{ScoringThresholds, DEFAULT_HOT_THRESHOLD, DEFAULT_WARM_THRESHOLD};

/// Default lifetime of a cached permission set, in seconds.
pub const DEFAULT_PERMISSION_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Base URL of the hosted backend (auth endpoints live under `/auth/v1`).
    pub auth_base_url: String,
    /// Public API key sent as the `apikey` header on every backend call.
    pub auth_api_key: String,
    pub hot_threshold: u32,
    pub warm_threshold: u32,
    pub permission_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            auth_base_url: std::env::var("AUTH_BASE_URL")
                .map_err(|_| anyhow::anyhow!("AUTH_BASE_URL environment variable required"))
                .and_then(|raw| {
                    if raw.trim().is_empty() {
                        anyhow::bail!("AUTH_BASE_URL cannot be empty");
                    }
                    let parsed = url::Url::parse(raw.trim())
                        .map_err(|e| anyhow::anyhow!("AUTH_BASE_URL is not a valid URL: {}", e))?;
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        anyhow::bail!("AUTH_BASE_URL must start with http:// or https://");
                    }
                    Ok(raw.trim().trim_end_matches('/').to_string())
                })?,
            auth_api_key: std::env::var("AUTH_API_KEY")
                .map_err(|_| anyhow::anyhow!("AUTH_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("AUTH_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            hot_threshold: parse_var("LEAD_HOT_THRESHOLD", DEFAULT_HOT_THRESHOLD)?,
            warm_threshold: parse_var("LEAD_WARM_THRESHOLD", DEFAULT_WARM_THRESHOLD)?,
            permission_cache_ttl_secs: parse_var(
                "PERMISSION_CACHE_TTL_SECS",
                DEFAULT_PERMISSION_CACHE_TTL_SECS,
            )?,
        };

        config.scoring_thresholds()?;
        if config.permission_cache_ttl_secs == 0 {
            anyhow::bail!("PERMISSION_CACHE_TTL_SECS must be greater than zero");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Auth Base URL: {}", config.auth_base_url);
        tracing::debug!(
            "Lead thresholds: hot >= {}, warm >= {}",
            config.hot_threshold,
            config.warm_threshold
        );
        tracing::debug!(
            "Permission cache TTL: {}s",
            config.permission_cache_ttl_secs
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Classification thresholds, validated so that warm never exceeds hot.
    pub fn scoring_thresholds(&self) -> anyhow::Result<ScoringThresholds> {
        ScoringThresholds::new(self.hot_threshold, self.warm_threshold).ok_or_else(|| {
            anyhow::anyhow!(
                "LEAD_WARM_THRESHOLD ({}) cannot exceed LEAD_HOT_THRESHOLD ({})",
                self.warm_threshold,
                self.hot_threshold
            )
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer", name)),
        _ => Ok(default),
    }
}
