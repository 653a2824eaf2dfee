use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pricing::Locale;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub api_keys: Vec<ApiKeyConfig>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Default locale for quote explanations
    #[serde(default)]
    pub locale: Locale,
    /// Browser origins allowed to call the API; empty disables CORS
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyConfig {
    pub key: String,
    pub name: String,
    pub enabled: bool,
}

/// Fixed-window request limit per client address
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per window (default: 100)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900 = 15 minutes)
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Key clients on the first `X-Forwarded-For` hop; only safe behind a proxy that sets it
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
            trust_forwarded_for: false,
        }
    }
}

/// Supabase (PostgREST) connection; the in-memory store is used when unset
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub service_role_key: Option<String>,
    #[serde(default = "default_supabase_timeout")]
    pub timeout_seconds: u64,
}

impl SupabaseConfig {
    /// URL and key, when both are configured and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.service_role_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_seconds() -> u64 {
    900
}

fn default_supabase_timeout() -> u64 {
    10
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from a TOML file, overridden by `NORDFLYTT__*` env vars
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .add_source(config::Environment::with_prefix("NORDFLYTT").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if !matches!(cfg.server.log_format.as_str(), "json" | "pretty") {
        anyhow::bail!(
            "Invalid log_format '{}': expected 'json' or 'pretty'",
            cfg.server.log_format
        );
    }

    for origin in &cfg.server.cors_origins {
        if axum::http::HeaderValue::from_str(origin).is_err() || !origin.starts_with("http") {
            anyhow::bail!("Invalid CORS origin '{}'", origin);
        }
    }

    if cfg.api_keys.is_empty() {
        anyhow::bail!("At least one API key must be configured");
    }

    let mut names = std::collections::HashSet::new();
    for key in &cfg.api_keys {
        if key.name.is_empty() {
            anyhow::bail!("API key name cannot be empty");
        }
        if key.key.is_empty() {
            anyhow::bail!("API key '{}' has an empty key", key.name);
        }
        if !names.insert(key.name.as_str()) {
            anyhow::bail!("API key name '{}' is duplicated", key.name);
        }
    }

    if cfg.rate_limit.enabled {
        if cfg.rate_limit.window_seconds == 0 {
            anyhow::bail!("rate_limit.window_seconds must be >= 1");
        }
        if cfg.rate_limit.max_requests == 0 {
            anyhow::bail!("rate_limit.max_requests must be >= 1");
        }
    }

    if cfg.supabase.url.is_some() != cfg.supabase.service_role_key.is_some() {
        anyhow::bail!("supabase.url and supabase.service_role_key must be set together");
    }

    if !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("metrics.endpoint must start with '/'");
    }

    Ok(())
}
