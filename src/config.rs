use std::time::Duration;

use anyhow::{Context, Result};

use crate::registry::dockerhub::DEFAULT_BASE_URL;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Base URL of the registry API used for size lookups
    pub registry_url: String,
    /// Applied to every outbound request
    pub http_timeout: Duration,
    /// Fail document loads on non-2xx responses
    pub strict_fetch: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            registry_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            strict_fetch: false,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `REGISTRY_URL`, `HTTP_TIMEOUT_SECS` and `STRICT_FETCH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or empty variables keep their defaults; anything else must parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(port) = var("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {port}"))?;
        }
        if let Some(url) = var("REGISTRY_URL") {
            cfg.registry_url = url;
        }
        if let Some(secs) = var("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid HTTP_TIMEOUT_SECS: {secs}"))?;
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = var("STRICT_FETCH") {
            cfg.strict_fetch = parse_flag(&flag)
                .with_context(|| format!("Invalid STRICT_FETCH: {flag}"))?;
        }

        Ok(cfg)
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
