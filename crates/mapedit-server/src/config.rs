use std::net::SocketAddr;

use anyhow::Context;
use http::HeaderValue;

const DEFAULT_ADDR: &str = "0.0.0.0:5098";

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `MAPEDIT_ADDR`
    pub addr: SocketAddr,
    /// `MAPEDIT_SEED`: `1` or `true` loads the bundled sample data.
    pub seed: bool,
    /// `MAPEDIT_CORS_ORIGINS`: comma separated. Empty means any origin.
    pub cors_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("MAPEDIT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("MAPEDIT_ADDR is not a socket address: {addr}"))?;

        let seed = lookup("MAPEDIT_SEED").is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let cors_origins = lookup("MAPEDIT_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin: {origin}")))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            addr,
            seed,
            cors_origins,
        })
    }
}
