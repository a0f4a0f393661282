use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use api::auth::AuthConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub jwt_secret: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("BIND")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.into());
        let bind = bind
            .trim()
            .parse()
            .with_context(|| format!("invalid BIND address {bind}"))?;

        let jwt_secret = lookup("AUTH_JWT_SECRET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let otlp_endpoint = lookup("OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind,
            jwt_secret,
            cors_allowed_origins,
            otlp_endpoint,
        })
    }

    /// Token verification settings; serving without a secret is refused.
    pub fn auth(&self) -> Result<AuthConfig> {
        let secret = self
            .jwt_secret
            .clone()
            .ok_or_else(|| anyhow!("AUTH_JWT_SECRET missing"))?;
        Ok(AuthConfig::new(secret))
    }
}
