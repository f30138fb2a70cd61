//! Configuration module for the drinks backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Audience used when `DRINKS_API_AUDIENCE` is unset.
pub const DEFAULT_AUDIENCE: &str = "drinks";

/// Where token signing keys come from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySourceConfig {
    /// Issuer's published key set (RS256)
    Jwks(Url),
    /// Shared HS256 secret, for local development
    Secret(String),
}

impl std::fmt::Debug for KeySourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySourceConfig::Jwks(uri) => f.debug_tuple("Jwks").field(&uri.as_str()).finish(),
            KeySourceConfig::Secret(_) => f.write_str("Secret(<redacted>)"),
        }
    }
}

/// Token validation settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub key_source: KeySourceConfig,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Clock skew tolerated on `exp`
    pub leeway: Duration,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Drop, recreate and seed the drinks table at startup
    pub reset_db: bool,
    pub auth: AuthConfig,
}

/// Invalid or incomplete configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { var: &'static str, reason: String },
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { var, reason } => write!(f, "invalid {}: {}", var, reason),
            ConfigError::Missing(what) => write!(f, "missing configuration: {}", what),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DRINKS_DB_PATH")
            .unwrap_or_else(|| "./data/drinks.sqlite".to_string())
            .into();

        let bind_addr = lookup("DRINKS_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "DRINKS_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = lookup("DRINKS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let reset_db = lookup("DRINKS_RESET_DB")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth = AuthConfig::from_lookup(&lookup)?;

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            reset_db,
            auth,
        })
    }
}

impl AuthConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = lookup("DRINKS_AUTH_DOMAIN")
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .filter(|d| !d.is_empty());

        let jwks_uri = match lookup("DRINKS_AUTH_JWKS_URI") {
            Some(raw) => Some(parse_url("DRINKS_AUTH_JWKS_URI", &raw)?),
            None => match &domain {
                Some(d) => Some(parse_url(
                    "DRINKS_AUTH_DOMAIN",
                    &format!("https://{}/.well-known/jwks.json", d),
                )?),
                None => None,
            },
        };

        let key_source = match (jwks_uri, lookup("DRINKS_AUTH_SECRET")) {
            (Some(uri), _) => {
                if uri.scheme() != "https" {
                    tracing::warn!("JWKS URI '{}' is not HTTPS", uri);
                }
                KeySourceConfig::Jwks(uri)
            }
            (None, Some(secret)) if !secret.is_empty() => KeySourceConfig::Secret(secret),
            _ => {
                return Err(ConfigError::Missing(
                    "DRINKS_AUTH_DOMAIN, DRINKS_AUTH_JWKS_URI or DRINKS_AUTH_SECRET",
                ))
            }
        };

        let issuer = lookup("DRINKS_AUTH_ISSUER")
            .or_else(|| domain.as_ref().map(|d| format!("https://{}/", d)))
            .ok_or(ConfigError::Missing("DRINKS_AUTH_ISSUER or DRINKS_AUTH_DOMAIN"))?;

        let audience =
            lookup("DRINKS_API_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());

        let leeway = match lookup("DRINKS_AUTH_LEEWAY_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(
                |e: std::num::ParseIntError| ConfigError::Invalid {
                    var: "DRINKS_AUTH_LEEWAY_SECS",
                    reason: e.to_string(),
                },
            )?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            key_source,
            issuer,
            audience,
            leeway,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
