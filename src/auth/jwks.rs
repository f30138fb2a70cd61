//! Issuer key set (JWKS) fetching and caching.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::DecodingKey;
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Upper bound on a JWKS document body.
const MAX_JWKS_BYTES: u64 = 512 * 1024;

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Failure to obtain the issuer's key set.
#[derive(Debug)]
pub enum JwksError {
    Http(reqwest::Error),
    TooLarge(u64),
}

impl std::fmt::Display for JwksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwksError::Http(err) => write!(f, "JWKS request failed: {}", err),
            JwksError::TooLarge(len) => write!(f, "JWKS response too large: {} bytes", len),
        }
    }
}

impl std::error::Error for JwksError {}

impl From<reqwest::Error> for JwksError {
    fn from(err: reqwest::Error) -> Self {
        JwksError::Http(err)
    }
}

/// Resolves key ids to RSA decoding keys, refreshing from the issuer on a miss.
#[derive(Clone)]
pub struct JwksProvider {
    cache: Cache<String, Arc<DecodingKey>>,
    client: Client,
    jwks_uri: Url,
}

impl JwksProvider {
    pub fn new(jwks_uri: Url) -> Result<Self, JwksError> {
        Ok(Self {
            cache: Cache::builder()
                .max_capacity(100)
                .time_to_live(Duration::from_secs(3600))
                .build(),
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .user_agent(concat!("drinks-backend/", env!("CARGO_PKG_VERSION")))
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            jwks_uri,
        })
    }

    /// Look up the key for `kid`. `Ok(None)` means the issuer does not publish it.
    pub async fn get_key(&self, kid: &str) -> Result<Option<Arc<DecodingKey>>, JwksError> {
        if let Some(key) = self.cache.get(kid) {
            return Ok(Some(key));
        }

        self.refresh().await?;

        Ok(self.cache.get(kid))
    }

    async fn refresh(&self) -> Result<(), JwksError> {
        tracing::info!(event = "jwks_refresh", uri = %self.jwks_uri);
        let resp = self
            .client
            .get(self.jwks_uri.clone())
            .send()
            .await?
            .error_for_status()?;

        if let Some(len) = resp.content_length() {
            if len > MAX_JWKS_BYTES {
                return Err(JwksError::TooLarge(len));
            }
        }

        let jwks: JwksResponse = resp.json().await?;

        for key in jwks.keys {
            if key.kty != "RSA" {
                tracing::debug!(kid = %key.kid, kty = %key.kty, "Skipping non-RSA key");
                continue;
            }
            if let (Some(n), Some(e)) = (&key.n, &key.e) {
                match DecodingKey::from_rsa_components(n, e) {
                    Ok(decoding_key) => {
                        self.cache.insert(key.kid.clone(), Arc::new(decoding_key));
                    }
                    Err(err) => {
                        tracing::warn!(kid = %key.kid, "Ignoring unusable RSA key: {}", err);
                    }
                }
            }
        }

        Ok(())
    }
}
