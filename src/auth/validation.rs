//! Bearer token extraction and verification.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::jwks::{JwksError, JwksProvider};
use crate::config::{AuthConfig, KeySourceConfig};

/// Decoded claim set of a verified token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<serde_json::Value>, // string or array
    pub exp: u64,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

enum KeySource {
    Jwks(JwksProvider),
    Static {
        key: Arc<DecodingKey>,
        algorithm: Algorithm,
    },
}

/// Verifies tokens against the issuer's keys, expected issuer and audience.
pub struct TokenValidator {
    keys: KeySource,
    issuer: String,
    audience: String,
    leeway: u64,
}

impl TokenValidator {
    pub fn from_config(config: &AuthConfig) -> Result<Self, JwksError> {
        let keys = match &config.key_source {
            KeySourceConfig::Jwks(uri) => KeySource::Jwks(JwksProvider::new(uri.clone())?),
            KeySourceConfig::Secret(secret) => KeySource::Static {
                key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
                algorithm: Algorithm::HS256,
            },
        };

        Ok(Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway: config.leeway.as_secs(),
        })
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::unparsable_token())?;

        let (key, algorithm) = match &self.keys {
            KeySource::Jwks(provider) => {
                let kid = header.kid.as_deref().ok_or_else(AuthError::missing_key_id)?;
                let key = match provider.get_key(kid).await {
                    Ok(Some(key)) => key,
                    Ok(None) => return Err(AuthError::key_not_found()),
                    Err(e) => {
                        tracing::warn!("Failed to fetch signing keys: {}", e);
                        return Err(AuthError::key_not_found());
                    }
                };
                (key, Algorithm::RS256)
            }
            KeySource::Static { key, algorithm } => (key.clone(), *algorithm),
        };

        // Never let the token pick its own algorithm.
        if header.alg != algorithm {
            return Err(AuthError::unparsable_token());
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::expired(),
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::MissingRequiredClaim(_) => AuthError::incorrect_claims(),
                _ => AuthError::unparsable_token(),
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?
        .to_str()
        .map_err(|_| AuthError::malformed_header())?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::not_bearer()),
        [_] => Err(AuthError::token_not_found()),
        [_, token] => Ok(*token),
        _ => Err(AuthError::malformed_header()),
    }
}

/// Require `permission` in the token's `permissions` claim.
pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or_else(AuthError::permissions_missing)?;

    if permissions.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::permission_not_found())
    }
}
