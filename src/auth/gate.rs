//! Permission gate middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::AuthError;
use super::validation::{bearer_token, check_permission, Claims, TokenValidator};
use crate::errors::AppError;

/// Permission strings understood by the drinks API.
pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

/// State for [`require_permission`]: the validator and the permission to demand.
#[derive(Clone)]
pub struct PermissionGate {
    validator: Arc<TokenValidator>,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(validator: Arc<TokenValidator>, permission: &'static str) -> Self {
        Self {
            validator,
            permission,
        }
    }

    /// Validate the bearer token in `headers` and check the gate's permission.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.validator.validate(token).await?;
        check_permission(&claims, self.permission)?;
        Ok(claims)
    }
}

/// Middleware: run the wrapped handler only for callers holding the gate's permission.
///
/// On success the verified [`Claims`] are available to the handler as an
/// `Extension<Claims>`.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                kind = ?err.kind(),
                code = err.code(),
                permission = gate.permission,
                "Rejected request: {}",
                err.description()
            );
            AppError::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, KeySourceConfig};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tower::ServiceExt;

    const SECRET: &str = "gate-test-secret";

    fn gated_router() -> Router {
        let validator = Arc::new(
            TokenValidator::from_config(&AuthConfig {
                key_source: KeySourceConfig::Secret(SECRET.to_string()),
                issuer: "https://issuer.test/".to_string(),
                audience: "drinks".to_string(),
                leeway: Duration::from_secs(0),
            })
            .unwrap(),
        );

        Router::new()
            .route(
                "/secret",
                get(|Extension(claims): Extension<Claims>| async move {
                    claims.sub.unwrap_or_default()
                }),
            )
            .route_layer(middleware::from_fn_with_state(
                PermissionGate::new(validator, permissions::POST_DRINKS),
                require_permission,
            ))
    }

    fn token(permissions: Option<Vec<&str>>) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 600;
        let mut claims = json!({
            "sub": "manager|42",
            "iss": "https://issuer.test/",
            "aud": "drinks",
            "exp": exp,
        });
        if let Some(p) = permissions {
            claims["permissions"] = json!(p);
        }
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn call(auth: Option<String>) -> (StatusCode, Vec<u8>) {
        let mut builder = axum::http::Request::builder().uri("/secret");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        let resp = gated_router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_passes_claims_to_handler() {
        let (status, body) = call(Some(format!(
            "Bearer {}",
            token(Some(vec!["post:drinks"]))
        )))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"manager|42");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (status, body) = call(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Authorization header is expected.");
    }

    #[tokio::test]
    async fn test_permission_claim_absent() {
        let (status, body) = call(Some(format!("Bearer {}", token(None)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Permissions not included in JWT.");
    }

    #[tokio::test]
    async fn test_permission_not_granted() {
        let (status, body) = call(Some(format!(
            "Bearer {}",
            token(Some(vec!["get:drinks-detail"]))
        )))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Permission not found.");
    }
}
