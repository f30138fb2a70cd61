//! Authentication and authorization failures.

/// What went wrong while authenticating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No usable `Authorization: Bearer <token>` header
    MissingToken,
    /// Token header unreadable, or signature verification failed
    InvalidHeader,
    /// No signing key matches the token's key id
    InvalidKey,
    /// Token `exp` is in the past
    TokenExpired,
    /// Issuer, audience or permissions claim is wrong or missing
    InvalidClaims,
    /// Token is valid but lacks the required permission
    UnauthorizedPermission,
}

/// An authentication error carrying a machine code and a client-facing description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    kind: AuthErrorKind,
    code: &'static str,
    description: &'static str,
}

impl AuthError {
    const fn new(kind: AuthErrorKind, code: &'static str, description: &'static str) -> Self {
        Self {
            kind,
            code,
            description,
        }
    }

    pub fn header_missing() -> Self {
        Self::new(
            AuthErrorKind::MissingToken,
            "authorization_header_missing",
            "Authorization header is expected.",
        )
    }

    pub fn not_bearer() -> Self {
        Self::new(
            AuthErrorKind::MissingToken,
            "invalid_header",
            "Authorization header must start with \"Bearer\".",
        )
    }

    pub fn token_not_found() -> Self {
        Self::new(
            AuthErrorKind::MissingToken,
            "invalid_header",
            "Token not found.",
        )
    }

    pub fn malformed_header() -> Self {
        Self::new(
            AuthErrorKind::MissingToken,
            "invalid_header",
            "Authorization header must be bearer token.",
        )
    }

    pub fn unparsable_token() -> Self {
        Self::new(
            AuthErrorKind::InvalidHeader,
            "invalid_header",
            "Unable to parse authentication token.",
        )
    }

    pub fn missing_key_id() -> Self {
        Self::new(
            AuthErrorKind::InvalidHeader,
            "invalid_header",
            "Authorization malformed.",
        )
    }

    pub fn key_not_found() -> Self {
        Self::new(
            AuthErrorKind::InvalidKey,
            "invalid_header",
            "Unable to find the appropriate key.",
        )
    }

    pub fn expired() -> Self {
        Self::new(
            AuthErrorKind::TokenExpired,
            "token_expired",
            "Token expired.",
        )
    }

    pub fn incorrect_claims() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "invalid_claims",
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub fn permissions_missing() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "invalid_claims",
            "Permissions not included in JWT.",
        )
    }

    pub fn permission_not_found() -> Self {
        Self::new(
            AuthErrorKind::UnauthorizedPermission,
            "unauthorized",
            "Permission not found.",
        )
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for AuthError {}
