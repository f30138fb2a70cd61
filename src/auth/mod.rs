//! Bearer token authentication and permission gating.
//!
//! Tokens are JWTs issued by an external identity provider. Signatures are
//! checked against the issuer's published key set; the `permissions` claim
//! decides which gated routes a caller may use.

mod error;
mod gate;
mod jwks;
mod validation;

pub use error::AuthError;
pub use gate::{permissions, require_permission, PermissionGate};
pub use validation::{Claims, TokenValidator};
