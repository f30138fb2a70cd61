//! REST API module.
//!
//! Contains the drinks routes and the JSON envelopes they answer with.

mod drinks;

pub use drinks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Drink;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Body of the two listing routes.
///
/// Existing clients read the misspelled `sucess` flag on listings, so it is
/// sent alongside `success`.
#[derive(Debug, Serialize)]
pub struct DrinkList<T: Serialize> {
    pub sucess: bool,
    pub drinks: Vec<T>,
}

impl<T: Serialize> DrinkList<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            sucess: true,
            drinks,
        }
    }
}

/// Body of `POST /drinks`.
#[derive(Debug, Serialize)]
pub struct DrinkCreated {
    pub drinks: Drink,
}

/// Body of `PATCH /drinks/{id}`.
#[derive(Debug, Serialize)]
pub struct DrinkUpdated {
    pub drinks: Vec<Drink>,
}

/// Body of `DELETE /drinks/{id}`.
#[derive(Debug, Serialize)]
pub struct DrinkDeleted {
    pub delete: i64,
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
