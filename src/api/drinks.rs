//! Drink API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use super::{success, ApiResult, DrinkCreated, DrinkDeleted, DrinkList, DrinkUpdated};
use crate::auth::Claims;
use crate::errors::AppError;
use crate::models::{CreateDrinkRequest, Drink, DrinkShort, UpdateDrinkRequest};
use crate::AppState;

/// GET /drinks - List all drinks in short form. Public.
pub async fn list_drinks(State(state): State<AppState>) -> ApiResult<DrinkList<DrinkShort>> {
    let drinks = state
        .repo
        .list_drinks()
        .await
        .map_err(AppError::from_store_read)?;

    success(DrinkList::new(drinks.iter().map(Drink::short).collect()))
}

/// GET /drinks-detail - List all drinks in long form.
pub async fn list_drinks_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<DrinkList<Drink>> {
    tracing::debug!(subject = ?claims.sub, "Listing drink details");

    let drinks = state
        .repo
        .list_drinks()
        .await
        .map_err(AppError::from_store_read)?;

    success(DrinkList::new(drinks))
}

/// POST /drinks - Create a new drink.
pub async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> ApiResult<DrinkCreated> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected drink body: {}", rejection.body_text());
            return Err(AppError::Unprocessable);
        }
    };
    let new_drink = request.validate().map_err(|e| {
        tracing::debug!("Invalid drink: {}", e);
        AppError::Unprocessable
    })?;

    tracing::info!(subject = ?claims.sub, "Creating drink '{}'", new_drink.title);

    let drink = state
        .repo
        .create_drink(&new_drink)
        .await
        .map_err(AppError::from_store_write)?;

    success(DrinkCreated { drinks: drink })
}

/// PATCH /drinks/{id} - Update the title and/or recipe of a drink.
pub async fn update_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> ApiResult<DrinkUpdated> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound);
    };

    let patch = match payload
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(request)| request.validate().map_err(|e| e.to_string()))
    {
        Ok(patch) => patch,
        Err(reason) => {
            tracing::debug!(drink_id = id, "Rejected drink patch: {}", reason);
            // An unknown id is still reported as such, whatever the body.
            return match state.repo.get_drink(id).await {
                Ok(Some(_)) => Err(AppError::Unprocessable),
                Ok(None) => Err(AppError::NotFound),
                Err(e) => Err(AppError::from_store_write(e)),
            };
        }
    };

    tracing::info!(subject = ?claims.sub, drink_id = id, "Updating drink");

    let drink = state
        .repo
        .update_drink(id, &patch)
        .await
        .map_err(AppError::from_store_write)?;

    success(DrinkUpdated {
        drinks: vec![drink],
    })
}

/// DELETE /drinks/{id} - Delete a drink.
pub async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DrinkDeleted> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound);
    };

    tracing::info!(subject = ?claims.sub, drink_id = id, "Deleting drink");

    state
        .repo
        .delete_drink(id)
        .await
        .map_err(AppError::from_store_read)?;

    success(DrinkDeleted { delete: id })
}
