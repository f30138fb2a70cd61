//! Drinks Catalog Backend
//!
//! A REST backend for a catalog of drinks with SQLite persistence. Recipe
//! details and all writes are gated by permissions carried in bearer tokens
//! issued by an external identity provider.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    handler::Handler,
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{permissions, PermissionGate, TokenValidator};
use config::{Config, KeySourceConfig};
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub validator: Arc<TokenValidator>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Drinks Catalog Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Token issuer: {}", config.auth.issuer);

    if let KeySourceConfig::Secret(_) = config.auth.key_source {
        tracing::warn!("Using a shared secret for token signatures (DRINKS_AUTH_SECRET); do not use in production!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path, config.reset_db).await?;
    let repo = Arc::new(Repository::new(pool));

    let validator = Arc::new(TokenValidator::from_config(&config.auth)?);

    // Create application state
    let state = AppState { repo, validator };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let validator = state.validator.clone();
    let gate = |permission| PermissionGate::new(validator.clone(), permission);

    Router::new()
        .route(
            "/drinks",
            get(api::list_drinks).post(api::create_drink.layer(middleware::from_fn_with_state(
                gate(permissions::POST_DRINKS),
                auth::require_permission,
            ))),
        )
        .route(
            "/drinks-detail",
            get(
                api::list_drinks_detail.layer(middleware::from_fn_with_state(
                    gate(permissions::GET_DRINKS_DETAIL),
                    auth::require_permission,
                )),
            ),
        )
        .route(
            "/drinks/{id}",
            patch(api::update_drink.layer(middleware::from_fn_with_state(
                gate(permissions::PATCH_DRINKS),
                auth::require_permission,
            )))
            .delete(api::delete_drink.layer(middleware::from_fn_with_state(
                gate(permissions::DELETE_DRINKS),
                auth::require_permission,
            ))),
        )
        .fallback(api::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
