//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for the drinks catalog.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Title of the drink inserted when the table is reset.
pub const SEED_TITLE: &str = "water";
const SEED_RECIPE: &str = r#"[{"name": "water", "color": "blue", "parts": 1}]"#;

/// Initialize the database connection pool and create the schema.
///
/// With `reset` the drinks table is dropped, recreated and seeded.
pub async fn init_database(db_path: &Path, reset: bool) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if reset {
        drop_and_create_all(&pool).await?;
    } else {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Create tables if they don't exist.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drinks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            recipe TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Drop the drinks table and start again from a single seed drink.
async fn drop_and_create_all(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::warn!("Resetting drinks table; all existing drinks are removed");

    sqlx::query("DROP TABLE IF EXISTS drinks")
        .execute(pool)
        .await?;
    run_migrations(pool).await?;

    sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
        .bind(SEED_TITLE)
        .bind(SEED_RECIPE)
        .execute(pool)
        .await?;

    Ok(())
}
