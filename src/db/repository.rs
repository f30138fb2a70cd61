//! Database repository for drink CRUD operations.
//!
//! Every write runs as a single statement or inside one transaction.

use sqlx::{Row, SqlitePool};

use crate::errors::StoreError;
use crate::models::{Drink, DrinkPatch, Ingredient, NewDrink};

/// Database repository for all drink operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all drinks, oldest first.
    pub async fn list_drinks(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(drink_from_row).collect()
    }

    /// Get a drink by ID.
    pub async fn get_drink(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let row = sqlx::query("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(drink_from_row).transpose()
    }

    /// Create a new drink.
    pub async fn create_drink(&self, drink: &NewDrink) -> Result<Drink, StoreError> {
        let recipe_json = serde_json::to_string(&drink.recipe)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(&drink.title)
            .bind(&recipe_json)
            .execute(&mut *tx)
            .await?;
        let id = result.last_insert_rowid();

        tx.commit().await?;

        tracing::info!(drink_id = id, "Created drink '{}'", drink.title);

        Ok(Drink {
            id,
            title: drink.title.clone(),
            recipe: drink.recipe.clone(),
        })
    }

    /// Apply a partial update. Fields absent from `patch` keep their values.
    pub async fn update_drink(&self, id: i64, patch: &DrinkPatch) -> Result<Drink, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut drink = row
            .as_ref()
            .map(drink_from_row)
            .transpose()?
            .ok_or(StoreError::NotFound)?;

        if patch.is_empty() {
            tx.commit().await?;
            return Ok(drink);
        }

        patch.apply(&mut drink);
        let recipe_json = serde_json::to_string(&drink.recipe)?;

        let result = sqlx::query("UPDATE drinks SET title = ?, recipe = ? WHERE id = ?")
            .bind(&drink.title)
            .bind(&recipe_json)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        tracing::info!(drink_id = id, "Updated drink");
        Ok(drink)
    }

    /// Delete a drink.
    pub async fn delete_drink(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(drink_id = id, "Deleted drink");
        Ok(())
    }
}

fn drink_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Drink, StoreError> {
    let id: i64 = row.get("id");
    let recipe_str: String = row.get("recipe");
    let recipe: Vec<Ingredient> = serde_json::from_str(&recipe_str).map_err(|e| {
        StoreError::CorruptRecipe(format!("drink {}: {}", id, e))
    })?;

    Ok(Drink {
        id,
        title: row.get("title"),
        recipe,
    })
}
