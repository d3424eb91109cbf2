use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

pub mod models;

pub use models::{Drink, IngredientEntry};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error("connection failed: {0}")]
    Connection(sqlx::Error),
    #[error("query failed: {0}")]
    Database(sqlx::Error),
    #[error("stored recipe is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for the drinks menu: one flat table, the recipe embedded as a
/// JSON text column. Each method is a single logical transaction.
#[derive(Clone)]
pub struct DrinkStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

impl DrinkStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(StoreError::Connection)?
            .create_if_missing(true);

        // An in-memory database exists per connection, so keep exactly one
        // and never let the pool recycle it.
        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StoreError::Connection)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drinks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                recipe TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        Ok(())
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let rows: Vec<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::Database)?;
        rows.into_iter().map(Drink::try_from).collect()
    }

    pub async fn find(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::Database)?;
        row.map(Drink::try_from).transpose()
    }

    pub async fn insert(
        &self,
        title: &str,
        recipe: &[IngredientEntry],
    ) -> Result<Drink, StoreError> {
        let recipe_json = serde_json::to_string(recipe)?;
        let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?1, ?2)")
            .bind(title)
            .bind(&recipe_json)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        Ok(Drink {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            recipe: recipe.to_vec(),
        })
    }

    pub async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        let recipe_json = serde_json::to_string(&drink.recipe)?;
        let result = sqlx::query("UPDATE drinks SET title = ?1, recipe = ?2 WHERE id = ?3")
            .bind(&drink.title)
            .bind(&recipe_json)
            .bind(drink.id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn memory_store() -> DrinkStore {
        DrinkStore::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        })
        .await
        .expect("in-memory store")
    }

    fn milk() -> Vec<IngredientEntry> {
        vec![IngredientEntry {
            name: "milk".to_string(),
            color: "white".to_string(),
            parts: 1.into(),
        }]
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_the_recipe() {
        let store = memory_store().await;
        let created = store.insert("Latte", &milk()).await.unwrap();

        let found = store.find(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn duplicate_titles_are_rejected() {
        let store = memory_store().await;
        store.insert("Latte", &milk()).await.unwrap();
        assert!(matches!(
            store.insert("Latte", &milk()).await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = memory_store().await;
        let created = store.insert("Latte", &milk()).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.find(created.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(created.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
