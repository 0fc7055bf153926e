use super::{DrinkRepository, RepositoryError};
use crate::config::DatabaseConfig;
use crate::models::{Drink, DrinkUpdate, Ingredient, NewDrink};
use async_trait::async_trait;
use log::{info, warn};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

type DrinkRow = (i64, String, String);

/// Drinks stored in a single SQLite table, recipes kept as JSON text
#[derive(Clone)]
pub struct SqliteDrinkRepository {
    pool: SqlitePool,
}

impl SqliteDrinkRepository {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        // In-memory databases live as long as their connection, so pooled
        // connections are never recycled.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    /// Creates the drinks table if needed. With `reset`, any existing table is
    /// dropped first and a single sample drink is inserted.
    pub async fn initialize(&self, reset: bool) -> Result<(), RepositoryError> {
        if reset {
            warn!("Resetting drinks table, all stored drinks are dropped");
            sqlx::query("DROP TABLE IF EXISTS drinks")
                .execute(&self.pool)
                .await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drinks (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL UNIQUE,
                recipe TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        if reset {
            let water = self
                .create(NewDrink {
                    id: None,
                    title: "water".to_string(),
                    recipe: vec![Ingredient {
                        name: "water".to_string(),
                        color: "blue".to_string(),
                        parts: 1,
                    }],
                })
                .await?;
            info!("Seeded drinks table with '{}'", water.title);
        }
        Ok(())
    }

    fn to_drink((id, title, recipe): DrinkRow) -> Result<Drink, RepositoryError> {
        let recipe: Vec<Ingredient> = serde_json::from_str(&recipe)?;
        Ok(Drink { id, title, recipe })
    }
}

#[async_trait]
impl DrinkRepository for SqliteDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        let rows: Vec<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::to_drink).collect()
    }

    async fn get(&self, id: i64) -> Result<Drink, RepositoryError> {
        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Self::to_drink)
            .unwrap_or(Err(RepositoryError::NotFound(id)))
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        // One statement, so the id check and the insert share a write lock
        let result = sqlx::query(
            "INSERT INTO drinks (id, title, recipe)
             SELECT ?1, ?2, ?3
             WHERE ?1 IS NULL OR NOT EXISTS (SELECT 1 FROM drinks WHERE id = ?1)",
        )
        .bind(drink.id)
        .bind(&drink.title)
        .bind(&recipe)
        .execute(&self.pool)
        .await?;

        let id = match (result.rows_affected(), drink.id) {
            (0, Some(id)) => return Err(RepositoryError::DuplicateId(id)),
            _ => result.last_insert_rowid(),
        };

        Ok(Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        })
    }

    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, RepositoryError> {
        let recipe = update
            .recipe
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row: Option<DrinkRow> = sqlx::query_as(
            "UPDATE drinks
             SET title = COALESCE(?, title), recipe = COALESCE(?, recipe)
             WHERE id = ?
             RETURNING id, title, recipe",
        )
        .bind(update.title)
        .bind(recipe)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::to_drink)
            .unwrap_or(Err(RepositoryError::NotFound(id)))
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
