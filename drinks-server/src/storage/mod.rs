use crate::config::DatabaseConfig;
use crate::models::{Drink, DrinkUpdate, NewDrink};
use std::sync::Arc;
use thiserror::Error;

pub mod sqlite;

/// Errors that can occur during drink storage operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Drink {0} not found")]
    NotFound(i64),
    #[error("Drink {0} already exists")]
    DuplicateId(i64),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("invalid stored recipe: {}", err))
    }
}

/// CRUD operations over the drinks table.
///
/// Implementations must be thread-safe; a single instance is shared by all
/// request handlers.
#[async_trait::async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks ordered by id
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Drink, RepositoryError>;

    /// Inserts a drink, failing with `DuplicateId` if its id is taken
    async fn create(&self, drink: NewDrink) -> Result<Drink, RepositoryError>;

    /// Applies the fields present in `update` to an existing drink
    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Checks that storage answers queries
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Opens the configured database and prepares the drinks table
pub async fn create_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn DrinkRepository>, RepositoryError> {
    let repository = sqlite::SqliteDrinkRepository::connect(config).await?;
    repository.initialize(config.reset).await?;
    Ok(Arc::new(repository))
}
