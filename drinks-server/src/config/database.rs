use confique::Config;

/// Configuration for the drinks table storage
#[derive(Debug, Config, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection URL (default: sqlite://drinks.db?mode=rwc)
    #[config(env = "DRINKS_DATABASE_URL", default = "sqlite://drinks.db?mode=rwc")]
    pub url: String,

    /// Maximum number of pooled connections (default: 5)
    #[config(env = "DRINKS_DATABASE_MAX_CONNECTIONS", default = 5)]
    pub max_connections: u32,

    /// Drop, recreate and seed the drinks table on start-up (default: false)
    ///
    /// Destroys every stored drink.
    #[config(env = "DRINKS_DATABASE_RESET", default = false)]
    pub reset: bool,
}
