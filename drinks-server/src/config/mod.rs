pub(crate) use crate::config::auth::AuthConfig;
pub(crate) use crate::config::database::DatabaseConfig;
use confique::Config;

pub mod auth;
pub mod database;

/// Optional configuration file read from the working directory
const CONFIG_FILE: &str = "drinks.toml";

/// Main configuration structure for the drinks server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 5000)
    #[config(env = "DRINKS_PORT", default = 5000)]
    pub port: u16,

    /// Storage configuration
    #[config(nested)]
    pub database: DatabaseConfig,

    /// Token verification configuration
    #[config(nested)]
    pub auth: AuthConfig,
}

impl Settings {
    /// Loads settings from the environment, then `drinks.toml`, then defaults
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().file(CONFIG_FILE).load()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(jwks_mock: &wiremock::MockServer) -> Self {
        use drinks_auth::testing::{AUDIENCE, ISSUER};

        Self {
            port: 0, // Let the OS choose a port
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                reset: true,
            },
            auth: AuthConfig {
                domain: "drinks.example.com".to_string(),
                audience: AUDIENCE.to_string(),
                issuer: Some(ISSUER.to_string()),
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks_mock.uri())),
                jwks_ttl: 600,
                jwks_timeout: 2,
                leeway: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "DRINKS_PORT",
        "DRINKS_DATABASE_URL",
        "DRINKS_DATABASE_MAX_CONNECTIONS",
        "DRINKS_DATABASE_RESET",
        "DRINKS_AUTH_DOMAIN",
        "DRINKS_AUTH_AUDIENCE",
        "DRINKS_AUTH_ISSUER",
        "DRINKS_AUTH_JWKS_URL",
        "DRINKS_AUTH_JWKS_TTL",
        "DRINKS_AUTH_JWKS_TIMEOUT",
        "DRINKS_AUTH_LEEWAY",
    ];

    fn clear_env() {
        for name in VARS {
            std::env::remove_var(name);
        }
    }

    // Environment variables are process-wide, so every scenario lives in
    // this single test.
    #[test]
    fn test_settings_from_env() {
        clear_env();

        // domain and audience have no defaults
        assert!(Settings::new().is_err());

        std::env::set_var("DRINKS_AUTH_DOMAIN", "coffee.eu.auth0.com");
        std::env::set_var("DRINKS_AUTH_AUDIENCE", "drinks");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.database.url, "sqlite://drinks.db?mode=rwc");
        assert_eq!(settings.database.max_connections, 5);
        assert!(!settings.database.reset);
        assert_eq!(settings.auth.audience, "drinks");
        assert_eq!(settings.auth.jwks_ttl, 600);
        assert_eq!(settings.auth.jwks_timeout, 5);
        assert_eq!(settings.auth.leeway, 0);
        assert_eq!(settings.auth.issuer(), "https://coffee.eu.auth0.com/");
        assert_eq!(
            settings.auth.jwks_url().unwrap().as_str(),
            "https://coffee.eu.auth0.com/.well-known/jwks.json"
        );

        std::env::set_var("DRINKS_PORT", "8080");
        std::env::set_var("DRINKS_DATABASE_RESET", "true");
        std::env::set_var("DRINKS_AUTH_JWKS_TTL", "60");
        std::env::set_var("DRINKS_AUTH_ISSUER", "https://issuer.example.com/");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.port, 8080);
        assert!(settings.database.reset);
        assert_eq!(settings.auth.jwks_ttl, 60);
        assert_eq!(settings.auth.issuer(), "https://issuer.example.com/");

        std::env::set_var("DRINKS_PORT", "not-a-port");
        assert!(Settings::new().is_err());

        clear_env();
    }
}
