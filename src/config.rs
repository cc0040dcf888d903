use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

/// Process configuration, loaded once at startup. Rotating `SECRET_KEY`
/// invalidates every previously issued token.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub token_max_age_secs: u64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://todo.db".to_string());

        let token_max_age_secs = match env::var("TOKEN_MAX_AGE_SECS") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("TOKEN_MAX_AGE_SECS"))?,
            Err(_) => 3600,
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        Ok(Self {
            database_url,
            secret_key,
            token_max_age_secs,
            port,
        })
    }
}
