//! Application configuration loaded from environment variables.

use std::env;

use juicebox_infra::database::{DatabaseConfig, ParseReadStrategyError, ReadStrategy};

/// How the user store treats passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordHashing {
    /// Store the password as given.
    #[default]
    None,
    Argon2,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    ReadStrategy(#[from] ParseReadStrategyError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub password_hashing: PasswordHashing,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let mut database = DatabaseConfig::new(url);
        if let Some(max) = parsed("DB_MAX_CONNECTIONS")? {
            database.max_connections = max;
        }
        if let Some(min) = parsed("DB_MIN_CONNECTIONS")? {
            database.min_connections = min;
        }
        if let Some(atomic) = parsed("DB_ATOMIC_MUTATIONS")? {
            database.atomic_mutations = atomic;
        }
        if let Ok(strategy) = env::var("DB_READ_STRATEGY") {
            database.read_strategy = strategy.parse::<ReadStrategy>()?;
        }

        let password_hashing = match env::var("PASSWORD_HASHING") {
            Err(_) => PasswordHashing::default(),
            Ok(value) => parse_hashing(&value)?,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT")?.unwrap_or(8080),
            database,
            password_hashing,
        })
    }
}

fn parse_hashing(value: &str) -> Result<PasswordHashing, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "plain" => Ok(PasswordHashing::None),
        "argon2" => Ok(PasswordHashing::Argon2),
        _ => Err(ConfigError::Invalid {
            name: "PASSWORD_HASHING",
            value: value.to_string(),
        }),
    }
}

/// `None` if the variable is unset, an error if it is set but unparsable.
fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(None),
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hashing() {
        assert_eq!(parse_hashing("Argon2").unwrap(), PasswordHashing::Argon2);
        assert_eq!(parse_hashing("none").unwrap(), PasswordHashing::None);
        assert!(parse_hashing("md5").is_err());
    }
}
