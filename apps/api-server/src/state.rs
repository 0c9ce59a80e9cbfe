//! Application state - shared across all handlers.

use std::sync::Arc;

use juicebox_core::ports::{
    PasswordService, PlainPasswords, PostRepository, TagRepository, UserRepository,
};
use juicebox_infra::database::{self, RepositoryOptions};
use juicebox_infra::{
    Argon2PasswordService, PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};

use crate::config::{AppConfig, PasswordHashing};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
}

impl AppState {
    /// Connect to the database and build the repositories over the shared pool.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let db = database::connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            std::io::Error::other(e.to_string())
        })?;

        let options = RepositoryOptions::from(&config.database);
        let passwords: Arc<dyn PasswordService> = match config.password_hashing {
            PasswordHashing::None => {
                tracing::warn!("PASSWORD_HASHING=none - passwords are stored as given");
                Arc::new(PlainPasswords)
            }
            PasswordHashing::Argon2 => Arc::new(Argon2PasswordService::new()),
        };

        let users = PostgresUserRepository::new(db.clone())
            .with_passwords(passwords)
            .with_options(options);

        tracing::info!("Application state initialized");

        Ok(Self {
            users: Arc::new(users),
            posts: Arc::new(PostgresPostRepository::with_options(db.clone(), options)),
            tags: Arc::new(PostgresTagRepository::new(db)),
        })
    }
}
