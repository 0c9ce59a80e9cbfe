use std::fmt;
use std::str::FromStr;
#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// How bulk listings assemble their post aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Fetch the matching ids, then assemble every post on its own.
    #[default]
    PerPost,
    /// Load posts, tag links and authors in one query each and stitch in memory.
    Batched,
}

/// Unknown value for a [`ReadStrategy`].
#[derive(Debug, thiserror::Error)]
#[error("Unknown read strategy '{0}' (expected 'per_post' or 'batched')")]
pub struct ParseReadStrategyError(String);

impl FromStr for ReadStrategy {
    type Err = ParseReadStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_post" | "per-post" => Ok(Self::PerPost),
            "batched" => Ok(Self::Batched),
            other => Err(ParseReadStrategyError(other.to_string())),
        }
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerPost => f.write_str("per_post"),
            Self::Batched => f.write_str("batched"),
        }
    }
}

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Run every multi-step mutation inside one transaction.
    pub atomic_mutations: bool,
    pub read_strategy: ReadStrategy,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 100,
            min_connections: 10,
            atomic_mutations: true,
            read_strategy: ReadStrategy::default(),
        }
    }
}

/// Open the shared connection pool.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!(
        pool = config.max_connections,
        atomic_mutations = config.atomic_mutations,
        read_strategy = %config.read_strategy,
        "Database connected"
    );

    Ok(conn)
}
