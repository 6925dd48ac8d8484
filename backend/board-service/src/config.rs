/// Configuration management for board-service
///
/// Settings come from environment variables; `Config::load` also reads a
/// `.env` file first when one is present.
use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Which storage engine backs the service
    pub storage: StorageBackend,
    /// Database configuration, present only for the postgres backend
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown STORAGE_BACKEND '{}'", other)),
        }
    }
}

/// Where the PostgreSQL server is and how to log in
#[derive(Clone)]
pub enum DbConnection {
    /// A full `postgres://` connection URL
    Url(String),
    /// Discrete `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` settings
    Parts {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        database: String,
    },
}

impl fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbConnection::Url(_) => f.write_str("Url([REDACTED])"),
            DbConnection::Parts {
                host,
                port,
                user,
                database,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"[REDACTED]")
                .field("database", database)
                .finish(),
        }
    }
}

impl DbConnection {
    /// Read `DATABASE_URL`, falling back to the discrete `DB_*` variables.
    fn from_env() -> Result<Self, String> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(DbConnection::Url(url));
        }

        let host = std::env::var("DB_HOST").map_err(|_| {
            "DATABASE_URL (or DB_HOST, DB_USER and DB_NAME) must be set for the postgres backend"
                .to_string()
        })?;
        let user = std::env::var("DB_USER")
            .map_err(|_| "DB_USER must be set when DB_HOST is used".to_string())?;
        let database = std::env::var("DB_NAME")
            .map_err(|_| "DB_NAME must be set when DB_HOST is used".to_string())?;

        Ok(DbConnection::Parts {
            host,
            port: parse_env_or_default("DB_PORT", 5432)?,
            user,
            password: std::env::var("DB_PASSWORD").ok(),
            database,
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match self {
            DbConnection::Url(url) => PgConnectOptions::from_str(url),
            DbConnection::Parts {
                host,
                port,
                user,
                password,
                database,
            } => {
                let options = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user)
                    .database(database);
                Ok(match password {
                    Some(password) => options.password(password),
                    None => options,
                })
            }
        }
    }
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub connection: DbConnection,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Timeout for verifying a new pool
    pub connect_timeout_secs: u64,
    /// Timeout for getting a connection from the pool
    pub acquire_timeout_secs: u64,
    /// Deadline for each statement
    pub query_timeout_ms: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("connection", &self.connection)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Load database settings; `DATABASE_URL` or the `DB_*` parts are required.
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            connection: DbConnection::from_env()?,
            max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env_or_default("DB_MIN_CONNECTIONS", 1)?,
            connect_timeout_secs: parse_env_or_default("DB_CONNECT_TIMEOUT_SECS", 5)?,
            acquire_timeout_secs: parse_env_or_default("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            query_timeout_ms: parse_env_or_default("DB_QUERY_TIMEOUT_MS", 5_000)?,
            run_migrations: parse_env_or_default("DB_RUN_MIGRATIONS", true)?,
        })
    }
}

impl Config {
    /// Read `.env` if present, then load from the environment
    pub fn load() -> Result<Self, String> {
        dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let storage = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            // Legacy switch from the first deployment, in both spellings
            Err(_)
                if parse_env_or_default("PERSISTANCE_ENABLED", false)?
                    || parse_env_or_default("PERSISTENCE_ENABLED", false)? =>
            {
                StorageBackend::Postgres
            }
            Err(_) => StorageBackend::Memory,
        };

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Config {
            env,
            storage,
            database,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
