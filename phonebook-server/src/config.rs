//! Configuration loaded from environment variables
//!
//! - `DB_HOST`: MySQL host (default: localhost)
//! - `DB_USER`: MySQL user (default: dev)
//! - `DB_PASSWORD`: MySQL password (default: dev)
//! - `DB_NAME`: database holding the `phone_book` table (default: crud_flask)
//! - `SECRET_KEY`: session cookie signing key (default: a placeholder)

use std::fmt;

/// Placeholder signing key. Any real deployment must override `SECRET_KEY`.
pub const DEFAULT_SECRET_KEY: &str = "mys3cr3tk3y";

/// Connection charset, 4-byte safe.
pub const CHARSET: &str = "utf8mb4";

/// Database connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (for testing)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            host: var("DB_HOST", "localhost"),
            user: var("DB_USER", "dev"),
            password: var("DB_PASSWORD", "dev"),
            name: var("DB_NAME", "crud_flask"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Keep the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret_key = lookup("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());
        Self {
            database: DatabaseConfig::from_lookup(&lookup),
            secret_key,
        }
    }

    /// True when `SECRET_KEY` was left at the placeholder value
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database", &self.database)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
