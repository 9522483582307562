//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Configuration for connecting to SurrealDB.
///
/// All tenant data shares one namespace/database pair; isolation is
/// enforced per row by the repositories, not by database selection.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "strata".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Builds a configuration from `STRATA_DB_*` environment
    /// variables, falling back to [`DbConfig::default`] per field.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            url: lookup("STRATA_DB_URL").unwrap_or(defaults.url),
            namespace: lookup("STRATA_DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: lookup("STRATA_DB_DATABASE").unwrap_or(defaults.database),
            username: lookup("STRATA_DB_USER").unwrap_or(defaults.username),
            password: lookup("STRATA_DB_PASS").unwrap_or(defaults.password),
        }
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root and selects the configured
    /// namespace/database; the round-trip for the server version
    /// doubles as a liveness check before migrations run.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        let version = db.version().await?;
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            server_version = %version,
            "Connected to SurrealDB"
        );

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_fall_back_to_defaults() {
        let config = DbConfig::from_lookup(|_| None);
        assert_eq!(config.url, "127.0.0.1:8000");
        assert_eq!(config.namespace, "strata");
        assert_eq!(config.database, "main");
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "root");
    }

    #[test]
    fn lookup_hits_override_per_field() {
        let config = DbConfig::from_lookup(|key| match key {
            "STRATA_DB_URL" => Some("db.internal:8000".into()),
            "STRATA_DB_NAMESPACE" => Some("staging".into()),
            _ => None,
        });
        assert_eq!(config.url, "db.internal:8000");
        assert_eq!(config.namespace, "staging");
        // Untouched fields keep their defaults.
        assert_eq!(config.database, "main");
        assert_eq!(config.username, "root");
    }
}
