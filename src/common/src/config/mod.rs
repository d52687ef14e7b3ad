use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use once_cell::sync::OnceCell;

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data source name (PostgreSQL or SQLite DSN)
    pub dsn: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("sqlite://.data/cadastro.db"),
        }
    }
}

impl DatabaseConfig {
    /// Create an in-memory database configuration for tests
    pub fn in_memory() -> Self {
        Self {
            dsn: String::from("sqlite::memory:"),
        }
    }
}

/// Configuration for token issuance and the seeded admin account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    pub secret_key: String,
    /// Lifetime of issued access tokens
    #[serde(with = "humantime_serde")]
    pub token_expiry: Duration,
    /// Email of the admin user seeded at startup
    pub admin_email: String,
    /// Password of the admin user seeded at startup
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::from("change-this-secret-in-production"),
            token_expiry: Duration::from_secs(24 * 60 * 60),
            admin_email: String::from("admin@cadastro.local"),
            admin_password: String::from("admin"),
        }
    }
}

/// TTLs and sizing for the in-process response cache
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached single-record responses
    #[serde(with = "humantime_serde")]
    pub record_ttl: Duration,
    /// Time-to-live for cached search result pages
    #[serde(with = "humantime_serde")]
    pub search_ttl: Duration,
    /// Maximum number of cached entries per cache
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            record_ttl: Duration::from_secs(3600),
            search_ttl: Duration::from_secs(1800),
            max_entries: 10_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size applied when the request does not specify one
    pub default_page_size: u32,
    /// Upper bound accepted for the page size parameter
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum number of records a single export may contain
    pub max_records: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_records: 50_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Database configuration (client and user records)
    pub database: DatabaseConfig,
    /// Token issuance and admin seeding
    pub auth: AuthConfig,
    /// Response cache TTLs
    pub cache: CacheConfig,
    /// Search pagination bounds
    pub pagination: PaginationConfig,
    /// Export limits
    pub export: ExportConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("cadastro.toml"))
            .merge(Env::prefixed("CADASTRO__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    pub fn load_from_path(path: &std::path::Path) -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CADASTRO__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_configuration_uses_sqlite() {
        let config = Configuration::default();

        assert_eq!(config.database.dsn, "sqlite://.data/cadastro.db");
        assert_eq!(config.auth.token_expiry, Duration::from_secs(86_400));
        assert_eq!(config.cache.record_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.search_ttl, Duration::from_secs(1800));
        assert_eq!(config.pagination.default_page_size, 50);
        assert_eq!(config.pagination.max_page_size, 100);
        assert_eq!(config.export.max_records, 50_000);
    }

    #[test]
    fn test_configless_operation() {
        // Defaults alone must produce a usable configuration
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .extract::<Configuration>()
            .unwrap();

        assert_eq!(config.database.dsn, "sqlite://.data/cadastro.db");
        assert_eq!(config.auth.admin_email, "admin@cadastro.local");
    }

    #[test]
    fn test_env_var_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CADASTRO__DATABASE__DSN", "sqlite://./test.db");
            jail.set_env("CADASTRO__PAGINATION__DEFAULT_PAGE_SIZE", "25");

            let config = Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Env::prefixed("CADASTRO__").split("__"))
                .extract::<Configuration>()
                .unwrap();

            assert_eq!(config.database.dsn, "sqlite://./test.db");
            assert_eq!(config.pagination.default_page_size, 25);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cadastro.toml",
                r#"
                [database]
                dsn = "sqlite://./from-file.db"

                [auth]
                token_expiry = "1h"
                "#,
            )?;

            let config = Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Toml::file("cadastro.toml"))
                .extract::<Configuration>()
                .unwrap();

            assert_eq!(config.database.dsn, "sqlite://./from-file.db");
            assert_eq!(config.auth.token_expiry, Duration::from_secs(3600));
            Ok(())
        });
    }
}
