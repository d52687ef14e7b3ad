use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::auth::hash_password;
use crate::config::Configuration;
use crate::store::{ClientStore, NewUser};

/// Shared startup path: data directory, store connection, schema
/// initialization, and admin account seeding.
pub struct ServiceBootstrap {
    store: ClientStore,
    config: Configuration,
}

impl ServiceBootstrap {
    /// Connect to the records database and initialize the schema.
    pub async fn new(config: Configuration) -> Result<Self> {
        Self::ensure_data_directory(&config.database.dsn)?;

        let store = ClientStore::new(&config.database.dsn).await?;

        Ok(ServiceBootstrap { store, config })
    }

    /// Ensure the data directory exists for SQLite databases
    fn ensure_data_directory(dsn: &str) -> Result<()> {
        // Only handle SQLite databases
        if !dsn.starts_with("sqlite:") {
            return Ok(());
        }

        if let Some(file_path) = dsn.strip_prefix("sqlite:") {
            let file_path = file_path.trim_start_matches("//");
            if file_path.contains(":memory:") {
                return Ok(());
            }

            if let Some(parent) = Path::new(file_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                    log::info!("Created data directory: {}", parent.display());
                }
            }
        }
        Ok(())
    }

    /// Create the initial admin user if it does not exist.
    pub async fn seed_admin_user(&self) -> Result<()> {
        let admin_email = &self.config.auth.admin_email;

        if self.store.find_user_by_email(admin_email).await?.is_some() {
            log::debug!("Admin user '{admin_email}' already exists");
            return Ok(());
        }

        log::info!("Seeding initial admin user '{admin_email}'");
        let hashed_password = hash_password(&self.config.auth.admin_password)?;
        self.store
            .insert_user(&NewUser {
                email: admin_email.clone(),
                hashed_password,
                full_name: "Admin".to_string(),
                is_admin: true,
            })
            .await?;

        Ok(())
    }

    /// Get access to the records store
    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    /// Get access to the configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }
}
