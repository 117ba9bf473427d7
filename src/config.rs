//! Runtime configuration read from the environment. `main` loads `.env` first.

use std::env;
use std::path::PathBuf;

use crate::{CatalogError, Result};

/// Behaviour switches for choices the catalog leaves to the deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Let products without any category show up in paged searches.
    pub include_uncategorized: bool,
    /// Let `update` create a default image when the product has none.
    pub create_image_if_absent: bool,
    /// Count and list a product once even when it sits in several matching categories.
    pub distinct_products: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub storage_root: PathBuf,
    pub nats_url: Option<String>,
    pub catalog: CatalogOptions,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| CatalogError::Config("Missing environment variable 'DATABASE_URL'".into()))?;
        let config = Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            port: parse_or(&lookup, "PORT", 8083)?,
            storage_root: lookup("STORAGE_ROOT").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./user-content")),
            nats_url: lookup("NATS_URL").filter(|url| !url.is_empty()),
            catalog: CatalogOptions {
                include_uncategorized: parse_or(&lookup, "CATALOG_INCLUDE_UNCATEGORIZED", false)?,
                create_image_if_absent: parse_or(&lookup, "CATALOG_CREATE_IMAGE_IF_ABSENT", false)?,
                distinct_products: parse_or(&lookup, "CATALOG_DISTINCT_PRODUCTS", false)?,
            },
        };
        tracing::info!(port = config.port, storage_root = %config.storage_root.display(), nats = config.nats_url.is_some(), "configuration loaded");
        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| CatalogError::Config(format!("Invalid {key}: {e}"))),
        None => Ok(default),
    }
}
