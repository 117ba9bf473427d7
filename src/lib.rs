//! Catalog Service
//!
//! Product catalog management for an ecommerce admin backend.
//!
//! ## Features
//! - Product create / update / delete with a cover image
//! - Keyword and category search with paging
//! - Price, stock and view counter adjustments
//! - Product image galleries with a single default image

pub mod config;
pub mod domain;
pub mod events;
pub mod http;
pub mod models;
pub mod repository;
pub mod service;
pub mod storage;

use thiserror::Error;

pub use config::{AppConfig, CatalogOptions};
pub use service::ProductCatalogService;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot find product: {0}")]
    ProductNotFound(i32),

    #[error("Cannot find product image: {0}")]
    ImageNotFound(i32),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl From<domain::ProductError> for CatalogError {
    fn from(err: domain::ProductError) -> Self { Self::Validation(err.to_string()) }
}

impl From<domain::PageError> for CatalogError {
    fn from(err: domain::PageError) -> Self { Self::Validation(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
