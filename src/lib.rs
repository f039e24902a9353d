//! Tender-Harvest: a procurement portal ingestion pipeline
//!
//! This crate ingests the category taxonomy and paginated article listings of
//! a remote procurement portal, enriches each article with a detail fetch,
//! and persists the merged result idempotently into a SQLite store keyed by
//! the portal's own identifiers.

pub mod config;
pub mod harvest;
pub mod output;
pub mod portal;
pub mod storage;

use thiserror::Error;

/// Main error type for Tender-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Portal error: {0}")]
    Portal(#[from] portal::PortalError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Category extraction produced no categories: {0}")]
    NoCategories(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tender-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, RunSummary};
pub use portal::PortalError;
pub use storage::{SqliteStorage, Storage};
