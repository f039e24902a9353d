//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::query::{ArticleFilter, SearchPage};
use crate::storage::{ArticleRecord, CategoryRecord, NewArticle, NewCategory};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the harvest pipeline
/// and the store's read consumers.
pub trait Storage {
    // ===== Categories =====

    /// Inserts a category if its code is not yet present, then returns the
    /// stored record
    ///
    /// Re-upserting an existing code never creates a duplicate, changes the
    /// local ID, or modifies the stored fields.
    fn upsert_category(&mut self, category: &NewCategory) -> StorageResult<CategoryRecord>;

    /// Gets a category by its unique external code
    fn get_category_by_code(&self, code: &str) -> StorageResult<Option<CategoryRecord>>;

    /// Lists all categories ordered by name
    fn list_categories(&self) -> StorageResult<Vec<CategoryRecord>>;

    // ===== Articles =====

    /// Inserts or updates an article keyed by its external ID
    ///
    /// On conflict, non-null incoming fields and the category reference win;
    /// a null incoming field never overwrites a stored non-null value. The
    /// crawl timestamp is always refreshed. Each call is one transaction.
    fn upsert_article(
        &mut self,
        article: &NewArticle,
        category_id: i64,
        crawl_timestamp: i64,
    ) -> StorageResult<i64>;

    /// Gets an article by its external ID
    fn get_article_by_api_id(&self, api_id: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Searches articles with the given filter and pagination
    fn search_articles(
        &self,
        filter: &ArticleFilter,
        page: u32,
        per_page: u32,
    ) -> StorageResult<SearchPage>;

    // ===== Statistics =====

    /// Gets total category count
    fn count_categories(&self) -> StorageResult<u64>;

    /// Gets total article count
    fn count_articles(&self) -> StorageResult<u64>;

    /// Counts articles that carry an HTML content body (detail enrichment
    /// succeeded at least once)
    fn count_enriched_articles(&self) -> StorageResult<u64>;

    /// Gets the most recent crawl timestamp across all articles
    fn latest_crawl_timestamp(&self) -> StorageResult<Option<i64>>;

    /// Gets article counts per category name, largest first
    fn articles_per_category(&self) -> StorageResult<Vec<(String, u64)>>;
}
