//! Storage module for persisting harvested data
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Idempotent category and article persistence
//! - The parameterized article search used by store consumers

mod query;
mod schema;
mod sqlite;
mod traits;

pub use query::{ArticleFilter, SearchPage};
pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::HarvestError;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(HarvestError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// A category as extracted from the portal tree, before persistence
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub category_code: String,
    pub path_name: String,
    pub source_id: Option<i64>,
    pub parent_source_id: Option<i64>,
}

/// A category as stored, including its local ID
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub category_code: String,
    pub path_name: Option<String>,
    pub source_id: Option<i64>,
    pub parent_source_id: Option<i64>,
}

/// The merged article fields ready for an upsert
///
/// The owning category and crawl timestamp are supplied at write time; they
/// are run context, not merge output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewArticle {
    pub article_api_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<i64>,
    pub district_name: Option<String>,
    pub project_name: Option<String>,
    pub purchase_name: Option<String>,
    pub budget_price: Option<f64>,
    pub procurement_method: Option<String>,
    pub supplier_name: Option<String>,
    pub total_contract_amount: Option<f64>,
    pub bid_opening_time: Option<i64>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub attachment_count: Option<i64>,
}

/// An article row as stored
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub id: i64,
    pub article_api_id: String,
    pub category_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<i64>,
    pub district_name: Option<String>,
    pub project_name: Option<String>,
    pub purchase_name: Option<String>,
    pub budget_price: Option<f64>,
    pub procurement_method: Option<String>,
    pub supplier_name: Option<String>,
    pub total_contract_amount: Option<f64>,
    pub bid_opening_time: Option<i64>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub attachment_count: Option<i64>,
    pub crawl_timestamp: i64,
}
