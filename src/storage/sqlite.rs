//! SQLite storage implementation
//!
//! This module provides the SQLite-based implementation of the Storage trait.

use crate::storage::query::{self, ArticleFilter, SearchPage};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ArticleRecord, CategoryRecord, NewArticle, NewCategory};
use crate::HarvestError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn category_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryRecord> {
        Ok(CategoryRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            category_code: row.get(2)?,
            path_name: row.get(3)?,
            source_id: row.get(4)?,
            parent_source_id: row.get(5)?,
        })
    }
}

const CATEGORY_COLUMNS: &str =
    "id, name, category_code, path_name, source_id, parent_source_id";

pub(crate) const ARTICLE_COLUMNS: &str = "id, article_api_id, category_id, title, author, \
     publish_date, district_name, project_name, purchase_name, budget_price, \
     procurement_method, supplier_name, total_contract_amount, bid_opening_time, \
     html_content, text_content, attachment_count, crawl_timestamp";

pub(crate) fn article_from_row(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
    Ok(ArticleRecord {
        id: row.get(0)?,
        article_api_id: row.get(1)?,
        category_id: row.get(2)?,
        title: row.get(3)?,
        author: row.get(4)?,
        publish_date: row.get(5)?,
        district_name: row.get(6)?,
        project_name: row.get(7)?,
        purchase_name: row.get(8)?,
        budget_price: row.get(9)?,
        procurement_method: row.get(10)?,
        supplier_name: row.get(11)?,
        total_contract_amount: row.get(12)?,
        bid_opening_time: row.get(13)?,
        html_content: row.get(14)?,
        text_content: row.get(15)?,
        attachment_count: row.get(16)?,
        crawl_timestamp: row.get(17)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Categories =====

    fn upsert_category(&mut self, category: &NewCategory) -> StorageResult<CategoryRecord> {
        // Insert-if-absent: re-extraction must not duplicate or mutate
        self.conn.execute(
            "INSERT OR IGNORE INTO categories (name, category_code, path_name, source_id, parent_source_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.name,
                category.category_code,
                category.path_name,
                category.source_id,
                category.parent_source_id,
            ],
        )?;

        self.get_category_by_code(&category.category_code)?
            .ok_or_else(|| StorageError::CategoryNotFound(category.category_code.clone()))
    }

    fn get_category_by_code(&self, code: &str) -> StorageResult<Option<CategoryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE category_code = ?1",
            CATEGORY_COLUMNS
        ))?;

        let category = stmt
            .query_row(params![code], Self::category_from_row)
            .optional()?;

        Ok(category)
    }

    fn list_categories(&self) -> StorageResult<Vec<CategoryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], Self::category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    // ===== Articles =====

    fn upsert_article(
        &mut self,
        article: &NewArticle,
        category_id: i64,
        crawl_timestamp: i64,
    ) -> StorageResult<i64> {
        // Nullable data columns use COALESCE on conflict so a thinner
        // re-crawl cannot erase previously stored enrichment. The category
        // reference and crawl timestamp always take the new value.
        self.conn.execute(
            "INSERT INTO articles (
                article_api_id, category_id, title, author, publish_date,
                district_name, project_name, purchase_name, budget_price,
                procurement_method, supplier_name, total_contract_amount,
                bid_opening_time, html_content, text_content,
                attachment_count, crawl_timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(article_api_id) DO UPDATE SET
                category_id = excluded.category_id,
                title = COALESCE(excluded.title, title),
                author = COALESCE(excluded.author, author),
                publish_date = COALESCE(excluded.publish_date, publish_date),
                district_name = COALESCE(excluded.district_name, district_name),
                project_name = COALESCE(excluded.project_name, project_name),
                purchase_name = COALESCE(excluded.purchase_name, purchase_name),
                budget_price = COALESCE(excluded.budget_price, budget_price),
                procurement_method = COALESCE(excluded.procurement_method, procurement_method),
                supplier_name = COALESCE(excluded.supplier_name, supplier_name),
                total_contract_amount = COALESCE(excluded.total_contract_amount, total_contract_amount),
                bid_opening_time = COALESCE(excluded.bid_opening_time, bid_opening_time),
                html_content = COALESCE(excluded.html_content, html_content),
                text_content = COALESCE(excluded.text_content, text_content),
                attachment_count = COALESCE(excluded.attachment_count, attachment_count),
                crawl_timestamp = excluded.crawl_timestamp",
            params![
                article.article_api_id,
                category_id,
                article.title,
                article.author,
                article.publish_date,
                article.district_name,
                article.project_name,
                article.purchase_name,
                article.budget_price,
                article.procurement_method,
                article.supplier_name,
                article.total_contract_amount,
                article.bid_opening_time,
                article.html_content,
                article.text_content,
                article.attachment_count,
                crawl_timestamp,
            ],
        )?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM articles WHERE article_api_id = ?1",
            params![article.article_api_id],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn get_article_by_api_id(&self, api_id: &str) -> StorageResult<Option<ArticleRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM articles WHERE article_api_id = ?1",
            ARTICLE_COLUMNS
        ))?;

        let article = stmt
            .query_row(params![api_id], article_from_row)
            .optional()?;

        Ok(article)
    }

    fn search_articles(
        &self,
        filter: &ArticleFilter,
        page: u32,
        per_page: u32,
    ) -> StorageResult<SearchPage> {
        query::search_articles(&self.conn, filter, page, per_page)
    }

    // ===== Statistics =====

    fn count_categories(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_enriched_articles(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE html_content IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn latest_crawl_timestamp(&self) -> StorageResult<Option<i64>> {
        let latest: Option<i64> = self
            .conn
            .query_row("SELECT MAX(crawl_timestamp) FROM articles", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();
        Ok(latest)
    }

    fn articles_per_category(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, COUNT(a.id) as count
             FROM categories c LEFT JOIN articles a ON a.category_id = c.id
             GROUP BY c.id ORDER BY count DESC, c.name",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
