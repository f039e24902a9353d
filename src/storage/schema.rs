//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Tender-Harvest
//! database. Bootstrap is idempotent: every statement is `IF NOT EXISTS`.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Portal taxonomy nodes selected by the code-prefix predicate
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category_code TEXT NOT NULL UNIQUE,
    path_name TEXT,
    source_id INTEGER,
    parent_source_id INTEGER
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_cat_category_code ON categories(category_code);
CREATE INDEX IF NOT EXISTS idx_cat_name ON categories(name);

-- Enriched listing items keyed by the portal's article identifier
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_api_id TEXT NOT NULL UNIQUE,
    category_id INTEGER NOT NULL,
    title TEXT,
    author TEXT,
    publish_date INTEGER,
    district_name TEXT,
    project_name TEXT,
    purchase_name TEXT,
    budget_price REAL,
    procurement_method TEXT,
    supplier_name TEXT,
    total_contract_amount REAL,
    bid_opening_time INTEGER,
    html_content TEXT,
    text_content TEXT,
    attachment_count INTEGER,
    crawl_timestamp INTEGER NOT NULL,
    FOREIGN KEY (category_id) REFERENCES categories (id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_art_article_api_id ON articles(article_api_id);
CREATE INDEX IF NOT EXISTS idx_art_category_id ON articles(category_id);
CREATE INDEX IF NOT EXISTS idx_art_title ON articles(title);
CREATE INDEX IF NOT EXISTS idx_art_publish_date ON articles(publish_date);
CREATE INDEX IF NOT EXISTS idx_art_district_name ON articles(district_name);
CREATE INDEX IF NOT EXISTS idx_art_project_name ON articles(project_name);
CREATE INDEX IF NOT EXISTS idx_art_purchase_name ON articles(purchase_name);
CREATE INDEX IF NOT EXISTS idx_art_procurement_method ON articles(procurement_method);
CREATE INDEX IF NOT EXISTS idx_art_supplier_name ON articles(supplier_name);
CREATE INDEX IF NOT EXISTS idx_art_budget_price ON articles(budget_price);
CREATE INDEX IF NOT EXISTS idx_art_total_contract_amount ON articles(total_contract_amount);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
