//! Parameterized article search over the store
//!
//! This is the query layer consumed by readers of the harvested data. It
//! builds a dynamic WHERE clause from an [`ArticleFilter`], with keyword
//! filters, date ranges converted to millisecond epochs (end dates inclusive
//! to the last millisecond of the day), and numeric ranges, paginated and
//! ordered by publish date descending.

use crate::storage::sqlite::{article_from_row, ARTICLE_COLUMNS};
use crate::storage::traits::StorageResult;
use crate::storage::ArticleRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, ToSql};

/// Maximum rows per search page
pub const MAX_PER_PAGE: u32 = 100;

/// Filter criteria for article searches
///
/// Every field is optional; absent fields impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Exact local category ID
    pub category_id: Option<i64>,
    /// Project name substring
    pub project_name: Option<String>,
    /// Case-insensitive purchase name substring
    pub purchase_name: Option<String>,
    /// Case-insensitive district name substring
    pub district_name: Option<String>,
    /// Case-insensitive exact procurement method
    pub procurement_method: Option<String>,
    /// Case-insensitive supplier name substring
    pub supplier_name: Option<String>,
    /// Publish date range (end date inclusive)
    pub publish_date_start: Option<NaiveDate>,
    pub publish_date_end: Option<NaiveDate>,
    /// Budget price range
    pub budget_price_min: Option<f64>,
    pub budget_price_max: Option<f64>,
    /// Contract amount range
    pub total_contract_amount_min: Option<f64>,
    pub total_contract_amount_max: Option<f64>,
    /// Bid opening time range (end date inclusive)
    pub bid_opening_time_start: Option<NaiveDate>,
    pub bid_opening_time_end: Option<NaiveDate>,
}

/// One page of search results
#[derive(Debug)]
pub struct SearchPage {
    pub articles: Vec<ArticleRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total_articles: u64,
    pub total_pages: u64,
}

/// Millisecond epoch at the start of the given day (UTC)
fn day_start_ms(date: NaiveDate) -> i64 {
    NaiveDateTime::new(date, NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

/// Millisecond epoch at the last millisecond of the given day (UTC)
fn day_end_ms(date: NaiveDate) -> i64 {
    day_start_ms(date) + (24 * 60 * 60 * 1000 - 1)
}

/// Runs an article search against the given connection
pub fn search_articles(
    conn: &Connection,
    filter: &ArticleFilter,
    page: u32,
    per_page: u32,
) -> StorageResult<SearchPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PER_PAGE);

    let mut conditions: Vec<&'static str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(keyword) = &filter.title {
        conditions.push("LOWER(title) LIKE LOWER(?)");
        values.push(Box::new(format!("%{}%", keyword)));
    }
    if let Some(category_id) = filter.category_id {
        conditions.push("category_id = ?");
        values.push(Box::new(category_id));
    }
    if let Some(keyword) = &filter.project_name {
        conditions.push("project_name LIKE ?");
        values.push(Box::new(format!("%{}%", keyword)));
    }
    if let Some(keyword) = &filter.purchase_name {
        conditions.push("LOWER(purchase_name) LIKE LOWER(?)");
        values.push(Box::new(format!("%{}%", keyword)));
    }
    if let Some(keyword) = &filter.district_name {
        conditions.push("LOWER(district_name) LIKE LOWER(?)");
        values.push(Box::new(format!("%{}%", keyword)));
    }
    if let Some(method) = &filter.procurement_method {
        conditions.push("LOWER(procurement_method) = LOWER(?)");
        values.push(Box::new(method.clone()));
    }
    if let Some(keyword) = &filter.supplier_name {
        conditions.push("LOWER(supplier_name) LIKE LOWER(?)");
        values.push(Box::new(format!("%{}%", keyword)));
    }
    if let Some(start) = filter.publish_date_start {
        conditions.push("publish_date >= ?");
        values.push(Box::new(day_start_ms(start)));
    }
    if let Some(end) = filter.publish_date_end {
        conditions.push("publish_date <= ?");
        values.push(Box::new(day_end_ms(end)));
    }
    if let Some(min) = filter.budget_price_min {
        conditions.push("budget_price >= ?");
        values.push(Box::new(min));
    }
    if let Some(max) = filter.budget_price_max {
        conditions.push("budget_price <= ?");
        values.push(Box::new(max));
    }
    if let Some(min) = filter.total_contract_amount_min {
        conditions.push("total_contract_amount >= ?");
        values.push(Box::new(min));
    }
    if let Some(max) = filter.total_contract_amount_max {
        conditions.push("total_contract_amount <= ?");
        values.push(Box::new(max));
    }
    if let Some(start) = filter.bid_opening_time_start {
        conditions.push("bid_opening_time >= ?");
        values.push(Box::new(day_start_ms(start)));
    }
    if let Some(end) = filter.bid_opening_time_end {
        conditions.push("bid_opening_time <= ?");
        values.push(Box::new(day_end_ms(end)));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

    // Count first so the caller gets total pages even for an empty page
    let count_sql = format!("SELECT COUNT(*) FROM articles{}", where_clause);
    let total_articles: i64 =
        conn.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;
    let total_articles = total_articles as u64;
    let total_pages = if total_articles > 0 {
        (total_articles + per_page as u64 - 1) / per_page as u64
    } else {
        1
    };

    let offset = (page as u64 - 1) * per_page as u64;
    let main_sql = format!(
        "SELECT {} FROM articles{} ORDER BY publish_date DESC LIMIT {} OFFSET {}",
        ARTICLE_COLUMNS, where_clause, per_page, offset
    );

    let mut stmt = conn.prepare(&main_sql)?;
    let articles = stmt
        .query_map(param_refs.as_slice(), article_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchPage {
        articles,
        page,
        per_page,
        total_articles,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::initialize_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO categories (name, category_code, path_name) VALUES ('Cat', '110-1', '/Cat')",
            [],
        )
        .unwrap();
        conn
    }

    fn insert_article(
        conn: &Connection,
        api_id: &str,
        title: &str,
        publish_date: i64,
        budget: Option<f64>,
    ) {
        conn.execute(
            "INSERT INTO articles (article_api_id, category_id, title, publish_date, budget_price, crawl_timestamp)
             VALUES (?1, 1, ?2, ?3, ?4, 0)",
            rusqlite::params![api_id, title, publish_date, budget],
        )
        .unwrap();
    }

    #[test]
    fn test_title_filter_is_case_insensitive() {
        let conn = test_conn();
        insert_article(&conn, "a1", "Bridge Maintenance Tender", 1000, None);
        insert_article(&conn, "a2", "Road works", 2000, None);

        let filter = ArticleFilter {
            title: Some("bridge".to_string()),
            ..ArticleFilter::default()
        };
        let page = search_articles(&conn, &filter, 1, 20).unwrap();
        assert_eq!(page.total_articles, 1);
        assert_eq!(page.articles[0].article_api_id, "a1");
    }

    #[test]
    fn test_date_range_end_of_day_inclusive() {
        let conn = test_conn();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        // 2024-03-15 23:59:59.500 UTC
        let late_in_day = day_start_ms(date) + (24 * 60 * 60 * 1000 - 500);
        insert_article(&conn, "a1", "Late in day", late_in_day, None);
        // Just past midnight the next day
        insert_article(&conn, "a2", "Next day", day_start_ms(date) + 24 * 60 * 60 * 1000, None);

        let filter = ArticleFilter {
            publish_date_start: Some(date),
            publish_date_end: Some(date),
            ..ArticleFilter::default()
        };
        let page = search_articles(&conn, &filter, 1, 20).unwrap();
        assert_eq!(page.total_articles, 1);
        assert_eq!(page.articles[0].article_api_id, "a1");
    }

    #[test]
    fn test_budget_range() {
        let conn = test_conn();
        insert_article(&conn, "a1", "Cheap", 1000, Some(50.0));
        insert_article(&conn, "a2", "Mid", 2000, Some(500.0));
        insert_article(&conn, "a3", "Expensive", 3000, Some(5000.0));

        let filter = ArticleFilter {
            budget_price_min: Some(100.0),
            budget_price_max: Some(1000.0),
            ..ArticleFilter::default()
        };
        let page = search_articles(&conn, &filter, 1, 20).unwrap();
        assert_eq!(page.total_articles, 1);
        assert_eq!(page.articles[0].article_api_id, "a2");
    }

    #[test]
    fn test_ordered_by_publish_date_desc() {
        let conn = test_conn();
        insert_article(&conn, "old", "Old", 1000, None);
        insert_article(&conn, "new", "New", 3000, None);
        insert_article(&conn, "mid", "Mid", 2000, None);

        let page = search_articles(&conn, &ArticleFilter::default(), 1, 20).unwrap();
        let ids: Vec<_> = page
            .articles
            .iter()
            .map(|a| a.article_api_id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_pagination_and_total_pages() {
        let conn = test_conn();
        for i in 0..5 {
            insert_article(&conn, &format!("a{}", i), "T", i * 100, None);
        }

        let page = search_articles(&conn, &ArticleFilter::default(), 2, 2).unwrap();
        assert_eq!(page.total_articles, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.articles.len(), 2);
    }

    #[test]
    fn test_per_page_is_clamped() {
        let conn = test_conn();
        insert_article(&conn, "a1", "T", 100, None);

        let page = search_articles(&conn, &ArticleFilter::default(), 0, 500).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);

        let page = search_articles(&conn, &ArticleFilter::default(), 1, 0).unwrap();
        assert_eq!(page.per_page, 1);
    }

    #[test]
    fn test_empty_store_reports_one_page() {
        let conn = test_conn();
        let page = search_articles(&conn, &ArticleFilter::default(), 1, 20).unwrap();
        assert_eq!(page.total_articles, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.articles.is_empty());
    }
}
