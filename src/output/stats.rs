//! Statistics generation from the harvested store
//!
//! This module provides functionality for extracting and displaying store
//! statistics from the storage layer.

use crate::storage::Storage;
use crate::HarvestError;
use chrono::DateTime;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of categories in the store
    pub total_categories: u64,

    /// Total number of articles in the store
    pub total_articles: u64,

    /// Articles carrying an HTML content body (detail enrichment succeeded)
    pub enriched_articles: u64,

    /// Most recent crawl timestamp (unix seconds), if any article exists
    pub latest_crawl_timestamp: Option<i64>,

    /// Article counts per category name, largest first
    pub articles_per_category: Vec<(String, u64)>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<StoreStatistics, HarvestError> {
    Ok(StoreStatistics {
        total_categories: storage.count_categories()?,
        total_articles: storage.count_articles()?,
        enriched_articles: storage.count_enriched_articles()?,
        latest_crawl_timestamp: storage.latest_crawl_timestamp()?,
        articles_per_category: storage.articles_per_category()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Categories: {}", stats.total_categories);
    println!("  Articles: {}", stats.total_articles);

    let coverage = if stats.total_articles > 0 {
        (stats.enriched_articles as f64 / stats.total_articles as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "  Detail enrichment: {} / {} articles ({:.1}%)",
        stats.enriched_articles, stats.total_articles, coverage
    );

    match stats.latest_crawl_timestamp {
        Some(ts) => match DateTime::from_timestamp(ts, 0) {
            Some(when) => println!("  Last crawl: {}", when.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("  Last crawl: (invalid timestamp {})", ts),
        },
        None => println!("  Last crawl: never"),
    }
    println!();

    if !stats.articles_per_category.is_empty() {
        println!("Articles by Category:");
        for (name, count) in &stats.articles_per_category {
            println!("  {}: {}", name, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewArticle, NewCategory, SqliteStorage};

    #[test]
    fn test_load_statistics_from_store() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let category = storage
            .upsert_category(&NewCategory {
                name: "Tenders".to_string(),
                category_code: "110-1".to_string(),
                path_name: "/Tenders".to_string(),
                source_id: None,
                parent_source_id: None,
            })
            .unwrap();

        let enriched = NewArticle {
            article_api_id: "a1".to_string(),
            html_content: Some("<p>b</p>".to_string()),
            ..NewArticle::default()
        };
        let bare = NewArticle {
            article_api_id: "a2".to_string(),
            ..NewArticle::default()
        };
        storage.upsert_article(&enriched, category.id, 100).unwrap();
        storage.upsert_article(&bare, category.id, 200).unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_categories, 1);
        assert_eq!(stats.total_articles, 2);
        assert_eq!(stats.enriched_articles, 1);
        assert_eq!(stats.latest_crawl_timestamp, Some(200));
        assert_eq!(
            stats.articles_per_category,
            vec![("Tenders".to_string(), 2)]
        );
    }

    #[test]
    fn test_empty_store_statistics() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_articles, 0);
        assert_eq!(stats.latest_crawl_timestamp, None);
    }
}
