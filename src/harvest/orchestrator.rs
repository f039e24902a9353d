//! Harvest orchestration - the main crawl loop
//!
//! Sequences the whole pipeline: extract-and-persist categories, then for
//! each category walk its listing pages, enrich each item with a detail
//! fetch, merge, and upsert. Failures at the item or category level are
//! logged and skipped; only category extraction failing outright aborts the
//! run, because it leaves nothing to iterate over.

use crate::config::Config;
use crate::harvest::categories::sync_categories;
use crate::harvest::detail::fetch_article_detail;
use crate::harvest::listing::fetch_category_listing;
use crate::harvest::merge::merge_article;
use crate::portal::PortalClient;
use crate::storage::{SqliteStorage, Storage};
use crate::{HarvestError, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

/// Run-level counters reported at the end of a harvest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Categories whose listing was walked
    pub categories_processed: u64,
    /// List items considered after the per-category cap
    pub articles_considered: u64,
    /// Detail fetches that returned a record
    pub details_fetched: u64,
    /// Articles written to the store
    pub articles_saved: u64,
}

/// Drives one complete harvest run
pub struct Harvester {
    config: Config,
    client: PortalClient,
    storage: SqliteStorage,
}

impl Harvester {
    /// Creates a new harvester instance
    ///
    /// Opens (and bootstraps, if needed) the store at the configured path
    /// and builds the portal client.
    pub fn new(config: Config) -> Result<Self> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let client = PortalClient::new(&config.portal)?;

        Ok(Self {
            config,
            client,
            storage,
        })
    }

    /// Runs the full pipeline and returns the run summary
    pub async fn run(&mut self) -> Result<RunSummary> {
        tracing::info!(
            max_categories = ?self.config.crawler.max_categories,
            max_pages = ?self.config.crawler.max_pages_per_category,
            max_articles = ?self.config.crawler.max_articles_per_category,
            "Starting harvest run"
        );

        let mut summary = RunSummary::default();

        let categories =
            sync_categories(&self.client, &self.config, &mut self.storage).await?;
        if categories.is_empty() {
            return Err(HarvestError::NoCategories(
                "tree extraction yielded no categories".to_string(),
            ));
        }
        tracing::info!("Found {} categories to process", categories.len());

        for (index, category) in categories.iter().enumerate() {
            if let Some(max) = self.config.crawler.max_categories {
                if summary.categories_processed >= max as u64 {
                    tracing::info!("Reached category cap ({}), stopping", max);
                    break;
                }
            }

            tracing::info!(
                "Processing category {}/{}: '{}' (ID {})",
                index + 1,
                categories.len(),
                category.name,
                category.id
            );

            let items = fetch_category_listing(
                &self.client,
                &self.config,
                category,
                self.config.crawler.max_pages_per_category,
            )
            .await;
            summary.categories_processed += 1;

            if items.is_empty() {
                tracing::info!(category = %category.name, "No articles listed");
                continue;
            }

            let considered = match self.config.crawler.max_articles_per_category {
                Some(max) if (max as usize) < items.len() => {
                    tracing::info!(
                        category = %category.name,
                        "Limiting detail processing to {} of {} articles",
                        max,
                        items.len()
                    );
                    &items[..max as usize]
                }
                _ => &items[..],
            };
            summary.articles_considered += considered.len() as u64;

            let mut category_details = 0u64;
            let mut category_saved = 0u64;

            for (item_index, item) in considered.iter().enumerate() {
                let Some(article_id) =
                    item.article_id.as_deref().filter(|id| !id.is_empty())
                else {
                    tracing::warn!(
                        category = %category.name,
                        "Skipping list item without an article ID"
                    );
                    continue;
                };

                tracing::info!(
                    "  Article {}/{}: '{}' ({})",
                    item_index + 1,
                    considered.len(),
                    item.title.as_deref().unwrap_or("No title"),
                    article_id
                );

                let detail = fetch_article_detail(&self.client, &self.config, article_id).await;
                if detail.is_some() {
                    summary.details_fetched += 1;
                    category_details += 1;
                }

                let merged = merge_article(article_id, item, detail.as_ref());
                let crawl_timestamp = Utc::now().timestamp();

                match self
                    .storage
                    .upsert_article(&merged, category.id, crawl_timestamp)
                {
                    Ok(_) => {
                        summary.articles_saved += 1;
                        category_saved += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            category = %category.name,
                            article_id,
                            "Failed to save article: {}",
                            e
                        );
                    }
                }

                // Throttle only when a detail round-trip actually happened
                if detail.is_some() {
                    sleep(Duration::from_millis(self.config.crawler.detail_delay_ms)).await;
                }
            }

            tracing::info!(
                category = %category.name,
                "Finished category: {} considered, {} details fetched, {} saved",
                considered.len(),
                category_details,
                category_saved
            );
        }

        tracing::info!("Harvest run finished");
        tracing::info!("Categories processed: {}", summary.categories_processed);
        tracing::info!("Articles considered: {}", summary.articles_considered);
        tracing::info!("Details fetched: {}", summary.details_fetched);
        tracing::info!("Articles saved: {}", summary.articles_saved);

        Ok(summary)
    }
}
