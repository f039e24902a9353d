//! Harvest module - the portal ingestion pipeline
//!
//! This module contains the core pipeline logic, including:
//! - Category tree extraction and persistence
//! - Paginated listing traversal
//! - Best-effort per-article detail enrichment
//! - List/detail merge semantics
//! - Overall crawl orchestration

mod categories;
mod detail;
mod listing;
mod merge;
mod orchestrator;

pub use categories::{extract_categories, sync_categories};
pub use detail::{fetch_article_detail, ArticleDetail};
pub use listing::{fetch_category_listing, ListItem};
pub use merge::merge_article;
pub use orchestrator::{Harvester, RunSummary};
