//! Paginated listing traversal
//!
//! Drives sequential page requests for one category and accumulates the
//! normalized list items. Each page answer moves a small state machine:
//! `FETCHING(page_no)` either continues with the next page number or stops.
//! Stopping has several independent triggers - an application-level failure
//! flag, a missing item container, an exhausted listing, the caller's page
//! cap, or the reported page count being reached. A transport or decode
//! error also stops the traversal; items accumulated so far are returned.

use crate::config::Config;
use crate::portal::{ListingEnvelope, PageBlock, PortalClient, RawListItem};
use crate::storage::CategoryRecord;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;

const LISTING_PATH: &str = "/portal/category";

/// One normalized listing item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub article_id: Option<String>,
    pub title: Option<String>,
    pub publish_date: Option<i64>,
    pub district_name: Option<String>,
    pub project_name: Option<String>,
    pub purchase_name: Option<String>,
    pub budget_price: Option<f64>,
}

impl From<RawListItem> for ListItem {
    fn from(raw: RawListItem) -> Self {
        Self {
            article_id: raw.article_id,
            title: raw.title,
            publish_date: raw.publish_date,
            district_name: raw.district_name,
            project_name: raw.project_name,
            purchase_name: raw.purchase_name,
            budget_price: raw.budget_price,
        }
    }
}

/// Outcome of one page fetch
#[derive(Debug, PartialEq)]
enum PageOutcome {
    /// Fetch the given page next
    Continue(u32),
    Stop,
}

/// Fetches all listing pages for one category, subject to an optional page
/// cap, and returns the accumulated normalized items
///
/// This never fails: every stop condition, including transport errors, is
/// logged with the category and page number, and whatever was accumulated is
/// returned.
pub async fn fetch_category_listing(
    client: &PortalClient,
    config: &Config,
    category: &CategoryRecord,
    page_cap: Option<u32>,
) -> Vec<ListItem> {
    let mut items = Vec::new();
    let mut page_no: u32 = 1;

    tracing::info!(
        category = %category.name,
        code = %category.category_code,
        ?page_cap,
        "Fetching listing"
    );

    loop {
        match fetch_page(client, config, category, page_no, page_cap, &mut items).await {
            PageOutcome::Continue(next) => {
                // Cooperative self-throttle between pages
                sleep(Duration::from_millis(config.crawler.page_delay_ms)).await;
                page_no = next;
            }
            PageOutcome::Stop => break,
        }
    }

    tracing::info!(
        category = %category.name,
        "Fetched {} listing items in total",
        items.len()
    );
    items
}

/// Fetches one page, appends its items, and decides the next transition
async fn fetch_page(
    client: &PortalClient,
    config: &Config,
    category: &CategoryRecord,
    page_no: u32,
    page_cap: Option<u32>,
    items: &mut Vec<ListItem>,
) -> PageOutcome {
    let mut body = serde_json::json!({
        "pageNo": page_no,
        "pageSize": config.portal.page_size,
        "categoryCode": category.category_code,
        "isGov": config.portal.is_gov,
        "excludeDistrictPrefix": config.portal.exclude_district_prefixes,
        "isProvince": config.portal.is_province,
        "_t": Utc::now().timestamp_millis(),
    });
    if let Some(path_name) = category.path_name.as_deref().filter(|p| !p.is_empty()) {
        body["pathName"] = serde_json::json!(path_name);
    }

    let payload = match client
        .post_json(
            LISTING_PATH,
            &body,
            Duration::from_millis(config.crawler.listing_timeout_ms),
        )
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(
                category = %category.name,
                page = page_no,
                "Listing request failed: {}",
                e
            );
            return PageOutcome::Stop;
        }
    };

    let envelope: ListingEnvelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(
                category = %category.name,
                page = page_no,
                "Unexpected listing payload shape: {}",
                e
            );
            return PageOutcome::Stop;
        }
    };

    if !envelope.success {
        let message = envelope
            .error
            .map(|e| e.message_or_unknown())
            .unwrap_or_else(|| "Unknown portal error".to_string());
        tracing::warn!(
            category = %category.name,
            page = page_no,
            "Portal reported failure: {}",
            message
        );
        return PageOutcome::Stop;
    }

    let block = match envelope.result.and_then(|r| r.data) {
        Some(block) => block,
        None => {
            tracing::error!(
                category = %category.name,
                page = page_no,
                "Listing payload is missing result.data"
            );
            return PageOutcome::Stop;
        }
    };

    let page_items = match block.items() {
        Some(page_items) => page_items,
        None => {
            tracing::warn!(
                category = %category.name,
                page = page_no,
                "Listing payload has no item container"
            );
            return PageOutcome::Stop;
        }
    };

    if page_items.is_empty() {
        tracing::info!(
            category = %category.name,
            page = page_no,
            "No {}articles on page",
            if page_no > 1 { "more " } else { "" }
        );
        return PageOutcome::Stop;
    }

    items.extend(page_items.iter().cloned().map(ListItem::from));

    let current = block.current.unwrap_or(page_no);
    let total_pages = reported_total_pages(&block, config.portal.page_size);
    tracing::info!(
        category = %category.name,
        "Page {}/{} fetched, {} articles on this page",
        current,
        total_pages,
        page_items.len()
    );

    page_transition(current, total_pages, page_cap)
}

/// Total page count from response metadata, computed from the total item
/// count when the server omits it
fn reported_total_pages(block: &PageBlock, requested_page_size: u32) -> u32 {
    if let Some(pages) = block.pages {
        return pages;
    }
    let total = block.total.unwrap_or(0);
    let size = block.size.unwrap_or(requested_page_size) as u64;
    if size == 0 {
        0
    } else {
        ((total + size - 1) / size) as u32
    }
}

/// Decides whether to continue after a successfully consumed page
fn page_transition(current: u32, total_pages: u32, page_cap: Option<u32>) -> PageOutcome {
    if let Some(cap) = page_cap {
        if current >= cap {
            tracing::info!("Reached page cap ({})", cap);
            return PageOutcome::Stop;
        }
    }
    if current >= total_pages {
        tracing::info!("Fetched all available pages ({})", total_pages);
        return PageOutcome::Stop;
    }
    PageOutcome::Continue(current + 1)
}
