use serde::Deserialize;

/// Main configuration structure for Tender-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Upstream portal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the portal, e.g. "https://portal.example.gov"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Root parentId query parameter for the category tree endpoint
    #[serde(rename = "tree-parent-id")]
    pub tree_parent_id: String,

    /// siteId query parameter for the category tree endpoint
    #[serde(rename = "tree-site-id")]
    pub tree_site_id: String,

    /// Categories are selected when their code starts with this prefix
    #[serde(rename = "category-code-prefix")]
    pub category_code_prefix: String,

    /// Number of items requested per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// District prefixes excluded from listing requests
    #[serde(rename = "exclude-district-prefixes", default)]
    pub exclude_district_prefixes: Vec<String>,

    /// Tenant-scoping flag sent with every listing request
    #[serde(rename = "is-gov", default = "default_true")]
    pub is_gov: bool,

    /// Tenant-scoping flag sent with every listing request
    #[serde(rename = "is-province", default = "default_true")]
    pub is_province: bool,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Timeout for the category tree request (milliseconds)
    #[serde(rename = "tree-timeout-ms", default = "default_tree_timeout")]
    pub tree_timeout_ms: u64,

    /// Timeout for each listing page request (milliseconds)
    #[serde(rename = "listing-timeout-ms", default = "default_listing_timeout")]
    pub listing_timeout_ms: u64,

    /// Timeout for each detail request (milliseconds)
    #[serde(rename = "detail-timeout-ms", default = "default_detail_timeout")]
    pub detail_timeout_ms: u64,

    /// Cooperative delay between listing pages (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Cooperative delay after each successful detail fetch (milliseconds)
    #[serde(rename = "detail-delay-ms", default = "default_detail_delay")]
    pub detail_delay_ms: u64,

    /// Maximum number of categories to process (absent = all)
    #[serde(rename = "max-categories", default)]
    pub max_categories: Option<u32>,

    /// Maximum number of listing pages per category (absent = all)
    #[serde(rename = "max-pages-per-category", default)]
    pub max_pages_per_category: Option<u32>,

    /// Maximum number of articles enriched and saved per category (absent = all)
    #[serde(rename = "max-articles-per-category", default)]
    pub max_articles_per_category: Option<u32>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_page_size() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

fn default_tree_timeout() -> u64 {
    10_000
}

fn default_listing_timeout() -> u64 {
    20_000
}

fn default_detail_timeout() -> u64 {
    10_000
}

fn default_page_delay() -> u64 {
    1_000
}

fn default_detail_delay() -> u64 {
    500
}
