use crate::config::types::{Config, CrawlerConfig, OutputConfig, PortalConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates portal configuration
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let parsed = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url must be http or https, got '{}'",
                other
            )))
        }
    }

    if config.tree_parent_id.is_empty() {
        return Err(ConfigError::Validation(
            "tree-parent-id cannot be empty".to_string(),
        ));
    }

    if config.tree_site_id.is_empty() {
        return Err(ConfigError::Validation(
            "tree-site-id cannot be empty".to_string(),
        ));
    }

    if config.category_code_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "category-code-prefix cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.tree_timeout_ms < 100
        || config.listing_timeout_ms < 100
        || config.detail_timeout_ms < 100
    {
        return Err(ConfigError::Validation(
            "request timeouts must be >= 100ms".to_string(),
        ));
    }

    if let Some(0) = config.max_pages_per_category {
        return Err(ConfigError::Validation(
            "max-pages-per-category must be >= 1 when set".to_string(),
        ));
    }

    if let Some(0) = config.max_categories {
        return Err(ConfigError::Validation(
            "max-categories must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
