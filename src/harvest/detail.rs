//! Per-article detail enrichment
//!
//! One detail request per listing item, keyed by the portal's article ID.
//! Enrichment is strictly best-effort: any failure - a missing ID, transport
//! trouble, an application-level failure flag, or an unrecognized payload -
//! is logged for that item and yields `None` instead of an error.

use crate::config::Config;
use crate::portal::{DetailEnvelope, PortalClient, RawDetail};
use chrono::Utc;
use std::time::Duration;

const DETAIL_PATH: &str = "/portal/detail";

/// The enrichment record for one article
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDetail {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<i64>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub attachment_count: Option<i64>,
    pub district_name: Option<String>,
    pub project_name: Option<String>,
    pub purchase_name: Option<String>,
    pub budget_price: Option<f64>,
    pub procurement_method: Option<String>,
    pub supplier_name: Option<String>,
    pub total_contract_amount: Option<f64>,
    pub bid_opening_time: Option<i64>,
}

impl From<RawDetail> for ArticleDetail {
    fn from(raw: RawDetail) -> Self {
        Self {
            title: raw.title,
            author: raw.author,
            publish_date: raw.publish_date,
            // Older article types carry the body under `content`
            html_content: raw.html_content.or(raw.content),
            text_content: raw.text_content,
            attachment_count: raw.attachment_count,
            district_name: raw.district_name,
            project_name: raw.project_name,
            purchase_name: raw.purchase_name,
            budget_price: raw.budget_price,
            procurement_method: raw.procurement_method,
            supplier_name: raw.supplier_name,
            total_contract_amount: raw.total_contract_amount,
            bid_opening_time: raw.bid_opening_time,
        }
    }
}

/// Fetches the detail record for one article ID, returning `None` on any
/// failure
pub async fn fetch_article_detail(
    client: &PortalClient,
    config: &Config,
    article_id: &str,
) -> Option<ArticleDetail> {
    if article_id.is_empty() {
        tracing::warn!("Detail fetch requested with an empty article ID");
        return None;
    }

    let query = [
        ("articleId", article_id.to_string()),
        ("timestamp", Utc::now().timestamp_millis().to_string()),
    ];

    let payload = match client
        .get_json(
            DETAIL_PATH,
            &query,
            Duration::from_millis(config.crawler.detail_timeout_ms),
        )
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(article_id, "Detail request failed: {}", e);
            return None;
        }
    };

    let envelope: DetailEnvelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(article_id, "Unexpected detail payload shape: {}", e);
            return None;
        }
    };

    if !envelope.success {
        let message = envelope
            .error
            .map(|e| e.message_or_unknown())
            .unwrap_or_else(|| "Unknown portal error".to_string());
        tracing::warn!(article_id, "Portal reported failure: {}", message);
        return None;
    }

    // The record lives under result.data or directly under result,
    // depending on article type
    let record = match envelope.result {
        Some(serde_json::Value::Object(mut result)) => {
            if result.contains_key("data") {
                match result.remove("data") {
                    Some(serde_json::Value::Object(data)) => serde_json::Value::Object(data),
                    _ => {
                        tracing::error!(article_id, "Detail payload's data field is not a record");
                        return None;
                    }
                }
            } else {
                serde_json::Value::Object(result)
            }
        }
        _ => {
            tracing::error!(article_id, "Detail payload has no result object");
            return None;
        }
    };

    match serde_json::from_value::<RawDetail>(record) {
        Ok(raw) => {
            tracing::debug!(article_id, "Fetched article detail");
            Some(ArticleDetail::from(raw))
        }
        Err(e) => {
            tracing::error!(article_id, "Detail record failed to decode: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, CrawlerConfig, OutputConfig, PortalConfig};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Config {
        Config {
            portal: PortalConfig {
                base_url: base_url.to_string(),
                tree_parent_id: "600007".to_string(),
                tree_site_id: "110".to_string(),
                category_code_prefix: "110-".to_string(),
                page_size: 15,
                exclude_district_prefixes: vec![],
                is_gov: true,
                is_province: true,
            },
            crawler: CrawlerConfig {
                tree_timeout_ms: 5_000,
                listing_timeout_ms: 5_000,
                detail_timeout_ms: 5_000,
                page_delay_ms: 0,
                detail_delay_ms: 0,
                max_categories: None,
                max_pages_per_category: None,
                max_articles_per_category: None,
            },
            output: OutputConfig {
                database_path: ":memory:".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_detail_under_result_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .and(query_param("articleId", "a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": {"data": {
                    "title": "T", "author": "Office", "content": "<p>legacy body</p>",
                    "attachmentCount": 2
                }}
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = PortalClient::new(&config.portal).unwrap();
        let detail = fetch_article_detail(&client, &config, "a1").await.unwrap();

        assert_eq!(detail.title.as_deref(), Some("T"));
        assert_eq!(detail.author.as_deref(), Some("Office"));
        // htmlContent absent: the `content` fallback supplies the body
        assert_eq!(detail.html_content.as_deref(), Some("<p>legacy body</p>"));
        assert_eq!(detail.attachment_count, Some(2));
    }

    #[tokio::test]
    async fn test_detail_under_bare_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": {"title": "Bare", "htmlContent": "<p>b</p>"}
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = PortalClient::new(&config.portal).unwrap();
        let detail = fetch_article_detail(&client, &config, "a1").await.unwrap();

        assert_eq!(detail.title.as_deref(), Some("Bare"));
        assert_eq!(detail.html_content.as_deref(), Some("<p>b</p>"));
    }

    #[tokio::test]
    async fn test_application_failure_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": {"message": "article withdrawn"}
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = PortalClient::new(&config.portal).unwrap();
        assert!(fetch_article_detail(&client, &config, "a1").await.is_none());
    }

    #[tokio::test]
    async fn test_http_error_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = PortalClient::new(&config.portal).unwrap();
        assert!(fetch_article_detail(&client, &config, "a1").await.is_none());
    }

    #[tokio::test]
    async fn test_non_object_result_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": "gone"
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = PortalClient::new(&config.portal).unwrap();
        assert!(fetch_article_detail(&client, &config, "a1").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_article_id_short_circuits() {
        // No server: an empty ID must not issue a request at all
        let config = test_config("http://127.0.0.1:9");
        let client = PortalClient::new(&config.portal).unwrap();
        assert!(fetch_article_detail(&client, &config, "").await.is_none());
    }
}
