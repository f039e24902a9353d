//! Portal access module
//!
//! This module contains the HTTP client adapter for the upstream portal and
//! the wire payload shapes it speaks. Responses are decoded into the typed
//! envelopes here before any traversal or normalization happens, so the rest
//! of the crate never touches raw JSON shapes directly.

mod client;

pub use client::PortalClient;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors produced while talking to the portal
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}: {body_prefix}")]
    HttpStatus {
        url: String,
        status: u16,
        body_prefix: String,
    },

    #[error("Request error for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Malformed JSON from {url}: {body_prefix}")]
    Decode { url: String, body_prefix: String },

    #[error("Portal reported failure: {message}")]
    Application { message: String },
}

/// Truncates a response body for inclusion in error messages
pub(crate) fn body_prefix(body: &str) -> String {
    body.chars().take(200).collect()
}

// ===== Category tree payload =====

/// Envelope of the category tree endpoint: `{result: {data: [...]}}`
#[derive(Debug, Deserialize)]
pub struct TreeEnvelope {
    pub result: Option<TreeResult>,
}

#[derive(Debug, Deserialize)]
pub struct TreeResult {
    pub data: Option<Vec<TreeNode>>,
}

/// One node of the portal's category tree
#[derive(Debug, Deserialize)]
pub struct TreeNode {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub children: Option<Vec<TreeNode>>,
}

// ===== Listing payload =====

/// Envelope of the listing endpoint:
/// `{success, result: {data: {records|data: [...], current, total, size, pages}}}`
#[derive(Debug, Deserialize)]
pub struct ListingEnvelope {
    #[serde(default)]
    pub success: bool,
    pub error: Option<ApiError>,
    pub result: Option<ListingResult>,
}

#[derive(Debug, Deserialize)]
pub struct ListingResult {
    pub data: Option<PageBlock>,
}

/// One page of listing results plus its pagination metadata
#[derive(Debug, Deserialize)]
pub struct PageBlock {
    /// Preferred item container
    pub records: Option<Vec<RawListItem>>,
    /// Fallback item container used by older portal deployments
    pub data: Option<Vec<RawListItem>>,
    pub current: Option<u32>,
    pub total: Option<u64>,
    pub size: Option<u32>,
    pub pages: Option<u32>,
}

impl PageBlock {
    /// Returns the item array, preferring `records` over `data`
    pub fn items(&self) -> Option<&Vec<RawListItem>> {
        self.records.as_ref().or(self.data.as_ref())
    }
}

/// One listing item as the portal sends it
#[derive(Debug, Clone, Deserialize)]
pub struct RawListItem {
    #[serde(
        rename = "articleId",
        default,
        deserialize_with = "de_string_or_number"
    )]
    pub article_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "publishDate")]
    pub publish_date: Option<i64>,
    #[serde(rename = "districtName")]
    pub district_name: Option<String>,
    #[serde(rename = "projectName")]
    pub project_name: Option<String>,
    #[serde(rename = "purchaseName")]
    pub purchase_name: Option<String>,
    #[serde(rename = "budgetPrice")]
    pub budget_price: Option<f64>,
}

// ===== Detail payload =====

/// Envelope of the detail endpoint. The record itself lives either under
/// `result.data` or directly under `result`, depending on article type.
#[derive(Debug, Deserialize)]
pub struct DetailEnvelope {
    #[serde(default)]
    pub success: bool,
    pub error: Option<ApiError>,
    pub result: Option<serde_json::Value>,
}

/// The detail record fields once unwrapped from the envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetail {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "publishDate")]
    pub publish_date: Option<i64>,
    #[serde(rename = "htmlContent")]
    pub html_content: Option<String>,
    /// Older article types carry the body under `content`
    pub content: Option<String>,
    #[serde(rename = "textContent")]
    pub text_content: Option<String>,
    #[serde(rename = "attachmentCount")]
    pub attachment_count: Option<i64>,
    #[serde(rename = "districtName")]
    pub district_name: Option<String>,
    #[serde(rename = "projectName")]
    pub project_name: Option<String>,
    #[serde(rename = "purchaseName")]
    pub purchase_name: Option<String>,
    #[serde(rename = "budgetPrice")]
    pub budget_price: Option<f64>,
    #[serde(rename = "procurementMethod")]
    pub procurement_method: Option<String>,
    #[serde(rename = "supplierName")]
    pub supplier_name: Option<String>,
    #[serde(rename = "totalContractAmount")]
    pub total_contract_amount: Option<f64>,
    #[serde(rename = "bidOpeningTime")]
    pub bid_opening_time: Option<i64>,
}

/// Application-level error body embedded in failure responses
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
}

impl ApiError {
    pub fn message_or_unknown(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown portal error".to_string())
    }
}

/// Accepts either a JSON string or a number for identifier fields; the
/// portal is not consistent about which it sends.
fn de_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_envelope_records_preferred() {
        let json = r#"{
            "success": true,
            "result": {"data": {
                "records": [{"articleId": "a1", "title": "R"}],
                "data": [{"articleId": "a2", "title": "D"}],
                "current": 1, "total": 1, "size": 15, "pages": 1
            }}
        }"#;
        let envelope: ListingEnvelope = serde_json::from_str(json).unwrap();
        let block = envelope.result.unwrap().data.unwrap();
        let items = block.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].article_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_listing_envelope_data_fallback() {
        let json = r#"{
            "success": true,
            "result": {"data": {
                "data": [{"articleId": "a2"}],
                "current": 1
            }}
        }"#;
        let envelope: ListingEnvelope = serde_json::from_str(json).unwrap();
        let block = envelope.result.unwrap().data.unwrap();
        assert_eq!(
            block.items().unwrap()[0].article_id.as_deref(),
            Some("a2")
        );
    }

    #[test]
    fn test_numeric_article_id_accepted() {
        let json = r#"{"articleId": 12345, "title": "T"}"#;
        let item: RawListItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.article_id.as_deref(), Some("12345"));
    }

    #[test]
    fn test_missing_success_defaults_false() {
        let json = r#"{"result": null}"#;
        let envelope: ListingEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
    }

    #[test]
    fn test_tree_node_decodes_nested_children() {
        let json = r#"{
            "id": 1, "name": "Root", "code": "600007", "parentId": 0,
            "children": [{"id": 2, "name": "Leaf", "code": "110-1", "parentId": 1}]
        }"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        let children = node.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].code.as_deref(), Some("110-1"));
        assert!(children[0].children.is_none());
    }
}
