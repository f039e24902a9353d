//! List/detail merge semantics
//!
//! The listing supplies the limited field set every item has; the detail
//! record optionally enriches it. The merge is an explicit field-by-field
//! rule: the detail value wins when present, the listing value survives when
//! the detail is null or absent entirely.

use crate::harvest::detail::ArticleDetail;
use crate::harvest::listing::ListItem;
use crate::storage::NewArticle;

/// Merges a listing item with its optional detail record into the fields to
/// be persisted
pub fn merge_article(
    article_api_id: &str,
    item: &ListItem,
    detail: Option<&ArticleDetail>,
) -> NewArticle {
    let Some(detail) = detail else {
        // No enrichment: the listing's fields are persisted alone
        return NewArticle {
            article_api_id: article_api_id.to_string(),
            title: item.title.clone(),
            publish_date: item.publish_date,
            district_name: item.district_name.clone(),
            project_name: item.project_name.clone(),
            purchase_name: item.purchase_name.clone(),
            budget_price: item.budget_price,
            ..NewArticle::default()
        };
    };

    NewArticle {
        article_api_id: article_api_id.to_string(),
        title: detail.title.clone().or_else(|| item.title.clone()),
        author: detail.author.clone(),
        publish_date: detail.publish_date.or(item.publish_date),
        district_name: detail
            .district_name
            .clone()
            .or_else(|| item.district_name.clone()),
        project_name: detail
            .project_name
            .clone()
            .or_else(|| item.project_name.clone()),
        purchase_name: detail
            .purchase_name
            .clone()
            .or_else(|| item.purchase_name.clone()),
        budget_price: detail.budget_price.or(item.budget_price),
        procurement_method: detail.procurement_method.clone(),
        supplier_name: detail.supplier_name.clone(),
        total_contract_amount: detail.total_contract_amount,
        bid_opening_time: detail.bid_opening_time,
        html_content: detail.html_content.clone(),
        text_content: detail.text_content.clone(),
        attachment_count: detail.attachment_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_overrides_when_non_null() {
        let item = ListItem {
            article_id: Some("a1".to_string()),
            title: Some("L".to_string()),
            budget_price: Some(100.0),
            ..ListItem::default()
        };
        let detail = ArticleDetail {
            title: Some("D".to_string()),
            budget_price: None,
            author: Some("A".to_string()),
            ..ArticleDetail::default()
        };

        let merged = merge_article("a1", &item, Some(&detail));

        assert_eq!(merged.title.as_deref(), Some("D"));
        assert_eq!(merged.budget_price, Some(100.0));
        assert_eq!(merged.author.as_deref(), Some("A"));
    }

    #[test]
    fn test_list_fields_persist_without_detail() {
        let item = ListItem {
            article_id: Some("a1".to_string()),
            title: Some("Listing title".to_string()),
            publish_date: Some(1_700_000_000_000),
            district_name: Some("North".to_string()),
            budget_price: Some(42.0),
            ..ListItem::default()
        };

        let merged = merge_article("a1", &item, None);

        assert_eq!(merged.article_api_id, "a1");
        assert_eq!(merged.title.as_deref(), Some("Listing title"));
        assert_eq!(merged.publish_date, Some(1_700_000_000_000));
        assert_eq!(merged.district_name.as_deref(), Some("North"));
        assert_eq!(merged.budget_price, Some(42.0));
        assert_eq!(merged.author, None);
        assert_eq!(merged.html_content, None);
    }

    #[test]
    fn test_both_null_stays_null() {
        let item = ListItem {
            article_id: Some("a1".to_string()),
            ..ListItem::default()
        };
        let detail = ArticleDetail::default();

        let merged = merge_article("a1", &item, Some(&detail));

        assert_eq!(merged.title, None);
        assert_eq!(merged.budget_price, None);
    }

    #[test]
    fn test_detail_only_fields_carried_over() {
        let item = ListItem {
            article_id: Some("a1".to_string()),
            title: Some("T".to_string()),
            ..ListItem::default()
        };
        let detail = ArticleDetail {
            html_content: Some("<p>b</p>".to_string()),
            text_content: Some("b".to_string()),
            procurement_method: Some("open tender".to_string()),
            supplier_name: Some("Acme".to_string()),
            total_contract_amount: Some(9000.0),
            bid_opening_time: Some(1_700_000_100_000),
            attachment_count: Some(3),
            ..ArticleDetail::default()
        };

        let merged = merge_article("a1", &item, Some(&detail));

        assert_eq!(merged.html_content.as_deref(), Some("<p>b</p>"));
        assert_eq!(merged.procurement_method.as_deref(), Some("open tender"));
        assert_eq!(merged.supplier_name.as_deref(), Some("Acme"));
        assert_eq!(merged.total_contract_amount, Some(9000.0));
        assert_eq!(merged.bid_opening_time, Some(1_700_000_100_000));
        assert_eq!(merged.attachment_count, Some(3));
        // The listing value survives the overlay
        assert_eq!(merged.title.as_deref(), Some("T"));
    }
}
