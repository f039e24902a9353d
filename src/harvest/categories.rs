//! Category tree extraction
//!
//! The portal exposes its taxonomy as one nested tree payload. This module
//! fetches that payload once, walks it depth-first while accumulating the
//! ancestor-name path, selects the nodes whose code carries the configured
//! tenant prefix, and upserts each selected node so the rest of the pipeline
//! works purely in terms of persisted category IDs.

use crate::config::Config;
use crate::portal::{PortalClient, TreeEnvelope, TreeNode};
use crate::storage::{CategoryRecord, NewCategory, Storage};
use crate::Result;
use std::time::Duration;

const TREE_PATH: &str = "/admin/category/home/categoryTreeFind";

/// Walks decoded tree nodes and returns the categories matching the code
/// prefix, in tree order
///
/// Non-matching ancestors still contribute their names to descendant paths.
/// Nodes without a name are skipped entirely, subtree included.
pub fn extract_categories(nodes: &[TreeNode], code_prefix: &str) -> Vec<NewCategory> {
    let mut matches = Vec::new();
    let mut path = Vec::new();
    walk(nodes, code_prefix, &mut path, &mut matches);
    matches
}

fn walk(
    nodes: &[TreeNode],
    code_prefix: &str,
    path: &mut Vec<String>,
    matches: &mut Vec<NewCategory>,
) {
    for node in nodes {
        let name = match node.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                tracing::debug!("Skipping tree node without a name");
                continue;
            }
        };

        path.push(name.clone());

        if let Some(code) = &node.code {
            if code.starts_with(code_prefix) {
                matches.push(NewCategory {
                    name,
                    category_code: code.clone(),
                    path_name: format!("/{}", path.join("/")),
                    source_id: node.id,
                    parent_source_id: node.parent_id,
                });
            }
        }

        // Matches may nest, so recurse regardless of whether this node matched
        if let Some(children) = &node.children {
            walk(children, code_prefix, path, matches);
        }

        path.pop();
    }
}

/// Fetches the category tree, extracts matching categories, and upserts each
/// one, returning the full set as stored (with local IDs)
///
/// A payload without the expected nested shape is a data-contract error: it
/// is logged and yields an empty set rather than an `Err`. Transport and
/// decode failures propagate - with no categories there is nothing to crawl.
pub async fn sync_categories<S: Storage>(
    client: &PortalClient,
    config: &Config,
    storage: &mut S,
) -> Result<Vec<CategoryRecord>> {
    let query = [
        ("parentId", config.portal.tree_parent_id.clone()),
        ("siteId", config.portal.tree_site_id.clone()),
    ];
    tracing::info!(
        parent_id = %config.portal.tree_parent_id,
        site_id = %config.portal.tree_site_id,
        "Fetching category tree"
    );

    let payload = client
        .get_json(
            TREE_PATH,
            &query,
            Duration::from_millis(config.crawler.tree_timeout_ms),
        )
        .await?;

    let envelope: TreeEnvelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!("Unexpected category tree payload shape: {}", e);
            return Ok(Vec::new());
        }
    };

    let nodes = match envelope.result.and_then(|r| r.data) {
        Some(nodes) => nodes,
        None => {
            tracing::error!("Category tree payload is missing result.data");
            return Ok(Vec::new());
        }
    };

    let extracted = extract_categories(&nodes, &config.portal.category_code_prefix);
    tracing::info!("Extracted {} categories from tree", extracted.len());

    let mut stored = Vec::with_capacity(extracted.len());
    for category in &extracted {
        match storage.upsert_category(category) {
            Ok(record) => stored.push(record),
            Err(e) => {
                tracing::error!(
                    code = %category.category_code,
                    "Failed to persist category: {}",
                    e
                );
            }
        }
    }

    tracing::info!("{} categories available in store", stored.len());
    Ok(stored)
}
