//! Resource Fetcher
//!
//! Sequential page walking over a [`Collection`]. Each page is requested only
//! after the previous page's token is known, and HTTP failures are returned
//! on the first attempt.

use super::collection::{with_query, Collection, PageRequest};
use crate::error::{Error, Result};
use crate::gcp::client::GcpClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Page size used by export
pub const EXPORT_PAGE_SIZE: u32 = 100;

/// Fields the API sets itself; they are dropped before re-creating exported items
const OUTPUT_ONLY_FIELDS: &[&str] = &[
    "name",
    "createTime",
    "updateTime",
    "state",
    "status",
    "creatorEmail",
    "lastModifierEmail",
    "validTime",
    "expiryTime",
];

/// One decoded page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// `None` on the final page
    pub next_page_token: Option<String>,
}

impl Page {
    /// Decode a list response whose items live under `items_key`
    pub fn parse(bytes: &[u8], items_key: &str) -> Result<Self> {
        let mut envelope: Map<String, Value> = serde_json::from_slice(bytes)?;

        let items = match envelope.remove(items_key) {
            Some(items) => serde_json::from_value(items)?,
            None => Vec::new(),
        };

        Ok(Self {
            items,
            next_page_token: token_from(&envelope),
        })
    }
}

fn token_from(envelope: &Map<String, Value>) -> Option<String> {
    envelope
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Only the pagination cursor of a page
#[derive(Deserialize)]
struct PageCursor {
    #[serde(rename = "nextPageToken", default)]
    next_page_token: String,
}

/// The two fields display-name lookup needs
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResourceSummary {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// Trailing segment of a resource name
/// e.g. "projects/p/locations/l/authConfigs/123" -> "123"
pub fn short_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Short ID of a listed resource, rejecting names with an empty trailing segment
pub fn resource_id(name: &str) -> Result<&str> {
    match short_id(name) {
        "" => Err(Error::malformed(format!(
            "resource name '{name}' has no trailing ID"
        ))),
        id => Ok(id),
    }
}

/// Fetch one page and return its raw bytes
pub async fn fetch_raw(
    client: &GcpClient,
    collection: &Collection,
    request: &PageRequest,
) -> Result<Vec<u8>> {
    let url = with_query(&collection.url, &request.query_pairs())?;
    client.get(&url).await
}

/// Fetch and decode one page
pub async fn fetch_page(
    client: &GcpClient,
    collection: &Collection,
    request: &PageRequest,
) -> Result<(Page, Vec<u8>)> {
    let raw = fetch_raw(client, collection, request).await?;
    let page = Page::parse(&raw, collection.items_key)?;
    Ok((page, raw))
}

/// Fetch all items (auto-paginate), starting from `request`
pub async fn fetch_all(
    client: &GcpClient,
    collection: &Collection,
    request: &PageRequest,
) -> Result<Vec<Value>> {
    let mut request = request.clone();
    let mut all_items = Vec::new();

    loop {
        let (page, _) = fetch_page(client, collection, &request).await?;
        all_items.extend(page.items);

        match page.next_page_token {
            Some(token) => request.page_token = token,
            None => break,
        }
    }

    Ok(all_items)
}

/// Short ID of the first item whose `displayName` equals `display_name`
///
/// Matching is exact and case-sensitive. Stops fetching on the first match.
pub async fn find(client: &GcpClient, collection: &Collection, display_name: &str) -> Result<String> {
    let mut request = PageRequest::default();
    let mut pages = 0usize;

    loop {
        let (page, _) = fetch_page(client, collection, &request).await?;
        pages += 1;

        for item in &page.items {
            let summary = ResourceSummary::deserialize(item)?;
            if summary.display_name == display_name {
                tracing::debug!(
                    "Found {} '{}' as {} after {} page(s)",
                    collection.kind,
                    display_name,
                    summary.name,
                    pages
                );
                return Ok(resource_id(&summary.name)?.to_string());
            }
        }

        match page.next_page_token {
            Some(token) => request.page_token = token,
            None => {
                return Err(Error::NotFound {
                    kind: collection.kind.to_string(),
                    display_name: display_name.to_string(),
                })
            }
        }
    }
}

/// Write every page of `collection` into `dir` as `<prefix>_<N>.json`
///
/// Pages are written byte-for-byte as received. A write failure aborts the
/// export; files already written are left in place.
pub async fn export(client: &GcpClient, collection: &Collection, dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;

    let mut request = PageRequest {
        page_size: Some(EXPORT_PAGE_SIZE),
        ..PageRequest::default()
    };
    let mut written = Vec::new();

    loop {
        let raw = fetch_raw(client, collection, &request).await?;

        let path = dir.join(format!("{}_{}.json", collection.file_prefix, written.len() + 1));
        tokio::fs::write(&path, &raw)
            .await
            .map_err(|e| Error::io(&path, e))?;
        tracing::info!("Downloaded {}", path.display());
        written.push(path);

        let cursor: PageCursor = serde_json::from_slice(&raw)?;
        if cursor.next_page_token.is_empty() {
            break;
        }
        request.page_token = cursor.next_page_token;
    }

    Ok(written)
}

/// Page number of an export file named `<prefix>_<N>.json`
fn export_index(path: &Path, prefix: &str) -> Option<u32> {
    let stem = path.file_name()?.to_str()?.strip_suffix(".json")?;
    stem.strip_prefix(prefix)?.strip_prefix('_')?.parse().ok()
}

/// Read every item from an export directory, in page order
pub fn read_export_dir(collection: &Collection, dir: &Path) -> Result<Vec<Value>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut pages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if let Some(index) = export_index(&path, collection.file_prefix) {
            pages.push((index, path));
        }
    }
    pages.sort_by_key(|(index, _)| *index);

    if pages.is_empty() {
        return Err(Error::validation(format!(
            "no {}_<N>.json files found in {}",
            collection.file_prefix,
            dir.display()
        )));
    }

    let mut items = Vec::new();
    for (_, path) in pages {
        let bytes = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
        items.extend(Page::parse(&bytes, collection.items_key)?.items);
    }

    Ok(items)
}

/// Remove server-populated fields so an exported item can be created again
pub fn strip_output_only(item: &mut Value) {
    if let Value::Object(map) = item {
        for field in OUTPUT_ONLY_FIELDS {
            map.remove(*field);
        }
    }
}
