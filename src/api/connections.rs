//! Connections
//!
//! Configured connector instances, under the Connectors API
//! `projects/P/locations/R/connections`.

use crate::error::Result;
use crate::gcp::client::GcpClient;
use crate::resource::{self, short_id, with_query, Collection, PageRequest, View};
use crate::validate;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub fn collection(client: &GcpClient) -> Collection {
    Collection {
        kind: "connection",
        items_key: "connections",
        file_prefix: "connections",
        url: client.connectors_url("connections"),
    }
}

/// Create connection `id` from a JSON document; returns the long-running operation
pub async fn create(client: &GcpClient, id: &str, body: &Value) -> Result<Vec<u8>> {
    validate::resource_id("connection", id)?;

    let url = with_query(&collection(client).url, &[("connectionId", id)])?;
    client.post(&url, Some(body)).await
}

pub async fn get(client: &GcpClient, id: &str, view: Option<View>) -> Result<Vec<u8>> {
    let view = view.map(View::as_str).unwrap_or_default();
    let url = with_query(&collection(client).item_url(id), &[("view", view)])?;
    client.get(&url).await
}

pub async fn list(client: &GcpClient, request: &PageRequest) -> Result<Vec<u8>> {
    resource::fetch_raw(client, &collection(client), request).await
}

pub async fn delete(client: &GcpClient, id: &str) -> Result<Vec<u8>> {
    client.delete(&collection(client).item_url(id)).await
}

/// Update the fields named in `update_mask` (comma separated)
pub async fn patch(client: &GcpClient, id: &str, body: &Value, update_mask: &str) -> Result<Vec<u8>> {
    let url = with_query(
        &collection(client).item_url(id),
        &[("updateMask", update_mask)],
    )?;
    client.patch(&url, body).await
}

pub async fn export(client: &GcpClient, dir: &Path) -> Result<Vec<PathBuf>> {
    resource::export(client, &collection(client), dir).await
}

/// Re-create every connection found in an export directory
///
/// Each connection keeps the ID from its exported `name`. Returns the number
/// of create operations started.
pub async fn import(client: &GcpClient, dir: &Path) -> Result<usize> {
    let items = resource::read_export_dir(&collection(client), dir)?;
    let count = items.len();

    for mut item in items {
        let id = item
            .get("name")
            .and_then(|v| v.as_str())
            .map(|n| short_id(n).to_string())
            .unwrap_or_default();
        resource::strip_output_only(&mut item);

        create(client, &id, &item).await?;
        tracing::info!("Started creation of connection {}", id);
    }

    Ok(count)
}
