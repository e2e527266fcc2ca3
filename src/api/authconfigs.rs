//! Auth configs
//!
//! Stored credential bundles of Application Integration, under
//! `projects/P/locations/R/authConfigs`.

use crate::error::Result;
use crate::gcp::client::GcpClient;
use crate::gcp::kms;
use crate::resource::{self, short_id, with_query, Collection, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub fn collection(client: &GcpClient) -> Collection {
    Collection {
        kind: "authConfig",
        items_key: "authConfigs",
        file_prefix: "authconfigs",
        url: client.integrations_url("authConfigs"),
    }
}

/// Client certificate sent alongside a new auth config
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientCertificate {
    pub ssl_certificate: String,
    pub encrypted_private_key: String,
    pub passphrase: String,
}

impl ClientCertificate {
    fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("clientCertificate.sslCertificate", self.ssl_certificate.as_str()),
            (
                "clientCertificate.encryptedPrivateKey",
                self.encrypted_private_key.as_str(),
            ),
            ("clientCertificate.passphrase", self.passphrase.as_str()),
        ]
    }
}

/// Reduced view of an auth config
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MinimalAuthConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decrypted_credential: Option<Value>,
}

impl MinimalAuthConfig {
    /// Project a full auth config response onto the minimal fields
    pub fn from_response(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Create an auth config from a JSON document
pub async fn create(
    client: &GcpClient,
    body: &Value,
    certificate: Option<&ClientCertificate>,
) -> Result<Vec<u8>> {
    let collection = collection(client);
    let url = match certificate {
        Some(cert) => with_query(&collection.url, &cert.query_pairs())?,
        None => collection.url,
    };
    client.post(&url, Some(body)).await
}

/// Create an auth config whose JSON body was encrypted with Cloud KMS
pub async fn create_encrypted(
    client: &GcpClient,
    key_name: &str,
    ciphertext: &[u8],
    certificate: Option<&ClientCertificate>,
) -> Result<Vec<u8>> {
    let plaintext = kms::decrypt(client, key_name, ciphertext).await?;
    let body: Value = serde_json::from_slice(&plaintext)?;
    create(client, &body, certificate).await
}

/// Get an auth config by ID, optionally reshaped to [`MinimalAuthConfig`]
pub async fn get(client: &GcpClient, id: &str, minimal: bool) -> Result<Vec<u8>> {
    let response = client.get(&collection(client).item_url(id)).await?;
    if !minimal {
        return Ok(response);
    }

    let reduced = MinimalAuthConfig::from_response(&response)?;
    Ok(serde_json::to_vec(&reduced)?)
}

/// ID of the auth config with this display name
pub async fn find(client: &GcpClient, display_name: &str) -> Result<String> {
    resource::find(client, &collection(client), display_name).await
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

/// Re-create every auth config found in an export directory
///
/// Returns the number of auth configs created.
pub async fn import(client: &GcpClient, dir: &Path) -> Result<usize> {
    let items = resource::read_export_dir(&collection(client), dir)?;
    let count = items.len();

    for mut item in items {
        let source = item
            .get("name")
            .and_then(|v| v.as_str())
            .map(|n| short_id(n).to_string())
            .unwrap_or_default();
        resource::strip_output_only(&mut item);

        create(client, &item, None).await?;
        tracing::info!(
            "Imported authConfig {} ({})",
            item.get("displayName").and_then(|v| v.as_str()).unwrap_or("-"),
            source
        );
    }

    Ok(count)
}
