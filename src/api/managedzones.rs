//! Managed zones
//!
//! DNS peering zones that let connections reach private hosts. They are
//! global: `projects/P/locations/global/managedZones`.

use crate::error::{Error, Result};
use crate::gcp::client::GcpClient;
use crate::resource::{self, with_query, Collection, PageRequest};
use crate::validate;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn collection(client: &GcpClient) -> Collection {
    Collection {
        kind: "managedZone",
        items_key: "managedZones",
        file_prefix: "managedzones",
        url: client.connectors_global_url("managedZones"),
    }
}

/// Inputs for a new managed zone
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewManagedZone {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// DNS name suffix, e.g. `corp.example.com.`
    pub dns: String,
    pub target_project: String,
    pub target_vpc: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl NewManagedZone {
    pub fn to_body(&self) -> Result<serde_json::Value> {
        if self.dns.is_empty() || self.target_vpc.is_empty() {
            return Err(Error::validation("--dns and --target-vpc are required"));
        }
        validate::project(&self.target_project)?;

        Ok(serde_json::to_value(self)?)
    }
}

/// Parse `key=value` label flags
pub fn parse_labels(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|label| match label.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
            _ => Err(Error::validation(format!(
                "label '{label}' must be key=value"
            ))),
        })
        .collect()
}

pub async fn create(client: &GcpClient, id: &str, zone: &NewManagedZone) -> Result<Vec<u8>> {
    validate::resource_id("managed zone", id)?;
    let body = zone.to_body()?;

    let url = with_query(&collection(client).url, &[("managedZoneId", id)])?;
    client.post(&url, Some(&body)).await
}

pub async fn get(client: &GcpClient, id: &str) -> Result<Vec<u8>> {
    client.get(&collection(client).item_url(id)).await
}

pub async fn list(client: &GcpClient, request: &PageRequest) -> Result<Vec<u8>> {
    resource::fetch_raw(client, &collection(client), request).await
}

pub async fn delete(client: &GcpClient, id: &str) -> Result<Vec<u8>> {
    client.delete(&collection(client).item_url(id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_shape() {
        let zone = NewManagedZone {
            description: "corp \"dns\"".into(),
            dns: "corp.example.com.".into(),
            target_project: "network-host".into(),
            target_vpc: "shared-vpc".into(),
            labels: parse_labels(&["team=integration".into()]).unwrap(),
        };

        assert_eq!(
            zone.to_body().unwrap(),
            json!({
                "description": "corp \"dns\"",
                "dns": "corp.example.com.",
                "targetProject": "network-host",
                "targetVpc": "shared-vpc",
                "labels": {"team": "integration"}
            })
        );
    }

    #[test]
    fn test_body_requires_target() {
        let zone = NewManagedZone {
            dns: "corp.example.com.".into(),
            target_project: "network-host".into(),
            ..NewManagedZone::default()
        };
        assert!(zone.to_body().unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels(&["a=1".into(), "b=".into()]).unwrap();
        assert_eq!(labels.get("a").map(String::as_str), Some("1"));
        assert_eq!(labels.get("b").map(String::as_str), Some(""));
        assert!(parse_labels(&["=x".into()]).is_err());
        assert!(parse_labels(&["novalue".into()]).is_err());
    }
}
