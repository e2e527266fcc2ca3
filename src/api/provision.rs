//! Provisioning Application Integration in a project region

use crate::error::Result;
use crate::gcp::client::GcpClient;
use crate::validate;
use serde::Serialize;

/// Customer-managed encryption key for the provisioned client
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudKmsConfig {
    pub kms_location: String,
    pub kms_ring: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_version: Option<String>,
    pub kms_project_id: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_kms_config: Option<CloudKmsConfig>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub create_sample_workflows: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub provision_gmek: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_service_account: Option<String>,
}

impl ProvisionRequest {
    pub fn to_body(&self) -> Result<serde_json::Value> {
        if let Some(sa) = &self.run_as_service_account {
            validate::service_account(sa)?;
        }
        if let Some(kms) = &self.cloud_kms_config {
            validate::kms_key_name(&format!(
                "projects/{}/locations/{}/keyRings/{}/cryptoKeys/{}",
                kms.kms_project_id, kms.kms_location, kms.kms_ring, kms.key
            ))?;
        }

        Ok(serde_json::to_value(self)?)
    }
}

/// Provision the client for the configured project and region
pub async fn provision(client: &GcpClient, request: &ProvisionRequest) -> Result<Vec<u8>> {
    let body = request.to_body()?;
    client
        .post(&client.integrations_url("clients:provision"), Some(&body))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_request_is_empty_object() {
        assert_eq!(ProvisionRequest::default().to_body().unwrap(), json!({}));
    }

    #[test]
    fn test_full_request_body() {
        let request = ProvisionRequest {
            cloud_kms_config: Some(CloudKmsConfig {
                kms_location: "us-west1".into(),
                kms_ring: "ring".into(),
                key: "key".into(),
                key_version: None,
                kms_project_id: "kms-project".into(),
            }),
            create_sample_workflows: true,
            provision_gmek: false,
            run_as_service_account: Some("runner@my-project.iam.gserviceaccount.com".into()),
        };

        assert_eq!(
            request.to_body().unwrap(),
            json!({
                "cloudKmsConfig": {
                    "kmsLocation": "us-west1",
                    "kmsRing": "ring",
                    "key": "key",
                    "kmsProjectId": "kms-project"
                },
                "createSampleWorkflows": true,
                "runAsServiceAccount": "runner@my-project.iam.gserviceaccount.com"
            })
        );
    }

    #[test]
    fn test_rejects_bad_service_account() {
        let request = ProvisionRequest {
            run_as_service_account: Some("\"}, \"injected\": {\"".into()),
            ..ProvisionRequest::default()
        };
        assert!(request.to_body().unwrap_err().is_validation());
    }
}
