//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication,
//! HTTP functionality and the per-invocation [`Settings`].

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use crate::config::Settings;
use crate::error::Result;
use reqwest::Method;
use serde_json::Value;

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub settings: Settings,
}

impl GcpClient {
    pub fn new(credentials: GcpCredentials, settings: Settings) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            settings,
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Send one request and return the raw body
    pub async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Vec<u8>> {
        let token = self.get_token().await?;
        self.http.execute(method, url, &token, body).await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.send(Method::GET, url, None).await
    }

    /// Make a POST request to a GCP API
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Vec<u8>> {
        self.send(Method::POST, url, body).await
    }

    /// Make a PATCH request to a GCP API
    pub async fn patch(&self, url: &str, body: &Value) -> Result<Vec<u8>> {
        self.send(Method::PATCH, url, Some(body)).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str) -> Result<Vec<u8>> {
        self.send(Method::DELETE, url, None).await
    }

    // =========================================================================
    // Application Integration API helpers
    // =========================================================================

    /// Build regional Application Integration API URL
    pub fn integrations_url(&self, resource: &str) -> String {
        format!(
            "{}/projects/{}/locations/{}/{}",
            self.settings.endpoints.integrations, self.settings.project, self.settings.region, resource
        )
    }

    // =========================================================================
    // Integration Connectors API helpers
    // =========================================================================

    /// Build regional Connectors API URL
    pub fn connectors_url(&self, resource: &str) -> String {
        format!(
            "{}/projects/{}/locations/{}/{}",
            self.settings.endpoints.connectors, self.settings.project, self.settings.region, resource
        )
    }

    /// Build global Connectors API URL (managed zones live here)
    pub fn connectors_global_url(&self, resource: &str) -> String {
        format!(
            "{}/projects/{}/locations/global/{}",
            self.settings.endpoints.connectors, self.settings.project, resource
        )
    }

    // =========================================================================
    // Cloud KMS / Resource Manager API helpers
    // =========================================================================

    /// Build Cloud KMS URL for a full resource name
    pub fn kms_url(&self, resource_name: &str) -> String {
        format!("{}/{}", self.settings.endpoints.kms, resource_name)
    }

    /// Build Resource Manager URL for the current project
    pub fn resourcemanager_project_url(&self) -> String {
        format!(
            "{}/projects/{}",
            self.settings.endpoints.resource_manager, self.settings.project
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;

    fn client() -> GcpClient {
        let settings = Settings::new("my-project", "us-west1").unwrap();
        GcpClient::new(GcpCredentials::from_token("t"), settings).unwrap()
    }

    #[test]
    fn test_integrations_url() {
        assert_eq!(
            client().integrations_url("authConfigs"),
            "https://integrations.googleapis.com/v1/projects/my-project/locations/us-west1/authConfigs"
        );
    }

    #[test]
    fn test_connectors_urls() {
        let client = client();
        assert_eq!(
            client.connectors_url("connections"),
            "https://connectors.googleapis.com/v1/projects/my-project/locations/us-west1/connections"
        );
        assert_eq!(
            client.connectors_global_url("managedZones"),
            "https://connectors.googleapis.com/v1/projects/my-project/locations/global/managedZones"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let mut client = client();
        client.settings = client.settings.clone().with_endpoints(Endpoints::all("http://localhost:9000"));
        assert_eq!(
            client.resourcemanager_project_url(),
            "http://localhost:9000/v1/projects/my-project"
        );
    }
}
