//! GCP API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens (ADC or explicit) and gcloud defaults
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`kms`] - Cloud KMS decryption of encrypted request bodies
//!
//! # Example
//!
//! ```ignore
//! use integrationcli::config::Settings;
//! use integrationcli::gcp::{auth::GcpCredentials, client::GcpClient};
//!
//! async fn example() -> integrationcli::Result<()> {
//!     let settings = Settings::new("my-project", "us-central1")?;
//!     let client = GcpClient::new(GcpCredentials::from_adc().await?, settings)?;
//!     let page = client.get(&client.integrations_url("authConfigs")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod kms;
