//! GCP Authentication
//!
//! Bearer tokens come either from an explicit access token (`--token`) or from
//! Application Default Credentials through `gcp_auth`. Also reads the gcloud
//! CLI configuration for default project and region.

use crate::error::{Error, Result};
use gcp_auth::TokenProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
enum TokenSource {
    /// Access token handed to us by the operator
    Static(String),
    Provider(Arc<dyn TokenProvider>),
}

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    source: TokenSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Create credentials from Application Default Credentials
    pub async fn from_adc() -> Result<Self> {
        let provider = gcp_auth::provider().await.map_err(|e| {
            Error::Auth(format!(
                "{e}. Run 'gcloud auth application-default login' or pass --token"
            ))
        })?;

        Ok(Self {
            source: TokenSource::Provider(provider),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Use a fixed access token, e.g. the output of `gcloud auth print-access-token`
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        let provider = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Provider(provider) => provider,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = provider
            .token(DEFAULT_SCOPES)
            .await
            .map_err(|e| Error::Auth(format!("failed to get access token: {e}")))?;

        let token_str = token.as_str().to_string();

        // gcp_auth exposes an expiry, but a fixed conservative TTL is enough
        // for a single command invocation
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_str)
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read `key` from `[section]` of the active gcloud configuration
fn read_active_config_value(section: &str, key: &str) -> Option<String> {
    let config_dir = get_gcloud_config_dir()?;

    let active_config = std::fs::read_to_string(config_dir.join("active_config")).ok()?;
    let config_name = active_config.trim();

    // Reject anything that could walk out of the configurations directory
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("Invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));
    let content = std::fs::read_to_string(config_path).ok()?;

    parse_ini_value(&content, section, key)
}

/// Find `key = value` inside `[section]` of gcloud's INI-style config
fn parse_ini_value(content: &str, section: &str, key: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            if k.trim() == key {
                return Some(v.trim().to_string());
            }
        }
    }

    None
}

/// Read the default project from the environment
/// Security: Validates project ID format before returning
pub fn env_project() -> Option<String> {
    project_from_vars(|var| std::env::var(var).ok())
}

fn project_from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Some(project) = lookup(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    None
}

/// Read the default project from the active gcloud configuration
pub fn gcloud_project() -> Option<String> {
    read_active_config_value("core", "project").filter(|p| validate_project_id(p))
}

/// Get the default region from the environment
pub fn env_region() -> Option<String> {
    std::env::var("CLOUDSDK_COMPUTE_REGION")
        .ok()
        .filter(|r| !r.is_empty())
}

/// Get the default region from the active gcloud configuration
pub fn gcloud_region() -> Option<String> {
    read_active_config_value("compute", "region")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("my-project-123"));
        assert!(!validate_project_id("short"));
        assert!(!validate_project_id("1starts-with-digit"));
        assert!(!validate_project_id("ends-with-hyphen-"));
        assert!(!validate_project_id("Has-Upper-Case"));
    }

    #[test]
    fn test_parse_ini_value_reads_only_requested_section() {
        let content = "[core]\naccount = me@example.com\nproject = core-project\n\n[compute]\nregion = europe-west1\nzone = europe-west1-b\n";
        assert_eq!(
            parse_ini_value(content, "core", "project").as_deref(),
            Some("core-project")
        );
        assert_eq!(
            parse_ini_value(content, "compute", "region").as_deref(),
            Some("europe-west1")
        );
        assert!(parse_ini_value(content, "compute", "project").is_none());
    }

    #[test]
    fn test_parse_ini_value_skips_comments() {
        let content = "[core]\n# project = commented\nproject = real-project\n";
        assert_eq!(
            parse_ini_value(content, "core", "project").as_deref(),
            Some("real-project")
        );
    }

    #[tokio::test]
    async fn test_static_token_returned_verbatim() {
        let creds = GcpCredentials::from_token("ya29.test");
        assert_eq!(creds.get_token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn test_project_from_vars_checks_in_order_and_skips_invalid() {
        let vars = |var: &str| match var {
            "CLOUDSDK_CORE_PROJECT" => Some("BAD".to_string()),
            "GOOGLE_CLOUD_PROJECT" => Some("google-project".to_string()),
            "GCLOUD_PROJECT" => Some("gcloud-project".to_string()),
            _ => None,
        };
        assert_eq!(project_from_vars(vars), Some("google-project".to_string()));
        assert_eq!(project_from_vars(|_| None), None);
    }
}
