//! Configuration Management
//!
//! Two layers: [`Preferences`] persisted on disk between runs, and
//! [`Settings`], the resolved per-invocation configuration passed explicitly
//! into every API operation.

use crate::error::{Error, Result};
use crate::gcp::auth;
use crate::validate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INTEGRATIONS_ENDPOINT: &str = "https://integrations.googleapis.com/v1";
pub const DEFAULT_CONNECTORS_ENDPOINT: &str = "https://connectors.googleapis.com/v1";
pub const DEFAULT_KMS_ENDPOINT: &str = "https://cloudkms.googleapis.com/v1";
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com/v1";

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Preferences {
    /// Default project
    #[serde(default)]
    pub project: Option<String>,
    /// Default region
    #[serde(default)]
    pub region: Option<String>,
}

impl Preferences {
    /// Get the preferences file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("integrationcli").join("config.json"))
    }

    /// Load preferences from the default location, or defaults if absent
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load preferences from `path`; unreadable files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed preferences {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save preferences to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::default_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;

        Ok(())
    }

    /// Set project and region, validating both before anything is written
    pub fn update(&mut self, project: Option<&str>, region: Option<&str>) -> Result<()> {
        if let Some(project) = project {
            validate::project(project)?;
            self.project = Some(project.to_string());
        }
        if let Some(region) = region {
            validate::region(region)?;
            self.region = Some(region.to_string());
        }
        Ok(())
    }
}

/// API base URLs
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub integrations: String,
    pub connectors: String,
    pub kms: String,
    pub resource_manager: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            integrations: DEFAULT_INTEGRATIONS_ENDPOINT.to_string(),
            connectors: DEFAULT_CONNECTORS_ENDPOINT.to_string(),
            kms: DEFAULT_KMS_ENDPOINT.to_string(),
            resource_manager: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every API at one host (emulators, proxies, tests)
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            integrations: format!("{}/v1", base),
            connectors: format!("{}/v1", base),
            kms: format!("{}/v1", base),
            resource_manager: format!("{}/v1", base),
        }
    }
}

/// Project and region exported in the environment
#[derive(Debug, Clone, Default)]
pub struct EnvDefaults {
    pub project: Option<String>,
    pub region: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self {
            project: auth::env_project(),
            region: auth::env_region(),
        }
    }
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub project: String,
    pub region: String,
    pub endpoints: Endpoints,
    /// Print API responses to stdout
    pub print_output: bool,
}

impl Settings {
    pub fn new(project: &str, region: &str) -> Result<Self> {
        validate::project(project)?;
        validate::region(region)?;

        Ok(Self {
            project: project.to_string(),
            region: region.to_string(),
            endpoints: Endpoints::default(),
            print_output: true,
        })
    }

    /// Resolve project and region (flag > environment > preferences > gcloud)
    pub fn resolve(
        project: Option<&str>,
        region: Option<&str>,
        prefs: &Preferences,
    ) -> Result<Self> {
        Self::resolve_with(project, region, &EnvDefaults::from_env(), prefs)
    }

    pub fn resolve_with(
        project: Option<&str>,
        region: Option<&str>,
        env: &EnvDefaults,
        prefs: &Preferences,
    ) -> Result<Self> {
        let project = project
            .map(str::to_string)
            .or_else(|| env.project.clone())
            .or_else(|| prefs.project.clone())
            .or_else(auth::gcloud_project)
            .ok_or_else(|| {
                Error::validation("no project configured. Use --proj or 'prefs set --proj'")
            })?;

        let region = region
            .map(str::to_string)
            .or_else(|| env.region.clone())
            .or_else(|| prefs.region.clone())
            .or_else(auth::gcloud_region)
            .ok_or_else(|| {
                Error::validation("no region configured. Use --reg or 'prefs set --reg'")
            })?;

        Self::new(&project, &region)
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_print_output(mut self, print_output: bool) -> Self {
        self.print_output = print_output;
        self
    }
}
