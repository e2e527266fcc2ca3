//! Input validation
//!
//! Everything here runs before a request is built, so a rejected flag never
//! touches the network.

use crate::error::{Error, Result};
use crate::gcp::auth::validate_project_id;
use regex::Regex;
use std::sync::OnceLock;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn region_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-z]+-[a-z]+[0-9]+$")
}

fn kms_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^projects/[a-z][a-z0-9-]{4,28}[a-z0-9]/locations/[a-z0-9-]+/keyRings/[A-Za-z0-9_-]{1,63}/cryptoKeys/[A-Za-z0-9_-]{1,63}$",
    )
}

fn resource_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-z]([a-z0-9-]{0,61}[a-z0-9])?$")
}

fn service_account_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-z0-9-]+@[a-z0-9.-]+\.gserviceaccount\.com$")
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
}

fn domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^([a-z0-9-]+\.)+[a-z]{2,}$")
}

fn role_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(roles|projects/[^/]+/roles|organizations/[^/]+/roles)/[A-Za-z0-9_.]+$",
    )
}

pub fn project(project: &str) -> Result<()> {
    if validate_project_id(project) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{project}' is not a valid project ID")))
    }
}

pub fn region(region: &str) -> Result<()> {
    if region_re().is_match(region) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{region}' is not a valid region")))
    }
}

/// Full Cloud KMS crypto key resource name
pub fn kms_key_name(name: &str) -> Result<()> {
    if kms_key_re().is_match(name) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "'{name}' must be of the form projects/PROJECT/locations/LOCATION/keyRings/RING/cryptoKeys/KEY"
        )))
    }
}

/// Connection and managed zone IDs: lowercase letters, digits and hyphens,
/// starting with a letter, at most 63 characters
pub fn resource_id(kind: &str, id: &str) -> Result<()> {
    if resource_id_re().is_match(id) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "'{id}' is not a valid {kind} ID: use lowercase letters, digits and hyphens, starting with a letter"
        )))
    }
}

pub fn service_account(email: &str) -> Result<()> {
    if service_account_re().is_match(email) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "'{email}' is not a service account email"
        )))
    }
}

pub fn email(email: &str) -> Result<()> {
    if email_re().is_match(email) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{email}' is not an email address")))
    }
}

pub fn domain(domain: &str) -> Result<()> {
    if domain_re().is_match(domain) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{domain}' is not a domain name")))
    }
}

pub fn role(role: &str) -> Result<()> {
    if role_re().is_match(role) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "'{role}' is not a role name, e.g. roles/connectors.admin"
        )))
    }
}

/// How a command addresses a single resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    DisplayName(String),
}

impl Selector {
    /// Exactly one of `--id` and `--name` must be given
    pub fn from_flags(id: Option<String>, name: Option<String>) -> Result<Self> {
        match (id, name) {
            (Some(_), Some(_)) => Err(Error::validation(
                "--id and --name are mutually exclusive",
            )),
            (None, None) => Err(Error::validation("one of --id or --name is required")),
            (Some(id), None) if id.is_empty() => Err(Error::validation("--id must not be empty")),
            (None, Some(name)) if name.is_empty() => {
                Err(Error::validation("--name must not be empty"))
            }
            (Some(id), None) => Ok(Self::Id(id)),
            (None, Some(name)) => Ok(Self::DisplayName(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kms_key_name() {
        assert!(kms_key_name(
            "projects/my-project/locations/global/keyRings/ring-1/cryptoKeys/key_1"
        )
        .is_ok());
        assert!(kms_key_name("projects/my-project/locations/global/keyRings/ring-1").is_err());
        assert!(kms_key_name("keyRings/ring/cryptoKeys/key").is_err());
    }

    #[test]
    fn test_resource_id() {
        assert!(resource_id("connection", "a").is_ok());
        assert!(resource_id("connection", "sfdc-prod-01").is_ok());
        assert!(resource_id("connection", "1abc").is_err());
        assert!(resource_id("connection", "abc-").is_err());
        assert!(resource_id("connection", "Upper").is_err());
        assert!(resource_id("connection", &"a".repeat(64)).is_err());
        assert!(resource_id("connection", &"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_region() {
        assert!(region("us-central1").is_ok());
        assert!(region("northamerica-northeast1").is_ok());
        assert!(region("us-central1-a").is_err());
        assert!(region("").is_err());
    }

    #[test]
    fn test_members() {
        assert!(service_account("runner@my-project.iam.gserviceaccount.com").is_ok());
        assert!(service_account("someone@example.com").is_err());
        assert!(email("someone@example.com").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(domain("example.com").is_ok());
        assert!(domain("example").is_err());
    }

    #[test]
    fn test_role() {
        assert!(role("roles/connectors.admin").is_ok());
        assert!(role("projects/p/roles/custom_role").is_ok());
        assert!(role("connectors.admin").is_err());
    }

    #[test]
    fn test_selector_requires_exactly_one() {
        assert_eq!(
            Selector::from_flags(Some("123".into()), None).unwrap(),
            Selector::Id("123".into())
        );
        assert_eq!(
            Selector::from_flags(None, Some("prod".into())).unwrap(),
            Selector::DisplayName("prod".into())
        );
        assert!(Selector::from_flags(Some("1".into()), Some("n".into()))
            .unwrap_err()
            .is_validation());
        assert!(Selector::from_flags(None, None).unwrap_err().is_validation());
        assert!(Selector::from_flags(Some(String::new()), None).is_err());
    }
}
