//! IAM policies
//!
//! Read-modify-write of role bindings on connections and on the project.

use crate::error::Result;
use crate::gcp::client::GcpClient;
use crate::resource::with_query;
use crate::validate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Policy schema version that carries conditional bindings
pub const POLICY_VERSION: i32 = 3;

/// Kind of principal in a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MemberType {
    User,
    Group,
    ServiceAccount,
    Domain,
}

impl MemberType {
    fn prefix(self) -> &'static str {
        match self {
            MemberType::User => "user",
            MemberType::Group => "group",
            MemberType::ServiceAccount => "serviceAccount",
            MemberType::Domain => "domain",
        }
    }
}

/// Validated binding member string, e.g. `serviceAccount:sa@p.iam.gserviceaccount.com`
pub fn member(member_type: MemberType, identity: &str) -> Result<String> {
    match member_type {
        MemberType::User | MemberType::Group => validate::email(identity)?,
        MemberType::ServiceAccount => validate::service_account(identity)?,
        MemberType::Domain => validate::domain(identity)?,
    }
    Ok(format!("{}:{}", member_type.prefix(), identity))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

/// IAM policy; fields we do not touch (`auditConfigs`, ...) pass through
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Policy {
    /// Add `member` to the unconditional binding for `role`
    ///
    /// Returns false when the member already holds the role.
    pub fn add_member(&mut self, role: &str, member: &str) -> bool {
        let existing = self
            .bindings
            .iter_mut()
            .find(|b| b.role == role && b.condition.is_none());

        match existing {
            Some(binding) if binding.members.iter().any(|m| m == member) => false,
            Some(binding) => {
                binding.members.push(member.to_string());
                true
            }
            None => {
                self.bindings.push(Binding {
                    role: role.to_string(),
                    members: vec![member.to_string()],
                    condition: None,
                });
                true
            }
        }
    }
}

/// A resource that carries an IAM policy
#[derive(Debug, Clone, PartialEq)]
pub struct IamTarget {
    /// Resource URL; the `:getIamPolicy` style verbs are appended to it
    pub url: String,
    /// Connectors reads policies with GET, Resource Manager with POST
    pub read_method: Method,
}

impl IamTarget {
    pub fn project(client: &GcpClient) -> Self {
        Self {
            url: client.resourcemanager_project_url(),
            read_method: Method::POST,
        }
    }

    pub fn connection(client: &GcpClient, id: &str) -> Self {
        Self {
            url: super::connections::collection(client).item_url(id),
            read_method: Method::GET,
        }
    }
}

/// Read the policy, asking for version 3 so conditional bindings survive a rewrite
pub async fn get_policy(client: &GcpClient, target: &IamTarget) -> Result<Vec<u8>> {
    let url = format!("{}:getIamPolicy", target.url);
    if target.read_method == Method::POST {
        let body = json!({ "options": { "requestedPolicyVersion": POLICY_VERSION } });
        return client.post(&url, Some(&body)).await;
    }

    let version = POLICY_VERSION.to_string();
    let url = with_query(&url, &[("options.requestedPolicyVersion", version)])?;
    client.send(target.read_method.clone(), &url, None).await
}

pub async fn set_policy(client: &GcpClient, target: &IamTarget, policy: &Policy) -> Result<Vec<u8>> {
    let url = format!("{}:setIamPolicy", target.url);
    let body = json!({ "policy": policy });
    client.post(&url, Some(&body)).await
}

/// Grant `role` to `member`, leaving the policy alone if already granted
pub async fn add_binding(
    client: &GcpClient,
    target: &IamTarget,
    role: &str,
    member: &str,
) -> Result<Vec<u8>> {
    validate::role(role)?;

    let current = get_policy(client, target).await?;
    let mut policy: Policy = serde_json::from_slice(&current)?;

    if !policy.add_member(role, member) {
        tracing::info!("{} already has {} on {}", member, role, target.url);
        return Ok(current);
    }

    policy.version = Some(POLICY_VERSION);
    tracing::info!("Granting {} to {}", role, member);
    set_policy(client, target, &policy).await
}

/// Which of `permissions` the caller holds on the target
pub async fn test_permissions(
    client: &GcpClient,
    target: &IamTarget,
    permissions: &[String],
) -> Result<Vec<u8>> {
    let url = format!("{}:testIamPermissions", target.url);
    let body = json!({ "permissions": permissions });
    client.post(&url, Some(&body)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_prefixes_and_validates() {
        assert_eq!(
            member(MemberType::ServiceAccount, "sa@my-project.iam.gserviceaccount.com").unwrap(),
            "serviceAccount:sa@my-project.iam.gserviceaccount.com"
        );
        assert_eq!(
            member(MemberType::Domain, "example.com").unwrap(),
            "domain:example.com"
        );
        assert!(member(MemberType::ServiceAccount, "me@example.com")
            .unwrap_err()
            .is_validation());
        assert!(member(MemberType::User, "nobody").is_err());
    }

    #[test]
    fn test_add_member_to_existing_binding() {
        let mut policy = Policy {
            bindings: vec![Binding {
                role: "roles/connectors.viewer".into(),
                members: vec!["user:a@example.com".into()],
                condition: None,
            }],
            ..Policy::default()
        };

        assert!(policy.add_member("roles/connectors.viewer", "user:b@example.com"));
        assert_eq!(policy.bindings.len(), 1);
        assert_eq!(policy.bindings[0].members.len(), 2);

        assert!(!policy.add_member("roles/connectors.viewer", "user:b@example.com"));
    }

    #[test]
    fn test_add_member_skips_conditional_bindings() {
        let mut policy = Policy {
            bindings: vec![Binding {
                role: "roles/connectors.admin".into(),
                members: vec!["user:a@example.com".into()],
                condition: Some(serde_json::json!({"expression": "true"})),
            }],
            ..Policy::default()
        };

        assert!(policy.add_member("roles/connectors.admin", "user:a@example.com"));
        assert_eq!(policy.bindings.len(), 2);
        assert!(policy.bindings[1].condition.is_none());
    }

    #[test]
    fn test_policy_preserves_unknown_fields() {
        let raw = r#"{"version":1,"etag":"BwX=","bindings":[],"auditConfigs":[{"service":"allServices"}]}"#;
        let policy: Policy = serde_json::from_str(raw).unwrap();
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["auditConfigs"][0]["service"], "allServices");
        assert_eq!(value["etag"], "BwX=");
    }
}
