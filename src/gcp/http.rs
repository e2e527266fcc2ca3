//! HTTP utilities for GCP REST API calls

use crate::error::{Error, Result};
use reqwest::{Client, Method};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for GCP API calls
///
/// Returns raw response bytes so callers can either parse them or persist
/// them untouched (export writes pages byte-for-byte).
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("integrationcli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Send one authenticated request and return the body bytes
    ///
    /// No retries: a transport failure or non-success status is returned as is.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Http { status, body });
        }

        Ok(bytes.to_vec())
    }
}

/// Hint shown under an error for the common failure statuses
pub fn error_hint(error: &anyhow::Error) -> Option<&'static str> {
    let status = error.downcast_ref::<Error>()?.status()?;

    match status.as_u16() {
        401 => Some("Authentication failed. Run 'gcloud auth application-default login' or pass --token."),
        403 => Some("Permission denied. Check your GCP IAM permissions."),
        404 => Some("Resource not found. Check --proj, --reg and the resource name."),
        409 => Some("Resource conflict. The resource may already exist."),
        429 => Some("Rate limit exceeded. Re-run the command later."),
        500..=599 => Some("GCP service temporarily unavailable. Re-run the command."),
        _ => None,
    }
}

/// Extract the `error.message` field of a Google API error body, if present
pub fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_error_hint_by_status() {
        let err = anyhow::Error::new(Error::Http {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        });
        assert!(error_hint(&err).unwrap().contains("--token"));

        let err = anyhow::Error::new(Error::validation("bad"));
        assert!(error_hint(&err).is_none());
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":404,"message":"authConfig not found"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("authConfig not found"));
        assert!(api_error_message("not json").is_none());
    }
}
