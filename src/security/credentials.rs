//! Credential handling with memory-safe storage and masking capabilities
//!
//! AWS and Fastly secrets are held in `secrecy::SecretString` so they never
//! show up in `Debug` output or logs; `mask_secret` produces the short form
//! that is safe to print.

use secrecy::{ExposeSecret, SecretString};

/// Environment variables read by the promoter
pub const AWS_REGION_VAR: &str = "AWS_REGION";
pub const AWS_ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const FASTLY_API_KEY_VAR: &str = "FASTLY_API_KEY";
pub const FASTLY_SERVICE_ID_VAR: &str = "FASTLY_SERVICE_ID";

/// Static AWS credentials
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
        }
    }

    /// Access key id in printable form
    pub fn masked_access_key_id(&self) -> String {
        mask_secret(&self.access_key_id)
    }
}

/// Fastly API credentials
#[derive(Debug, Clone)]
pub struct FastlyCredentials {
    pub api_key: SecretString,
    pub service_id: String,
    pub api_url: String,
}

impl FastlyCredentials {
    pub fn new(
        api_key: impl Into<String>,
        service_id: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            service_id: service_id.into(),
            api_url: api_url.into(),
        }
    }
}

/// Masks a secret for safe logging
///
/// Shows only the first 3 and last 3 characters for identification purposes.
/// Secrets shorter than 10 characters are fully masked as "****".
///
/// # Examples
///
/// ```
/// use package_promoter::security::credentials::mask_secret;
///
/// assert_eq!(mask_secret("AKIAABCDEFGH1234"), "AKI...234");
/// assert_eq!(mask_secret("short"), "****");
/// ```
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() < 10 {
        return "****".to_string();
    }

    let prefix: String = secret.chars().take(3).collect();
    let suffix: String = secret
        .chars()
        .rev()
        .take(3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", prefix, suffix)
}

/// Masks every occurrence of the given secrets in a string
///
/// Used on command and HTTP output before it is printed.
pub fn mask_secrets_in_string(text: &str, secrets: &[&SecretString]) -> String {
    let mut masked = text.to_string();

    for secret in secrets {
        let value = secret.expose_secret();
        if value.is_empty() {
            continue;
        }
        masked = masked.replace(value, &mask_secret(value));
    }

    masked
}
