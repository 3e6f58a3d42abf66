//! Fastly purge-all client

use crate::core::error::PromoteError;
use crate::security::credentials::{FastlyCredentials, mask_secrets_in_string};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

/// Public Fastly API endpoint
pub const DEFAULT_FASTLY_API_URL: &str = "https://api.fastly.com";

#[derive(Debug, Deserialize)]
struct PurgeResponse {
    status: String,
}

/// Purges every cached object of one Fastly service
pub struct FastlyPurger {
    client: reqwest::Client,
    credentials: FastlyCredentials,
}

impl FastlyPurger {
    pub fn new(credentials: &FastlyCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: credentials.clone(),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.credentials.service_id
    }

    fn purge_url(&self) -> String {
        format!(
            "{}/service/{}/purge_all",
            self.credentials.api_url.trim_end_matches('/'),
            self.credentials.service_id
        )
    }

    /// `POST /service/{id}/purge_all`
    ///
    /// Any non-2xx status is a `CdnPurge` error carrying the response body.
    pub async fn purge_all(&self) -> Result<(), PromoteError> {
        let url = self.purge_url();
        debug!(%url, "purging CDN cache");

        let response = self
            .client
            .post(&url)
            .header("Fastly-Key", self.credentials.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PromoteError::CdnPurge(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PromoteError::CdnPurge(e.to_string()))?;

        if !status.is_success() {
            let body = mask_secrets_in_string(&body, &[&self.credentials.api_key]);
            return Err(PromoteError::CdnPurge(format!("HTTP {}: {}", status, body)));
        }

        if let Ok(parsed) = serde_json::from_str::<PurgeResponse>(&body) {
            debug!(status = %parsed.status, "purge accepted");
        }

        Ok(())
    }
}
