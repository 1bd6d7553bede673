use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

use super::UserDirectory;
use crate::error::{CostError, CostResult};

/// Asks a remote users service `GET <base>/exists/<id>` and expects
/// `{"exists": <bool>}` back.
pub(crate) struct HttpUserDirectory {
    base_url: Option<String>,
    client: Client,
}

impl HttpUserDirectory {
    pub(crate) fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build users service HTTP client")?;
        Ok(Self::with_client(base_url, client))
    }

    pub(crate) fn with_client(base_url: Option<&str>, client: Client) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            client,
        }
    }

    fn exists_url(&self, owner_id: i64) -> CostResult<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            CostError::UpstreamUnavailable("USER_SERVICE_URL is not configured".into())
        })?;
        Ok(format!("{base}/exists/{owner_id}"))
    }
}

impl UserDirectory for HttpUserDirectory {
    fn exists(&self, owner_id: i64) -> CostResult<bool> {
        let url = self.exists_url(owner_id)?;
        tracing::debug!(%url, "checking user with users service");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        let exists = parse_exists_reply(status, &body);
        if let Err(ref e) = exists {
            tracing::warn!(owner_id, error = %e, "users service check failed");
        }
        exists
    }
}

fn transport_error(err: reqwest::Error) -> CostError {
    if err.is_timeout() {
        CostError::UpstreamUnavailable(format!("request timed out: {err}"))
    } else {
        CostError::UpstreamUnavailable(format!("request failed: {err}"))
    }
}

/// Interpret a users service reply. Only a 2xx status with a boolean `exists`
/// field is an answer.
pub(crate) fn parse_exists_reply(status: StatusCode, body: &str) -> CostResult<bool> {
    if !status.is_success() {
        return Err(CostError::UpstreamUnavailable(
            format!("HTTP {}: {}", status.as_u16(), body.trim())
                .trim()
                .to_string(),
        ));
    }
    let value: serde_json::Value = serde_json::from_str(body).map_err(|_| {
        CostError::UpstreamUnavailable(
            "invalid response shape (expected { exists: boolean })".into(),
        )
    })?;
    value
        .get("exists")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| {
            CostError::UpstreamUnavailable(
                "invalid response shape (expected { exists: boolean })".into(),
            )
        })
}
