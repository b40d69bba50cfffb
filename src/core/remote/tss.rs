//! Thycotic / Delinea Secret Server REST client.
//!
//! `GET {url}/api/v1/secrets/{id}` with a bearer token returns the secret
//! with its `items`; a field is matched by `fieldName` or `slug`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{Connector, SecretServer};
use crate::error::{RemoteError, Result};

const API_PATH: &str = "api/v1/secrets";

/// Builds [`TssSession`]s.
#[derive(Debug, Default)]
pub struct TssConnector;

impl Connector for TssConnector {
    fn connect(&self, url: &str, token: &str) -> Result<Box<dyn SecretServer>> {
        Ok(Box::new(TssSession::new(url, token)?))
    }
}

/// Authenticated session with a Secret Server instance.
pub struct TssSession {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    items: Vec<SecretItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretItem {
    #[serde(default)]
    field_name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    item_value: String,
}

impl TssSession {
    /// Build a client for `url` that sends `token` as a bearer credential.
    ///
    /// No request is made; an invalid token is only detected on first use.
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let base_url = normalize_url(url)?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| RemoteError::Transport(format!("invalid token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            // No deadline on remote calls; failures surface as transport errors.
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build HTTP client: {e}")))?;

        debug!(url = %base_url, "opened secret server session");
        Ok(Self { client, base_url })
    }

    fn secret_url(&self, secret_id: u64) -> String {
        format!("{}/{}/{}", self.base_url, API_PATH, secret_id)
    }
}

impl SecretServer for TssSession {
    fn secret_field(&self, secret_id: u64, field: &str) -> Result<String> {
        let url = self.secret_url(secret_id);
        debug!(secret_id, field = %field, "fetching secret");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body).into());
        }

        let secret: SecretResponse = response
            .json()
            .map_err(|e| RemoteError::Transport(format!("invalid response body: {e}")))?;
        field_value(secret, secret_id, field)
    }
}

/// Validate and strip trailing slashes from the server URL.
fn normalize_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).map_err(|e| RemoteError::InvalidUrl(format!("{trimmed}: {e}")))?;
    Ok(trimmed.to_string())
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.trim().to_string()
    };
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        RemoteError::Forbidden(format!("{}: {}", status.as_u16(), message))
    } else {
        RemoteError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

fn field_value(secret: SecretResponse, secret_id: u64, field: &str) -> Result<String> {
    secret
        .items
        .into_iter()
        .find(|item| item.field_name == field || item.slug == field)
        .map(|item| item.item_value)
        .ok_or_else(|| {
            RemoteError::FieldMissing {
                secret_id,
                field: field.to_string(),
            }
            .into()
        })
}
