//! HTTP client for the panel data endpoints.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::core::record::Record;

/// Why a refresh produced no data.  Rendered verbatim in the table body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
}

/// Shapes the panel endpoints answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PanelResponse {
    Rows(Vec<Record>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        data: Option<Vec<Record>>,
        #[serde(default)]
        records: Option<Vec<Record>>,
        #[serde(default)]
        error: Option<String>,
    },
}

/// Decode a panel response body into its records.
pub fn decode_records(body: &[u8]) -> Result<Vec<Record>, FetchError> {
    match serde_json::from_slice::<PanelResponse>(body)? {
        PanelResponse::Rows(rows) => Ok(rows),
        PanelResponse::Envelope { success: Some(false), error, .. } => Err(FetchError::Api(
            error.unwrap_or_else(|| "unknown error".to_string()),
        )),
        PanelResponse::Envelope { data: Some(rows), .. }
        | PanelResponse::Envelope { records: Some(rows), .. } => Ok(rows),
        PanelResponse::Envelope { error, .. } => Err(FetchError::Api(
            error.unwrap_or_else(|| "response carried no records".to_string()),
        )),
    }
}

/// `{origin}/api/paneis/{panel}/{resource}`.
pub fn panel_url(origin: &str, panel: &str, resource: &str) -> String {
    format!(
        "{}/api/paneis/{}/{}",
        origin.trim_end_matches('/'),
        panel,
        resource.trim_start_matches('/')
    )
}

/// Fetches one panel's dataset.  Cheap to clone into spawned tasks.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    url: String,
}

impl PanelClient {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        let body = response.bytes().await?;
        decode_records(&body)
    }
}
