//! CouchDB-backed stream registry

use super::traits::StreamRegistry;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use streamwatch_types::StreamRecord;

/// Document field holding the stream URL
const URL_FIELD: &str = "hlsUrl";

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    id: Option<String>,
    #[serde(default)]
    doc: Option<Value>,
}

/// Stream registry reading a CouchDB database through `_all_docs`
pub struct CouchRegistry {
    client: Client,
    all_docs_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl CouchRegistry {
    /// Create a registry client from configuration
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let base = Url::parse(&config.url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        // Credentials embedded in the URL win over the configured ones
        let username = match base.username() {
            "" => config.username.clone(),
            user => Some(user.to_string()),
        };
        let password = base
            .password()
            .map(str::to_string)
            .or_else(|| config.password.clone());

        let mut all_docs_url = base;
        if all_docs_url.set_username("").is_err() || all_docs_url.set_password(None).is_err() {
            return Err(RegistryError::InvalidUrl(config.url.clone()));
        }
        all_docs_url
            .path_segments_mut()
            .map_err(|_| RegistryError::InvalidUrl(config.url.clone()))?
            .pop_if_empty()
            .push(&config.database)
            .push("_all_docs");
        all_docs_url
            .query_pairs_mut()
            .append_pair("include_docs", "true");

        Ok(Self {
            client,
            all_docs_url,
            username,
            password,
        })
    }
}

#[async_trait]
impl StreamRegistry for CouchRegistry {
    async fn list_streams(&self) -> Result<Vec<StreamRecord>, RegistryError> {
        let mut request = self.client.get(self.all_docs_url.clone());
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body: AllDocsResponse = response.json().await?;
        let total = body.rows.len();
        let streams: Vec<StreamRecord> = body.rows.into_iter().filter_map(stream_from_row).collect();

        tracing::debug!(
            rows = total,
            streams = streams.len(),
            "Listed registry streams"
        );

        Ok(streams)
    }
}

fn stream_from_row(row: AllDocsRow) -> Option<StreamRecord> {
    let doc = match row.doc {
        Some(Value::Object(doc)) => doc,
        _ => {
            tracing::debug!(id = ?row.id, "Skipping registry row without document");
            return None;
        }
    };

    let url = match doc.get(URL_FIELD).and_then(Value::as_str) {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => {
            tracing::debug!(id = ?row.id, "Skipping registry document without stream URL");
            return None;
        }
    };

    let id = doc
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(row.id)
        .unwrap_or_default();

    Some(StreamRecord { id, url })
}
