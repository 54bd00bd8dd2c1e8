//! PostgREST-style table endpoint
//!
//! A batch is one `POST {base_url}/rest/v1/{table}` whose body is the JSON
//! array of records. Hosted Postgres services (Supabase and friends) accept
//! this shape and insert the array atomically.

use std::time::Duration;

use async_trait::async_trait;

use super::{RecordStore, StoreError, StoredRecord};

const USER_AGENT: &str = concat!("agenda-import/", env!("CARGO_PKG_VERSION"));

/// HTTP record store
#[derive(Debug, Clone)]
pub struct RestStore {
    http_client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: Option<String>,
}

impl RestStore {
    pub fn new(
        base_url: impl Into<String>,
        table: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            table: table.into(),
            api_key,
        })
    }

    /// Insert endpoint for the configured table
    pub fn endpoint(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert_batch(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        let url = self.endpoint();
        log::debug!("POST {} ({} records)", url, records.len());

        let mut request = self
            .http_client
            .post(&url)
            .header("Prefer", "return=minimal")
            .json(records);

        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: extract_message(&message),
            });
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}

/// Pull the human-readable part out of a PostgREST error body
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
