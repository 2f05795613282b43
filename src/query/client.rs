//! HTTP client for the sales API (minimal adapter).
//!
//! Used for the startup health probe and for exercising the service
//! directly; the sales analyst agent reaches the same API through the
//! hosted service's OpenAPI tool.

use anyhow::Context;
use serde_json::json;

use super::QueryResponse;

#[derive(Clone)]
pub struct SalesApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl SalesApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `/health`; returns an error if the service is unreachable or
    /// reports anything but healthy.
    pub async fn health(&self) -> anyhow::Result<()> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to call sales API /health")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("sales API /health failed: {} - {}", status, text);
        }
        Ok(())
    }

    pub async fn query(&self, query: &str) -> anyhow::Result<QueryResponse> {
        let resp = self
            .client
            .post(format!("{}/query-sales-data", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .context("Failed to call sales API /query-sales-data")?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("sales API query failed: {} - {}", status, text);
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse sales API response: {}", text))
    }

    pub async fn database_info(&self) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .client
            .get(format!("{}/database-info", self.base_url))
            .send()
            .await
            .context("Failed to call sales API /database-info")?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("sales API /database-info failed: {} - {}", status, text);
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse sales API response: {}", text))
    }
}
