//! HTTP client for a remote History Service.

use anyhow::{Context, Result};

use super::{CreateScanRecord, ScanRecord};

#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HistoryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/scan-history", self.base_url)
    }

    pub async fn create(&self, input: &CreateScanRecord) -> Result<ScanRecord> {
        let response = self
            .http
            .post(self.url())
            .json(input)
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.url()))?
            .error_for_status()
            .context("history service rejected the record")?;
        response.json().await.context("invalid history record")
    }

    pub async fn list(&self) -> Result<Vec<ScanRecord>> {
        let response = self
            .http
            .get(self.url())
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.url()))?
            .error_for_status()
            .context("history service failed to list records")?;
        response.json().await.context("invalid history listing")
    }

    pub async fn clear(&self) -> Result<()> {
        self.http
            .delete(self.url())
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.url()))?
            .error_for_status()
            .context("history service failed to clear records")?;
        Ok(())
    }
}
