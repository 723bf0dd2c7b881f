//! History Service: scan records kept for the lifetime of the process.
//!
//! [`HistoryStorage`] is the storage seam; [`MemHistoryStorage`] keeps records
//! in a map keyed by a generated id. [`routes`] exposes it over HTTP and
//! [`client`] talks to a running instance.

pub mod client;
pub mod routes;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::scan::ScanReport;

/// One stored scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub mode: String,
    pub missing_items: Vec<String>,
    pub all_items_detected: bool,
    pub timestamp: DateTime<Utc>,
}

/// Body of a create request. The server assigns `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanRecord {
    pub mode: String,
    #[serde(default)]
    pub missing_items: Vec<String>,
    #[serde(default)]
    pub all_items_detected: bool,
}

impl CreateScanRecord {
    /// Reject records a client could not have produced from a real scan.
    pub fn validate(&self) -> Result<(), String> {
        if self.mode.trim().is_empty() {
            return Err("mode must not be empty".into());
        }
        if self.all_items_detected && !self.missing_items.is_empty() {
            return Err("allItemsDetected contradicts missingItems".into());
        }
        Ok(())
    }
}

impl From<&ScanReport> for CreateScanRecord {
    fn from(report: &ScanReport) -> Self {
        Self {
            mode: report.mode.clone(),
            missing_items: report.missing_items.clone(),
            all_items_detected: report.all_detected,
        }
    }
}

#[async_trait]
pub trait HistoryStorage: Send + Sync {
    async fn create(&self, input: CreateScanRecord) -> Result<ScanRecord>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<ScanRecord>>;

    /// Remove every record at once.
    async fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemHistoryStorage {
    records: RwLock<HashMap<String, ScanRecord>>,
}

impl MemHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStorage for MemHistoryStorage {
    async fn create(&self, input: CreateScanRecord) -> Result<ScanRecord> {
        let record = ScanRecord {
            id: uuid::Uuid::now_v7().to_string(),
            mode: input.mode,
            missing_items: input.missing_items,
            all_items_detected: input.all_items_detected,
            timestamp: Utc::now(),
        };
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ScanRecord>> {
        let mut records: Vec<ScanRecord> = self.records.read().await.values().cloned().collect();
        // v7 ids sort by creation time, which breaks timestamp ties
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
