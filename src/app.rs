//! Application root.
//!
//! [`Guardian`] owns one instance of every service (store, beacon registry,
//! scan engine, alarm, reconciler) and runs the scan-reconcile cycle. Nothing
//! here is global; tests build a `Guardian` with their own detector, platform,
//! and chime.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::beacon::{BeaconPlatform, BeaconRegistry, PairError};
use crate::config::GuardConfig;
use crate::history::client::HistoryClient;
use crate::history::CreateScanRecord;
use crate::prefs::{BeaconBinding, PreferenceStore};
use crate::scan::{
    Alarm, Alert, Detector, RandomDetector, Reconciler, ScanEngine, ScanReport, TerminalBell,
};

/// Shown for any transient scan or history failure.
pub const SCAN_FAILED_MESSAGE: &str = "Unable to scan items. Please try again.";

/// A reconciled scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub alert: Alert,
}

pub struct Guardian {
    store: PreferenceStore,
    registry: BeaconRegistry,
    engine: ScanEngine,
    reconciler: Reconciler,
    remote: Option<HistoryClient>,
}

impl Guardian {
    pub fn new(
        store: PreferenceStore,
        registry: BeaconRegistry,
        detector: Arc<dyn Detector>,
        alarm: Arc<Alarm>,
        remote: Option<HistoryClient>,
    ) -> Self {
        Self {
            engine: ScanEngine::new(detector, registry.clone()),
            reconciler: Reconciler::new(alarm),
            store,
            registry,
            remote,
        }
    }

    /// Wire everything from config: on-disk store, random detector, terminal
    /// bell, and the remote history mirror if one is configured.
    pub fn from_config(
        config: &GuardConfig,
        platform: Option<Arc<dyn BeaconPlatform>>,
    ) -> Result<Self> {
        let store = PreferenceStore::open(config.resolved_db_path())?;
        let alarm = Alarm::new(
            Arc::new(TerminalBell),
            Duration::from_millis(config.alarm.interval_ms.max(1)),
        );

        Ok(Self::new(
            store,
            BeaconRegistry::new(platform),
            Arc::new(RandomDetector::new(config.detection_probability())),
            Arc::new(alarm),
            config.remote_history_url().map(HistoryClient::new),
        ))
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn registry(&self) -> &BeaconRegistry {
        &self.registry
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run one scan of `mode` through the reconciler. Any failure while
    /// recording the result abandons the cycle: nothing is kept locally, no
    /// alert is raised, and the error carries [`SCAN_FAILED_MESSAGE`].
    pub async fn scan(&mut self, mode: &str) -> Result<ScanOutcome> {
        self.reconciler.begin_scan()?;

        let report = self.engine.scan(&self.store, mode).await;

        if let Err(e) = self.record(&report).await {
            self.reconciler.fail();
            return Err(e.context(SCAN_FAILED_MESSAGE));
        }

        let alert = self.reconciler.present(&report).clone();
        Ok(ScanOutcome { report, alert })
    }

    /// Write the scan locally and mirror it to the remote history service as
    /// one unit. The local writes commit only after the remote record exists;
    /// dropping `tx` on an early return rolls them back.
    async fn record(&self, report: &ScanReport) -> Result<()> {
        let tx = self
            .store
            .connection()
            .unchecked_transaction()
            .context("failed to start scan transaction")?;

        self.reconciler.record(&self.store, report)?;

        if let Some(remote) = &self.remote {
            remote.create(&CreateScanRecord::from(report)).await?;
        }

        tx.commit().context("failed to commit scan")?;
        Ok(())
    }

    pub fn dismiss(&mut self) {
        self.reconciler.dismiss();
    }

    pub async fn pair(&self, item_name: &str) -> Result<BeaconBinding, PairError> {
        self.registry.pair(&self.store, item_name).await
    }

    pub fn unpair(&self, item_name: &str) -> Result<()> {
        self.registry.unpair(&self.store, item_name)
    }
}
