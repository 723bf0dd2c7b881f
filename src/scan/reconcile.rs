//! Turns scan results into alerts, history, and the alarm.
//!
//! ```text
//! Idle ──begin_scan──▶ Scanning ──complete──▶ Success | Warning ──dismiss──▶ Idle
//!                          └──────fail──────▶ Idle
//! ```
//!
//! History for a warning is written before the state flips, so a failed write
//! leaves the reconciler idle with no alert and no alarm.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::alarm::Alarm;
use super::ScanReport;
use crate::prefs::{NewHistoryEntry, PreferenceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Warning,
}

/// What the user is shown after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub missing_items: Vec<String>,
}

impl Alert {
    fn success() -> Self {
        Self {
            kind: AlertKind::Success,
            title: "All Items Ready!".into(),
            message: "All your essentials are detected".into(),
            missing_items: Vec::new(),
        }
    }

    fn warning(missing_items: Vec<String>) -> Self {
        Self {
            kind: AlertKind::Warning,
            title: "Items Missing!".into(),
            message: format!("{} missing!", missing_items.join(", ")),
            missing_items,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("a scan is already in progress")]
    ScanInFlight,
    #[error("no scan is in progress")]
    NotScanning,
    #[error("failed to record missing items: {0}")]
    History(#[source] anyhow::Error),
}

pub struct Reconciler {
    phase: Phase,
    alert: Option<Alert>,
    alarm: Arc<Alarm>,
}

impl Reconciler {
    pub fn new(alarm: Arc<Alarm>) -> Self {
        Self {
            phase: Phase::Idle,
            alert: None,
            alarm,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn is_alarm_playing(&self) -> bool {
        self.alarm.is_playing()
    }

    /// Enter `Scanning`. A new scan silences any alarm still ringing from the
    /// previous one; a scan already in flight is rejected.
    pub fn begin_scan(&mut self) -> Result<(), ReconcileError> {
        if self.phase == Phase::Scanning {
            return Err(ReconcileError::ScanInFlight);
        }
        self.alarm.stop();
        self.alert = None;
        self.phase = Phase::Scanning;
        Ok(())
    }

    /// Apply a finished scan. Missing items get one history entry each, all
    /// sharing one timestamp, and the alarm starts.
    pub fn complete(
        &mut self,
        store: &PreferenceStore,
        report: &ScanReport,
    ) -> Result<&Alert, ReconcileError> {
        if let Err(e) = self.record(store, report) {
            self.fail();
            return Err(e);
        }
        Ok(self.present(report))
    }

    /// Write a finished scan to the store without leaving `Scanning`: one
    /// history entry per missing item and the last scan time. Callers that
    /// wrap this in a transaction follow up with [`Reconciler::present`]
    /// once it commits, or [`Reconciler::fail`] if it does not.
    pub fn record(
        &self,
        store: &PreferenceStore,
        report: &ScanReport,
    ) -> Result<(), ReconcileError> {
        if self.phase != Phase::Scanning {
            return Err(ReconcileError::NotScanning);
        }

        let now = Utc::now();
        if !report.all_detected {
            let timestamp = now.to_rfc3339();
            let entries = report
                .missing_items
                .iter()
                .map(|item| NewHistoryEntry {
                    item_name: item.clone(),
                    mode: report.mode.clone(),
                    timestamp: timestamp.clone(),
                })
                .collect();
            store
                .append_history_batch(entries)
                .map_err(ReconcileError::History)?;
        }

        if let Err(e) = store.set_last_scan(now) {
            tracing::warn!(error = %e, "failed to record last scan time");
        }
        Ok(())
    }

    /// Leave `Scanning` for `Success` or `Warning` and raise the alert. The
    /// alarm starts on a warning.
    pub fn present(&mut self, report: &ScanReport) -> &Alert {
        let (phase, alert) = if report.all_detected {
            (Phase::Success, Alert::success())
        } else {
            (Phase::Warning, Alert::warning(report.missing_items.clone()))
        };

        if phase == Phase::Warning {
            self.alarm.start();
        }
        tracing::info!(
            mode = %report.mode,
            missing = report.missing_items.len(),
            outcome = ?phase,
            "scan reconciled"
        );

        self.phase = phase;
        self.alert.insert(alert)
    }

    /// The scan itself failed. Nothing is written and no alert is raised.
    pub fn fail(&mut self) {
        if self.phase == Phase::Scanning {
            tracing::warn!("scan failed, returning to idle");
            self.phase = Phase::Idle;
        }
    }

    /// Close the alert and silence the alarm. A no-op when idle.
    pub fn dismiss(&mut self) {
        self.alarm.stop();
        if matches!(self.phase, Phase::Success | Phase::Warning) {
            self.phase = Phase::Idle;
            self.alert = None;
        }
    }
}
