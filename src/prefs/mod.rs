//! Local preference store.
//!
//! Durable key/value state for one client: per-mode item overrides, beacon
//! bindings, the missing-item history, and the last scan time. Every key holds
//! one JSON document and is recovered independently: a value that fails to
//! parse is logged and read back as empty, never surfaced as an error.

pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub use types::{
    BeaconBinding, BeaconBindings, CustomItems, HistoryEntry, KeyStatus, NewHistoryEntry,
};

pub const CUSTOM_ITEMS_KEY: &str = "pocketguard_custom_items";
pub const BEACON_BINDINGS_KEY: &str = "pocketguard_ble_devices";
pub const HISTORY_KEY: &str = "pocketguard_history";
pub const LAST_SCAN_KEY: &str = "lastScanTime";

pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the on-disk store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(crate::db::open_database(path)?))
    }

    /// A throwaway store that lives as long as the value.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(crate::db::open_memory_database()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // --- custom item lists ---

    pub fn get_custom_items(&self) -> CustomItems {
        self.read_or_default(CUSTOM_ITEMS_KEY)
    }

    /// Replace the whole override mapping. Last write wins.
    pub fn set_custom_items(&self, items: &CustomItems) -> Result<()> {
        self.write(CUSTOM_ITEMS_KEY, items)
    }

    /// The override for `mode` if one is stored, otherwise `defaults` verbatim.
    pub fn effective_items(&self, mode: &str, defaults: &[String]) -> Vec<String> {
        self.get_custom_items()
            .remove(mode)
            .unwrap_or_else(|| defaults.to_vec())
    }

    // --- history ---

    /// Stored history, newest first.
    pub fn get_history(&self) -> Vec<HistoryEntry> {
        self.read_or_default(HISTORY_KEY)
    }

    pub fn append_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let mut stored = self.append_history_batch(vec![entry])?;
        stored.pop().context("history batch returned no entries")
    }

    /// Assign ids to `entries` and prepend them in one write, so either every
    /// entry of a scan lands or none does. The batch keeps its given order at
    /// the head of the history.
    pub fn append_history_batch(&self, entries: Vec<NewHistoryEntry>) -> Result<Vec<HistoryEntry>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<HistoryEntry> = entries
            .into_iter()
            .map(|e| e.with_id(uuid::Uuid::now_v7().to_string()))
            .collect();

        let mut history = stored.clone();
        history.extend(self.get_history());
        self.write(HISTORY_KEY, &history)?;

        tracing::debug!(added = stored.len(), total = history.len(), "history appended");
        Ok(stored)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.remove(HISTORY_KEY)
    }

    // --- beacon bindings ---

    pub fn get_beacon_bindings(&self) -> BeaconBindings {
        self.read_or_default(BEACON_BINDINGS_KEY)
    }

    pub fn set_beacon_bindings(&self, bindings: &BeaconBindings) -> Result<()> {
        self.write(BEACON_BINDINGS_KEY, bindings)
    }

    // --- last scan ---

    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        let raw: Option<String> = self.read_or_default(LAST_SCAN_KEY);
        let raw = raw?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(key = LAST_SCAN_KEY, error = %e, "ignoring unparseable last scan time");
                None
            }
        }
    }

    pub fn set_last_scan(&self, at: DateTime<Utc>) -> Result<()> {
        self.write(LAST_SCAN_KEY, &at.to_rfc3339())
    }

    // --- diagnostics ---

    /// Parse state of every persisted key, in a stable order.
    pub fn inspect_keys(&self) -> Vec<(&'static str, KeyStatus)> {
        vec![
            (CUSTOM_ITEMS_KEY, self.key_status::<CustomItems>(CUSTOM_ITEMS_KEY)),
            (BEACON_BINDINGS_KEY, self.key_status::<BeaconBindings>(BEACON_BINDINGS_KEY)),
            (HISTORY_KEY, self.key_status::<Vec<HistoryEntry>>(HISTORY_KEY)),
            (LAST_SCAN_KEY, self.key_status::<String>(LAST_SCAN_KEY)),
        ]
    }

    fn key_status<T: DeserializeOwned>(&self, key: &str) -> KeyStatus {
        match self.read_raw(key) {
            Ok(None) => KeyStatus::Absent,
            Ok(Some(raw)) if serde_json::from_str::<T>(&raw).is_ok() => KeyStatus::Ok,
            _ => KeyStatus::Corrupt,
        }
    }

    // --- raw access ---

    /// Store a raw value under `key` without validation.
    pub fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write preference {key}"))?;
        Ok(())
    }

    fn read_raw(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.read_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference, using empty value");
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "corrupt preference, using empty value");
            T::default()
        })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.write_raw(key, &json)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove preference {key}"))?;
        Ok(())
    }
}
