//! Records persisted by the [`PreferenceStore`](super::PreferenceStore).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-mode item overrides, keyed by mode name.
pub type CustomItems = BTreeMap<String, Vec<String>>;

/// Beacon bindings, keyed by item name.
pub type BeaconBindings = BTreeMap<String, BeaconBinding>;

/// One item found missing during one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// UUID v7, so ids sort by creation time and never collide.
    pub id: String,
    pub item_name: String,
    pub mode: String,
    /// RFC 3339 timestamp shared by every entry written for the same scan.
    pub timestamp: String,
}

/// A history entry before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub item_name: String,
    pub mode: String,
    pub timestamp: String,
}

impl NewHistoryEntry {
    pub(crate) fn with_id(self, id: String) -> HistoryEntry {
        HistoryEntry {
            id,
            item_name: self.item_name,
            mode: self.mode,
            timestamp: self.timestamp,
        }
    }
}

/// A paired beacon standing in for a physical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBinding {
    /// Stable identifier reported by the platform at pairing time.
    pub id: String,
    /// Display name (the item name the beacon was paired for).
    pub name: String,
    /// Handle used to find the authorized device again when probing.
    #[serde(rename = "deviceId", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// State of one persisted key, as reported by `doctor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Absent,
    Ok,
    Corrupt,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Ok => "ok",
            Self::Corrupt => "corrupt",
        }
    }
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
