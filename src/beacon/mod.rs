//! Beacon registry: pairing short-range beacons to items and probing them.
//!
//! The host's pairing capability is optional. [`BeaconRegistry`] holds it as
//! `Option<Arc<dyn BeaconPlatform>>`, and every operation treats `None` as an
//! ordinary branch: pairing reports [`PairError::NotSupported`] and presence
//! checks return an empty mapping.

pub mod configured;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::prefs::{BeaconBinding, BeaconBindings, PreferenceStore};

pub use configured::ConfiguredPlatform;

/// Raw failures reported by a platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// No device was chosen, or the device is not known to the platform.
    #[error("device not found")]
    NotFound,
    /// The user or OS refused access.
    #[error("access not allowed")]
    NotAllowed,
    #[error("{0}")]
    Other(String),
}

/// Generic discovery categories requested when pairing. No service filter.
pub const DISCOVERY_SERVICES: &[&str] = &["generic_access", "generic_attribute"];

/// A device the user picked in the platform's chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub id: String,
    pub name: Option<String>,
}

/// Host capability for choosing and probing peripherals.
#[async_trait]
pub trait BeaconPlatform: Send + Sync {
    /// Prompt for a nearby device. Any device is acceptable; `services` names
    /// the discovery categories the caller wants access to.
    async fn request_device(&self, services: &[&str]) -> Result<DeviceHandle, PlatformError>;

    /// Connect to a previously authorized device, then disconnect.
    /// `Ok(true)` means the device answered.
    async fn probe(&self, device_id: &str) -> Result<bool, PlatformError>;
}

#[derive(Debug, Error)]
pub enum PairError {
    #[error("beacon pairing is not supported on this platform")]
    NotSupported,
    #[error("no beacon was selected for pairing")]
    NoDeviceSelected,
    #[error("beacon access was denied")]
    PermissionDenied,
    #[error("pairing failed: {0}")]
    Unknown(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PairError {
    /// What the user should do about it.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::NotSupported => {
                "Beacon pairing is unavailable here. Enable [beacon] in the config or switch to a supported platform."
            }
            Self::NoDeviceSelected => {
                "No device was selected. Make sure Bluetooth is on and the beacon is nearby, then try again."
            }
            Self::PermissionDenied => {
                "Bluetooth access was denied. Allow Bluetooth permissions and try again."
            }
            Self::Unknown(_) | Self::Storage(_) => "Failed to register the beacon. Please try again.",
        }
    }
}

impl From<PlatformError> for PairError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound => Self::NoDeviceSelected,
            PlatformError::NotAllowed => Self::PermissionDenied,
            PlatformError::Other(msg) => Self::Unknown(msg),
        }
    }
}

/// Pairs beacons to items and checks which of them are in range.
#[derive(Clone, Default)]
pub struct BeaconRegistry {
    platform: Option<Arc<dyn BeaconPlatform>>,
}

impl BeaconRegistry {
    pub fn new(platform: Option<Arc<dyn BeaconPlatform>>) -> Self {
        Self { platform }
    }

    /// A registry on a host without the pairing capability.
    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_some()
    }

    /// Pair a beacon to `item_name`, replacing any earlier binding for it.
    pub async fn pair(
        &self,
        store: &PreferenceStore,
        item_name: &str,
    ) -> Result<BeaconBinding, PairError> {
        let platform = self.platform.as_ref().ok_or(PairError::NotSupported)?;

        let device = platform.request_device(DISCOVERY_SERVICES).await.map_err(|e| {
            tracing::warn!(item = %item_name, error = %e, "beacon pairing failed");
            PairError::from(e)
        })?;
        if device.id.is_empty() {
            return Err(PairError::NoDeviceSelected);
        }

        let binding = BeaconBinding {
            id: device.id.clone(),
            name: item_name.to_string(),
            device_id: Some(device.id),
        };

        let mut bindings = store.get_beacon_bindings();
        if let Some(previous) = bindings.insert(item_name.to_string(), binding.clone()) {
            tracing::debug!(item = %item_name, previous = %previous.id, "replacing beacon binding");
        }
        store.set_beacon_bindings(&bindings)?;

        tracing::info!(item = %item_name, device = %binding.id, "beacon paired");
        Ok(binding)
    }

    /// Remove the binding for `item_name`. Unbound names are not an error.
    pub fn unpair(&self, store: &PreferenceStore, item_name: &str) -> anyhow::Result<()> {
        let mut bindings = store.get_beacon_bindings();
        if bindings.remove(item_name).is_some() {
            store.set_beacon_bindings(&bindings)?;
            tracing::info!(item = %item_name, "beacon unpaired");
        }
        Ok(())
    }

    /// Probe every bound device. Each bound item maps to whether its beacon
    /// answered; a failed probe only affects its own item. Without the
    /// capability the mapping is empty, meaning "not beacon-bound".
    pub async fn check_presence(&self, bindings: &BeaconBindings) -> HashMap<String, bool> {
        let Some(platform) = self.platform.as_ref() else {
            tracing::warn!("beacon capability unavailable, skipping presence check");
            return HashMap::new();
        };

        let mut results: HashMap<String, bool> =
            bindings.keys().map(|item| (item.clone(), false)).collect();

        let mut probes = JoinSet::new();
        for (item, binding) in bindings {
            let Some(device_id) = binding.device_id.clone() else {
                continue;
            };
            let platform = Arc::clone(platform);
            let item = item.clone();
            probes.spawn(async move {
                let outcome = platform.probe(&device_id).await;
                (item, device_id, outcome)
            });
        }

        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((item, _, Ok(present))) => {
                    results.insert(item, present);
                }
                Ok((item, device_id, Err(e))) => {
                    tracing::warn!(item = %item, device = %device_id, error = %e, "beacon probe failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "beacon probe task aborted");
                }
            }
        }

        tracing::debug!(bound = bindings.len(), "presence check finished");
        results
    }

    /// Bound item names that no longer appear in any active item list.
    pub fn orphaned(bindings: &BeaconBindings, active_items: &[String]) -> Vec<String> {
        bindings
            .keys()
            .filter(|item| !active_items.contains(item))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_errors_map_to_pair_errors() {
        assert!(matches!(
            PairError::from(PlatformError::NotFound),
            PairError::NoDeviceSelected
        ));
        assert!(matches!(
            PairError::from(PlatformError::NotAllowed),
            PairError::PermissionDenied
        ));
        match PairError::from(PlatformError::Other("adapter off".into())) {
            PairError::Unknown(msg) => assert_eq!(msg, "adapter off"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hints_are_distinct_for_user_actionable_errors() {
        let hints = [
            PairError::NotSupported.hint(),
            PairError::NoDeviceSelected.hint(),
            PairError::PermissionDenied.hint(),
        ];
        assert_ne!(hints[0], hints[1]);
        assert_ne!(hints[1], hints[2]);
        assert_ne!(hints[0], hints[2]);
    }

    #[test]
    fn orphaned_lists_bindings_outside_active_items() {
        let mut bindings = BeaconBindings::new();
        for item in ["Keys", "Umbrella"] {
            bindings.insert(
                item.into(),
                BeaconBinding {
                    id: format!("{item}-tag"),
                    name: item.into(),
                    device_id: None,
                },
            );
        }
        let active = vec!["Wallet".to_string(), "Keys".to_string()];
        assert_eq!(BeaconRegistry::orphaned(&bindings, &active), ["Umbrella"]);
    }

    #[tokio::test]
    async fn unsupported_registry_returns_empty_presence() {
        let registry = BeaconRegistry::unsupported();
        let mut bindings = BeaconBindings::new();
        bindings.insert(
            "Keys".into(),
            BeaconBinding {
                id: "k".into(),
                name: "Keys".into(),
                device_id: Some("k".into()),
            },
        );
        assert!(!registry.is_supported());
        assert!(registry.check_presence(&bindings).await.is_empty());
    }
}
