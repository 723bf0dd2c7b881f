//! A [`BeaconPlatform`] backed by the `[beacon]` section of the config.
//!
//! The devices listed there are the peripherals the host can see. The chooser
//! "selection" is supplied by the caller (the `--device` flag on the CLI); no
//! selection behaves like a dismissed chooser.

use async_trait::async_trait;

use super::{BeaconPlatform, DeviceHandle, PlatformError};
use crate::config::{BeaconConfig, DeviceConfig};

#[derive(Debug, Clone)]
pub struct ConfiguredPlatform {
    devices: Vec<DeviceConfig>,
    selection: Option<String>,
}

impl ConfiguredPlatform {
    /// `None` when the config disables the capability.
    pub fn from_config(config: &BeaconConfig) -> Option<Self> {
        config.enabled.then(|| Self {
            devices: config.devices.clone(),
            selection: None,
        })
    }

    /// Pre-select the device the chooser will return.
    pub fn with_selection(mut self, device_id: impl Into<String>) -> Self {
        self.selection = Some(device_id.into());
        self
    }

    fn device(&self, device_id: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.id == device_id)
    }
}

#[async_trait]
impl BeaconPlatform for ConfiguredPlatform {
    async fn request_device(&self, services: &[&str]) -> Result<DeviceHandle, PlatformError> {
        tracing::debug!(?services, visible = self.devices.len(), "opening device chooser");

        let selected = self.selection.as_deref().ok_or(PlatformError::NotFound)?;
        let device = self.device(selected).ok_or(PlatformError::NotFound)?;

        Ok(DeviceHandle {
            id: device.id.clone(),
            name: (!device.name.is_empty()).then(|| device.name.clone()),
        })
    }

    async fn probe(&self, device_id: &str) -> Result<bool, PlatformError> {
        let device = self.device(device_id).ok_or(PlatformError::NotFound)?;
        Ok(device.reachable)
    }
}
