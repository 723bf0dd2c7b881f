#![allow(dead_code)]

use async_trait::async_trait;
use pocketguard::app::Guardian;
use pocketguard::beacon::{BeaconPlatform, BeaconRegistry, DeviceHandle, PlatformError};
use pocketguard::history::client::HistoryClient;
use pocketguard::history::routes::{router, AppState};
use pocketguard::history::{CreateScanRecord, HistoryStorage, MemHistoryStorage, ScanRecord};
use pocketguard::prefs::{BeaconBinding, PreferenceStore};
use pocketguard::scan::{Alarm, Chime, Detector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Open a fresh in-memory store with schema and migrations applied.
pub fn test_store() -> PreferenceStore {
    PreferenceStore::in_memory().unwrap()
}

/// Detector with fixed per-item verdicts. Unlisted items get `default`.
pub struct ScriptedDetector {
    verdicts: HashMap<String, bool>,
    default: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDetector {
    pub fn new(verdicts: &[(&str, bool)], default: bool) -> Self {
        Self {
            verdicts: verdicts
                .iter()
                .map(|(name, v)| (name.to_string(), *v))
                .collect(),
            default,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn all(detected: bool) -> Self {
        Self::new(&[], detected)
    }

    /// Items the detector was asked about, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, item_name: &str) -> bool {
        self.calls.lock().unwrap().push(item_name.to_string());
        self.verdicts.get(item_name).copied().unwrap_or(self.default)
    }
}

/// Platform whose chooser and probes return canned results.
pub struct FakePlatform {
    pub chooser: Result<DeviceHandle, PlatformError>,
    pub probes: HashMap<String, Result<bool, PlatformError>>,
    pub panic_on: Option<String>,
    pub probe_count: AtomicUsize,
}

impl FakePlatform {
    pub fn choosing(device_id: &str) -> Self {
        Self {
            chooser: Ok(DeviceHandle {
                id: device_id.to_string(),
                name: None,
            }),
            probes: HashMap::new(),
            panic_on: None,
            probe_count: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: PlatformError) -> Self {
        Self {
            chooser: Err(err),
            ..Self::choosing("")
        }
    }

    pub fn with_probe(mut self, device_id: &str, result: Result<bool, PlatformError>) -> Self {
        self.probes.insert(device_id.to_string(), result);
        self
    }

    pub fn panicking_on(mut self, device_id: &str) -> Self {
        self.panic_on = Some(device_id.to_string());
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probe_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BeaconPlatform for FakePlatform {
    async fn request_device(&self, _services: &[&str]) -> Result<DeviceHandle, PlatformError> {
        self.chooser.clone()
    }

    async fn probe(&self, device_id: &str) -> Result<bool, PlatformError> {
        self.probe_count.fetch_add(1, Ordering::SeqCst);
        if self.panic_on.as_deref() == Some(device_id) {
            panic!("probe exploded for {device_id}");
        }
        self.probes
            .get(device_id)
            .cloned()
            .unwrap_or(Err(PlatformError::NotFound))
    }
}

pub fn registry_with(platform: Arc<FakePlatform>) -> BeaconRegistry {
    BeaconRegistry::new(Some(platform as Arc<dyn BeaconPlatform>))
}

/// A binding as pairing would have written it.
pub fn binding(item: &str, device_id: &str) -> BeaconBinding {
    BeaconBinding {
        id: device_id.to_string(),
        name: item.to_string(),
        device_id: Some(device_id.to_string()),
    }
}

/// Store `bindings` directly, bypassing the chooser.
pub fn bind(store: &PreferenceStore, bindings: &[(&str, &str)]) {
    let mut stored = store.get_beacon_bindings();
    for (item, device) in bindings {
        stored.insert(item.to_string(), binding(item, device));
    }
    store.set_beacon_bindings(&stored).unwrap();
}

/// Counts how often the alarm has rung.
#[derive(Default)]
pub struct CountingChime(AtomicUsize);

impl CountingChime {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Chime for CountingChime {
    fn ring(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Alarm that rings once and then waits far longer than any test runs.
pub fn slow_alarm(chime: Arc<CountingChime>) -> Arc<Alarm> {
    Arc::new(Alarm::new(chime, Duration::from_secs(3600)))
}

pub fn guardian(
    store: PreferenceStore,
    detector: Arc<dyn Detector>,
    registry: BeaconRegistry,
    remote: Option<HistoryClient>,
) -> Guardian {
    Guardian::new(
        store,
        registry,
        detector,
        slow_alarm(Arc::new(CountingChime::default())),
        remote,
    )
}

/// History storage whose every operation fails, as a broken backend would.
pub struct FailingHistoryStorage;

#[async_trait]
impl HistoryStorage for FailingHistoryStorage {
    async fn create(&self, _input: CreateScanRecord) -> anyhow::Result<ScanRecord> {
        anyhow::bail!("disk full")
    }

    async fn list(&self) -> anyhow::Result<Vec<ScanRecord>> {
        anyhow::bail!("disk full")
    }

    async fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

/// Serve the history router over `storage` on an ephemeral port and return
/// its base URL.
pub async fn spawn_history_service(
    storage: Arc<dyn HistoryStorage>,
    detector: impl Detector + 'static,
) -> String {
    let state = AppState {
        storage,
        detector: Arc::new(detector),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// A working in-memory history service.
pub async fn spawn_mem_history_service() -> String {
    spawn_history_service(
        Arc::new(MemHistoryStorage::new()),
        ScriptedDetector::all(true),
    )
    .await
}
