pub mod beacon;
pub mod doctor;
pub mod history;
pub mod items;
pub mod scan;

use anyhow::Result;
use pocketguard::config::GuardConfig;
use pocketguard::prefs::PreferenceStore;

/// Open the configured preference store.
pub fn open_store(config: &GuardConfig) -> Result<PreferenceStore> {
    PreferenceStore::open(config.resolved_db_path())
}
