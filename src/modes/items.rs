//! Editing a mode's active item list.
//!
//! The first edit copies the effective list (the catalog defaults) into an
//! override; from then on the override replaces the defaults entirely until
//! [`reset_mode`] deletes it.

use anyhow::Result;
use thiserror::Error;

use crate::prefs::PreferenceStore;

#[derive(Debug, Error)]
pub enum ItemListError {
    #[error("item name must not be empty")]
    EmptyName,
    #[error("\"{item}\" already exists in {mode}")]
    Duplicate { mode: String, item: String },
    #[error("\"{item}\" is not in {mode}")]
    UnknownItem { mode: String, item: String },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The list a scan of `mode` would check: the stored override, else the catalog.
pub fn active_items(store: &PreferenceStore, mode: &str) -> Vec<String> {
    store.effective_items(mode, &super::default_items(mode))
}

/// Append `name` (trimmed) to the mode's list. Names are compared
/// case-sensitively; an existing name is rejected and the list left as is.
pub fn add_item(
    store: &PreferenceStore,
    mode: &str,
    name: &str,
) -> Result<Vec<String>, ItemListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ItemListError::EmptyName);
    }

    let mut items = active_items(store, mode);
    if items.iter().any(|existing| existing == name) {
        return Err(ItemListError::Duplicate {
            mode: mode.to_string(),
            item: name.to_string(),
        });
    }

    items.push(name.to_string());
    save_override(store, mode, &items)?;
    tracing::info!(mode = %mode, item = %name, "item added");
    Ok(items)
}

/// Remove `name` (trimmed) from the mode's list. Removing the last item
/// leaves an empty override, not the defaults.
pub fn remove_item(
    store: &PreferenceStore,
    mode: &str,
    name: &str,
) -> Result<Vec<String>, ItemListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ItemListError::EmptyName);
    }

    let mut items = active_items(store, mode);
    let before = items.len();
    items.retain(|existing| existing != name);
    if items.len() == before {
        return Err(ItemListError::UnknownItem {
            mode: mode.to_string(),
            item: name.to_string(),
        });
    }

    save_override(store, mode, &items)?;
    tracing::info!(mode = %mode, item = %name, "item removed");
    Ok(items)
}

/// Drop the override so the catalog defaults apply again.
pub fn reset_mode(store: &PreferenceStore, mode: &str) -> Result<Vec<String>> {
    let mut custom = store.get_custom_items();
    if custom.remove(mode).is_some() {
        store.set_custom_items(&custom)?;
        tracing::info!(mode = %mode, "mode reset to defaults");
    }
    Ok(super::default_items(mode))
}

/// Item names across every mode's active list, used to spot orphaned bindings.
pub fn all_active_items(store: &PreferenceStore) -> Vec<String> {
    let custom = store.get_custom_items();
    let mut names: Vec<String> = super::list_modes()
        .into_iter()
        .map(|m| m.to_string())
        .chain(custom.keys().cloned())
        .flat_map(|mode| store.effective_items(&mode, &super::default_items(&mode)))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn save_override(store: &PreferenceStore, mode: &str, items: &[String]) -> Result<()> {
    let mut custom = store.get_custom_items();
    custom.insert(mode.to_string(), items.to_vec());
    store.set_custom_items(&custom)
}
