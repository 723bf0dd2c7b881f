//! CLI `modes` and `items` commands.

use anyhow::Result;
use pocketguard::config::GuardConfig;
use pocketguard::modes::{self, items};

pub fn modes() {
    for mode in modes::list_modes() {
        println!("{:<18} {}", mode, modes::default_items(mode).join(", "));
    }
}

pub fn list(config: &GuardConfig, mode: Option<&str>) -> Result<()> {
    let mode = mode.unwrap_or(config.scan.default_mode.as_str());
    let store = super::open_store(config)?;
    let active = items::active_items(&store, mode);
    let customized = store.get_custom_items().contains_key(mode);

    println!(
        "{mode} ({} items, {})",
        active.len(),
        if customized { "custom" } else { "default" }
    );
    if active.is_empty() {
        println!("  No items configured for this mode");
    }
    for item in &active {
        println!("  - {item}");
    }
    Ok(())
}

pub fn add(config: &GuardConfig, mode: &str, name: &str) -> Result<()> {
    let store = super::open_store(config)?;
    items::add_item(&store, mode, name)?;
    println!("\"{}\" has been added to {mode}.", name.trim());
    Ok(())
}

pub fn remove(config: &GuardConfig, mode: &str, name: &str) -> Result<()> {
    let store = super::open_store(config)?;
    items::remove_item(&store, mode, name)?;
    println!("\"{name}\" has been removed from {mode}.");
    Ok(())
}

pub fn reset(config: &GuardConfig, mode: &str) -> Result<()> {
    let store = super::open_store(config)?;
    let defaults = items::reset_mode(&store, mode)?;
    println!("{mode} has been reset to default items: {}", defaults.join(", "));
    Ok(())
}
