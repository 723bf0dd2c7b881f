//! CLI `pair`, `unpair`, and `bindings` commands.

use anyhow::{bail, Result};
use pocketguard::beacon::{BeaconPlatform, BeaconRegistry, ConfiguredPlatform};
use pocketguard::config::GuardConfig;
use pocketguard::modes::items;
use std::sync::Arc;

pub async fn pair(config: &GuardConfig, item: &str, device: Option<&str>) -> Result<()> {
    let item = item.trim();
    if item.is_empty() {
        bail!("item name must not be empty");
    }

    let platform = ConfiguredPlatform::from_config(&config.beacon).map(|p| match device {
        Some(id) => p.with_selection(id),
        None => p,
    });
    let registry = BeaconRegistry::new(platform.map(|p| Arc::new(p) as Arc<dyn BeaconPlatform>));
    let store = super::open_store(config)?;

    match registry.pair(&store, item).await {
        Ok(binding) => {
            println!("{item} has been paired with beacon {}.", binding.id);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.hint());
            Err(e.into())
        }
    }
}

pub fn unpair(config: &GuardConfig, item: &str) -> Result<()> {
    let store = super::open_store(config)?;
    BeaconRegistry::unsupported().unpair(&store, item)?;
    println!("{item} no longer has a beacon.");
    Ok(())
}

pub fn bindings(config: &GuardConfig, orphaned_only: bool) -> Result<()> {
    let store = super::open_store(config)?;
    let bindings = store.get_beacon_bindings();
    let orphaned = BeaconRegistry::orphaned(&bindings, &items::all_active_items(&store));

    if bindings.is_empty() {
        println!("No beacons paired.");
        return Ok(());
    }

    for (item, binding) in &bindings {
        let is_orphan = orphaned.contains(item);
        if orphaned_only && !is_orphan {
            continue;
        }
        println!(
            "{:<16} {}{}",
            item,
            binding.id,
            if is_orphan { "  (not in any mode)" } else { "" }
        );
    }

    if !orphaned.is_empty() && !orphaned_only {
        println!();
        println!(
            "{} binding(s) belong to items no mode uses. Remove with `pocketguard unpair <item>`.",
            orphaned.len()
        );
    }
    Ok(())
}
