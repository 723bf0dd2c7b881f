//! CLI `doctor` command: check the preference store and print a health report.

use anyhow::{Context, Result};
use pocketguard::config::GuardConfig;
use pocketguard::db;
use pocketguard::prefs::{KeyStatus, PreferenceStore};

/// Run store diagnostics and print a health report.
pub fn doctor(config: &GuardConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Store: not found at {}", db_path.display());
        println!("Run any `pocketguard` command that saves state to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let store = PreferenceStore::open(&db_path).context("failed to open store (may be corrupt)")?;
    let report =
        db::check_database_health(store.connection()).context("failed to run health check")?;

    println!("Pocket Guardian Health Report");
    println!("=============================");
    println!();
    println!("Store:             {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Stored keys:       {}", report.key_count);
    println!();
    println!("Keys:");
    let mut corrupt = 0;
    for (key, status) in store.inspect_keys() {
        if status == KeyStatus::Corrupt {
            corrupt += 1;
        }
        println!("  {key:<26} {status}");
    }
    println!();
    println!(
        "Beacon pairing:    {}",
        if config.beacon.enabled { "enabled" } else { "unavailable" }
    );
    println!(
        "History service:   {}",
        config.remote_history_url().unwrap_or("(local only)")
    );
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }

    if corrupt > 0 {
        println!();
        println!("{corrupt} key(s) could not be parsed and are read as empty.");
        println!("They are replaced the next time that state is saved.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
