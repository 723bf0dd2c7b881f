//! CLI `history` command: list or clear missing-item events.

use anyhow::{Context, Result};
use pocketguard::config::GuardConfig;
use pocketguard::history::client::HistoryClient;

fn remote_client(config: &GuardConfig) -> Result<HistoryClient> {
    config
        .remote_history_url()
        .map(HistoryClient::new)
        .context("no history service configured (set [history] remote_url or POCKETGUARD_HISTORY_URL)")
}

pub async fn list(config: &GuardConfig, remote: bool) -> Result<()> {
    if remote {
        let records = remote_client(config)?
            .list()
            .await
            .context("Failed to fetch history. Please try again.")?;
        if records.is_empty() {
            println!("No scans recorded.");
        }
        for record in records {
            let outcome = if record.all_items_detected {
                "all items detected".to_string()
            } else {
                format!("missing {}", record.missing_items.join(", "))
            };
            println!(
                "{}  {:<18} {outcome}",
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                record.mode
            );
        }
        return Ok(());
    }

    let store = super::open_store(config)?;
    let history = store.get_history();
    if history.is_empty() {
        println!("No missing items recorded.");
    }
    for entry in history {
        println!("{}  {:<16} {}", entry.timestamp, entry.item_name, entry.mode);
    }
    Ok(())
}

pub async fn clear(config: &GuardConfig, remote: bool) -> Result<()> {
    if remote {
        remote_client(config)?
            .clear()
            .await
            .context("Failed to clear history. Please try again.")?;
    } else {
        super::open_store(config)?.clear_history()?;
    }
    println!("History cleared successfully.");
    Ok(())
}
