//! CLI `scan` command: scan a mode, show the verdicts, ring until dismissed.

use anyhow::Result;
use pocketguard::app::Guardian;
use pocketguard::beacon::{BeaconPlatform, ConfiguredPlatform};
use pocketguard::config::GuardConfig;
use pocketguard::scan::AlertKind;
use std::sync::Arc;

pub async fn scan(config: &GuardConfig, mode: Option<&str>, no_wait: bool) -> Result<()> {
    let mode = mode.unwrap_or(config.scan.default_mode.as_str());

    let platform = ConfiguredPlatform::from_config(&config.beacon)
        .map(|p| Arc::new(p) as Arc<dyn BeaconPlatform>);
    let mut guardian = Guardian::from_config(config, platform)?;

    if let Some(last) = guardian.store().last_scan() {
        println!("Last scan: {}", last.format("%Y-%m-%d %H:%M"));
    }

    // Failures already carry the retry prompt as their outermost context.
    let outcome = guardian.scan(mode).await?;

    println!("Item Status ({mode})");
    if outcome.report.items.is_empty() {
        println!("  No items configured for this mode");
    }
    for item in &outcome.report.items {
        let (mark, label) = if item.detected {
            ("x", "Detected")
        } else {
            (" ", "Missing")
        };
        println!("  [{mark}] {:<16} {label}", item.name);
    }
    println!();

    let alert = &outcome.alert;
    let badge = match alert.kind {
        AlertKind::Success => "OK",
        AlertKind::Warning => "!!",
    };
    println!("[{badge}] {}  {}", alert.title, alert.message);

    if guardian.reconciler().is_alarm_playing() && !no_wait {
        println!("Press Enter to dismiss the alarm.");
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await??;
    }

    guardian.dismiss();
    Ok(())
}
