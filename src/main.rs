mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pocketguard::config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pocketguard", version, about = "Never leave without your essentials")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the history service (HTTP)
    Serve,
    /// List the available modes
    Modes,
    /// Show or edit a mode's item list
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },
    /// Scan the items of a mode
    Scan {
        /// Mode to scan (defaults to scan.default_mode)
        #[arg(long)]
        mode: Option<String>,
        /// Dismiss the alert right away instead of waiting for Enter
        #[arg(long)]
        no_wait: bool,
    },
    /// Pair a beacon to an item
    Pair {
        item: String,
        /// Device to pick in the chooser
        #[arg(long)]
        device: Option<String>,
    },
    /// Remove an item's beacon
    Unpair { item: String },
    /// List paired beacons
    Bindings {
        /// Only show bindings whose item is in no mode's list
        #[arg(long)]
        orphaned: bool,
    },
    /// Show or clear missing-item history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
        /// Talk to the configured history service instead of the local store
        #[arg(long, global = true)]
        remote: bool,
    },
    /// Check the preference store
    Doctor,
}

#[derive(Subcommand)]
enum ItemsAction {
    /// Show the active items of a mode
    List { mode: Option<String> },
    /// Add an item to a mode
    Add { mode: String, name: String },
    /// Remove an item from a mode
    Remove { mode: String, name: String },
    /// Restore a mode's default items
    Reset { mode: String },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Delete all history entries
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::GuardConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            pocketguard::server::serve(config).await?;
        }
        Command::Modes => cli::items::modes(),
        Command::Items { action } => match action {
            ItemsAction::List { mode } => cli::items::list(&config, mode.as_deref())?,
            ItemsAction::Add { mode, name } => cli::items::add(&config, &mode, &name)?,
            ItemsAction::Remove { mode, name } => cli::items::remove(&config, &mode, &name)?,
            ItemsAction::Reset { mode } => cli::items::reset(&config, &mode)?,
        },
        Command::Scan { mode, no_wait } => {
            cli::scan::scan(&config, mode.as_deref(), no_wait).await?;
        }
        Command::Pair { item, device } => {
            cli::beacon::pair(&config, &item, device.as_deref()).await?;
        }
        Command::Unpair { item } => cli::beacon::unpair(&config, &item)?,
        Command::Bindings { orphaned } => cli::beacon::bindings(&config, orphaned)?,
        Command::History { action, remote } => match action {
            None => cli::history::list(&config, remote).await?,
            Some(HistoryAction::Clear) => cli::history::clear(&config, remote).await?,
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
