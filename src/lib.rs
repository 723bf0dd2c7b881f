//! Pocket Guardian: never leave without your essentials.
//!
//! The user picks a mode (Daily Essentials, Gym Mode, ...), scans, and is told
//! which of the mode's items are present and which are missing. Missing items
//! are logged to a history and trigger a looping alarm until dismissed.
//!
//! | Mode | Default items |
//! |------|---------------|
//! | **Daily Essentials** | Wallet, Keys |
//! | **College Mode** | Wallet, ID, Earbuds |
//! | **Gym Mode** | Wallet, Bottle, Towel |
//! | **Trip Mode** | Wallet, Charger, Powerbank |
//!
//! # Architecture
//!
//! - **Storage**: a single-file SQLite key/value store holding JSON documents
//! - **Detection**: paired beacons are probed for presence; anything else falls
//!   back to a simulated detector
//! - **History Service**: an axum HTTP service keeping scan records in memory
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`prefs`]: The local preference store
//! - [`modes`]: Mode catalog and per-mode item lists
//! - [`beacon`]: Beacon pairing and presence probing
//! - [`scan`]: Scan engine, alarm, and scan result reconciliation
//! - [`history`]: History Service storage, routes, and client
//! - [`app`]: The application root that owns all of the above

pub mod app;
pub mod beacon;
pub mod config;
pub mod db;
pub mod history;
pub mod modes;
pub mod prefs;
pub mod scan;
pub mod server;
