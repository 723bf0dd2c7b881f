//! Mode catalog: the built-in modes and the items each one expects.
//!
//! The catalog is static. Users customize a mode's list through [`items`],
//! which stores an override in the preference store; the catalog itself never
//! changes at runtime.

pub mod items;

/// The mode selected when nothing else is configured.
pub const DEFAULT_MODE: &str = "Daily Essentials";

const CATALOG: &[(&str, &[&str])] = &[
    ("Daily Essentials", &["Wallet", "Keys"]),
    ("College Mode", &["Wallet", "ID", "Earbuds"]),
    ("Gym Mode", &["Wallet", "Bottle", "Towel"]),
    ("Trip Mode", &["Wallet", "Charger", "Powerbank"]),
];

/// All mode names, in catalog order.
pub fn list_modes() -> Vec<&'static str> {
    CATALOG.iter().map(|(name, _)| *name).collect()
}

/// Default items for `mode`, in catalog order. Unknown modes have no items.
pub fn default_items(mode: &str) -> Vec<String> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == mode)
        .map(|(_, items)| items.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

pub fn is_known(mode: &str) -> bool {
    CATALOG.iter().any(|(name, _)| *name == mode)
}
