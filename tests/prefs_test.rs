mod helpers;

use helpers::test_store;
use pocketguard::modes;
use pocketguard::prefs::{CustomItems, NewHistoryEntry};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn uncustomized_modes_use_catalog_defaults() {
    let store = test_store();
    for mode in modes::list_modes() {
        let defaults = modes::default_items(mode);
        assert_eq!(store.effective_items(mode, &defaults), defaults, "{mode}");
    }
}

#[test]
fn override_replaces_defaults_until_removed() {
    let store = test_store();
    let defaults = modes::default_items("Gym Mode");

    let mut custom = CustomItems::new();
    custom.insert("Gym Mode".into(), strings(&["Shoes", "Wallet"]));
    store.set_custom_items(&custom).unwrap();

    // the override wins no matter what defaults are passed
    assert_eq!(store.effective_items("Gym Mode", &defaults), ["Shoes", "Wallet"]);
    assert_eq!(store.effective_items("Gym Mode", &[]), ["Shoes", "Wallet"]);
    // other modes are untouched
    assert_eq!(
        store.effective_items("Trip Mode", &modes::default_items("Trip Mode")),
        modes::default_items("Trip Mode")
    );

    custom.remove("Gym Mode");
    store.set_custom_items(&custom).unwrap();
    assert_eq!(store.effective_items("Gym Mode", &defaults), defaults);
}

#[test]
fn override_is_returned_verbatim() {
    let store = test_store();
    let mut custom = CustomItems::new();
    custom.insert("Daily Essentials".into(), strings(&["Keys", "Keys", "Wallet"]));
    store.set_custom_items(&custom).unwrap();

    let defaults = modes::default_items("Daily Essentials");
    assert_eq!(
        store.effective_items("Daily Essentials", &defaults),
        ["Keys", "Keys", "Wallet"]
    );
}

#[test]
fn set_custom_items_overwrites_whole_mapping() {
    let store = test_store();
    let mut first = CustomItems::new();
    first.insert("Gym Mode".into(), strings(&["Shoes"]));
    first.insert("Trip Mode".into(), strings(&["Passport"]));
    store.set_custom_items(&first).unwrap();

    let mut second = CustomItems::new();
    second.insert("Trip Mode".into(), strings(&["Tickets"]));
    store.set_custom_items(&second).unwrap();

    assert_eq!(store.get_custom_items(), second);
}

#[test]
fn clear_history_empties_everything() {
    let store = test_store();
    for item in ["Wallet", "Keys", "ID"] {
        store
            .append_history(NewHistoryEntry {
                item_name: item.into(),
                mode: "College Mode".into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
            .unwrap();
    }
    assert_eq!(store.get_history().len(), 3);

    store.clear_history().unwrap();
    assert!(store.get_history().is_empty());

    // clearing an empty history is fine
    store.clear_history().unwrap();
    assert!(store.get_history().is_empty());
}

#[test]
fn history_ids_are_unique() {
    let store = test_store();
    let entries: Vec<_> = (0..50)
        .map(|i| NewHistoryEntry {
            item_name: format!("Item {i}"),
            mode: "Trip Mode".into(),
            timestamp: "2026-10-17T09:00:00+00:00".into(),
        })
        .collect();
    store.append_history_batch(entries).unwrap();

    let mut ids: Vec<String> = store.get_history().into_iter().map(|e| e.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}
