mod helpers;

use helpers::{binding, registry_with, test_store, FakePlatform};
use pocketguard::beacon::{BeaconRegistry, PairError, PlatformError};
use pocketguard::prefs::BeaconBindings;
use std::sync::Arc;

#[tokio::test]
async fn pair_stores_binding_keyed_by_item() {
    let store = test_store();
    let registry = registry_with(Arc::new(FakePlatform::choosing("AA:BB:CC")));

    let bound = registry.pair(&store, "Keys").await.unwrap();
    assert_eq!(bound, binding("Keys", "AA:BB:CC"));

    let stored = store.get_beacon_bindings();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored["Keys"], bound);
}

#[tokio::test]
async fn repairing_replaces_previous_binding() {
    let store = test_store();
    registry_with(Arc::new(FakePlatform::choosing("first")))
        .pair(&store, "Wallet")
        .await
        .unwrap();
    registry_with(Arc::new(FakePlatform::choosing("second")))
        .pair(&store, "Wallet")
        .await
        .unwrap();

    let stored = store.get_beacon_bindings();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored["Wallet"].device_id.as_deref(), Some("second"));
}

#[tokio::test]
async fn unpair_removes_only_that_item() {
    let store = test_store();
    let registry = registry_with(Arc::new(FakePlatform::choosing("dev")));
    registry.pair(&store, "Wallet").await.unwrap();
    registry.pair(&store, "Keys").await.unwrap();

    registry.unpair(&store, "Wallet").unwrap();
    let stored = store.get_beacon_bindings();
    assert!(!stored.contains_key("Wallet"));
    assert!(stored.contains_key("Keys"));

    // unbound names are fine
    registry.unpair(&store, "Umbrella").unwrap();
    assert_eq!(store.get_beacon_bindings().len(), 1);
}

#[tokio::test]
async fn pairing_failures_leave_store_untouched() {
    let store = test_store();

    let err = BeaconRegistry::unsupported()
        .pair(&store, "Keys")
        .await
        .unwrap_err();
    assert!(matches!(err, PairError::NotSupported));

    let cases = [
        (PlatformError::NotFound, "no device"),
        (PlatformError::NotAllowed, "denied"),
        (PlatformError::Other("adapter off".into()), "unknown"),
    ];
    for (platform_err, label) in cases {
        let registry = registry_with(Arc::new(FakePlatform::failing(platform_err)));
        let err = registry.pair(&store, "Keys").await.unwrap_err();
        match label {
            "no device" => assert!(matches!(err, PairError::NoDeviceSelected)),
            "denied" => assert!(matches!(err, PairError::PermissionDenied)),
            _ => assert!(matches!(err, PairError::Unknown(ref msg) if msg.contains("adapter off"))),
        }
        assert!(!err.hint().is_empty());
    }

    assert!(store.get_beacon_bindings().is_empty());
}

#[tokio::test]
async fn empty_selection_counts_as_no_device() {
    let store = test_store();
    let registry = registry_with(Arc::new(FakePlatform::choosing("")));

    let err = registry.pair(&store, "Keys").await.unwrap_err();
    assert!(matches!(err, PairError::NoDeviceSelected));
    assert!(store.get_beacon_bindings().is_empty());
}

#[tokio::test]
async fn presence_never_invents_unbound_items() {
    let platform = Arc::new(FakePlatform::choosing("unused").with_probe("b1", Ok(true)));
    let registry = registry_with(platform);

    let mut bindings = BeaconBindings::new();
    bindings.insert("Keys".into(), binding("Keys", "b1"));

    let presence = registry.check_presence(&bindings).await;
    assert_eq!(presence.len(), 1);
    assert_eq!(presence.get("Keys"), Some(&true));
    assert!(!presence.contains_key("Wallet"));
}

#[tokio::test]
async fn one_failing_probe_does_not_affect_others() {
    let platform = Arc::new(
        FakePlatform::choosing("unused")
            .with_probe("ok", Ok(true))
            .with_probe("broken", Err(PlatformError::Other("gatt timeout".into())))
            .with_probe("boom", Ok(true))
            .panicking_on("boom"),
    );
    let registry = registry_with(platform.clone());

    let mut bindings = BeaconBindings::new();
    bindings.insert("Wallet".into(), binding("Wallet", "ok"));
    bindings.insert("Keys".into(), binding("Keys", "broken"));
    bindings.insert("Towel".into(), binding("Towel", "boom"));

    let presence = registry.check_presence(&bindings).await;

    assert_eq!(presence.len(), 3);
    assert_eq!(presence["Wallet"], true);
    assert_eq!(presence["Keys"], false);
    assert_eq!(presence["Towel"], false);
    assert_eq!(platform.probe_count(), 3);
}

#[tokio::test]
async fn binding_without_device_id_reads_absent() {
    let platform = Arc::new(FakePlatform::choosing("unused"));
    let registry = registry_with(platform.clone());

    let mut bindings = BeaconBindings::new();
    let mut stale = binding("ID", "x");
    stale.device_id = None;
    bindings.insert("ID".into(), stale);

    let presence = registry.check_presence(&bindings).await;
    assert_eq!(presence.get("ID"), Some(&false));
    assert_eq!(platform.probe_count(), 0);
}

#[tokio::test]
async fn unsupported_presence_check_is_empty() {
    let mut bindings = BeaconBindings::new();
    bindings.insert("Keys".into(), binding("Keys", "b1"));

    let presence = BeaconRegistry::unsupported().check_presence(&bindings).await;
    assert!(presence.is_empty());
}

#[test]
fn orphans_are_bindings_without_an_active_item() {
    let mut bindings = BeaconBindings::new();
    bindings.insert("Keys".into(), binding("Keys", "b1"));
    bindings.insert("Skateboard".into(), binding("Skateboard", "b2"));

    let active = vec!["Wallet".to_string(), "Keys".to_string()];
    assert_eq!(BeaconRegistry::orphaned(&bindings, &active), ["Skateboard"]);
}
