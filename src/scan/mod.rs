//! Scan engine: one detected/missing verdict per active item.
//!
//! Beacon-bound items take their verdict from a presence probe. Everything
//! else falls back to a [`Detector`], by default [`RandomDetector`], which
//! stands in for sensing hardware the app does not have.

pub mod alarm;
pub mod reconcile;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::beacon::BeaconRegistry;
use crate::modes;
use crate::prefs::{BeaconBindings, PreferenceStore};

pub use alarm::{Alarm, Chime, TerminalBell};
pub use reconcile::{Alert, AlertKind, Phase, ReconcileError, Reconciler};

/// Verdict for one item in one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
    pub name: String,
    pub detected: bool,
}

/// Outcome of one scan, in the mode's item order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub mode: String,
    pub items: Vec<ItemStatus>,
    pub all_detected: bool,
    pub missing_items: Vec<String>,
}

impl ScanReport {
    pub fn new(mode: impl Into<String>, items: Vec<ItemStatus>) -> Self {
        let missing_items: Vec<String> = items
            .iter()
            .filter(|item| !item.detected)
            .map(|item| item.name.clone())
            .collect();
        Self {
            mode: mode.into(),
            all_detected: missing_items.is_empty(),
            items,
            missing_items,
        }
    }
}

/// Fallback verdict for items without a beacon.
pub trait Detector: Send + Sync {
    fn detect(&self, item_name: &str) -> bool;
}

/// Share of simulated detections that come up present.
pub const DEFAULT_DETECTION_PROBABILITY: f64 = 0.7;

/// Clamp `probability` into `[0, 1]`. NaN and infinities fall back to
/// [`DEFAULT_DETECTION_PROBABILITY`].
pub fn sanitize_probability(probability: f64) -> f64 {
    if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        tracing::warn!(
            value = probability,
            fallback = DEFAULT_DETECTION_PROBABILITY,
            "detection probability is not a number, using default"
        );
        DEFAULT_DETECTION_PROBABILITY
    }
}

/// Independent biased coin flip per item. Not seeded.
#[derive(Debug, Clone, Copy)]
pub struct RandomDetector {
    probability: f64,
}

impl RandomDetector {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: sanitize_probability(probability),
        }
    }
}

impl Default for RandomDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTION_PROBABILITY)
    }
}

impl Detector for RandomDetector {
    fn detect(&self, _item_name: &str) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

pub struct ScanEngine {
    detector: Arc<dyn Detector>,
    registry: BeaconRegistry,
}

impl ScanEngine {
    pub fn new(detector: Arc<dyn Detector>, registry: BeaconRegistry) -> Self {
        Self { detector, registry }
    }

    /// Scan every item active in `mode`. Never fails: without beacons or a
    /// platform the verdicts come from the detector.
    pub async fn scan(&self, store: &PreferenceStore, mode: &str) -> ScanReport {
        let items = modes::items::active_items(store, mode);

        let bound: BeaconBindings = store
            .get_beacon_bindings()
            .into_iter()
            .filter(|(item, _)| items.contains(item))
            .collect();
        let presence: HashMap<String, bool> = if bound.is_empty() {
            HashMap::new()
        } else {
            self.registry.check_presence(&bound).await
        };

        let statuses = items
            .into_iter()
            .map(|name| {
                let detected = match presence.get(&name) {
                    Some(&present) => present,
                    None => self.detector.detect(&name),
                };
                ItemStatus { name, detected }
            })
            .collect();

        let report = ScanReport::new(mode, statuses);
        tracing::info!(
            mode = %mode,
            items = report.items.len(),
            beacon_checked = presence.len(),
            missing = report.missing_items.len(),
            "scan finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_derives_missing_items_in_order() {
        let report = ScanReport::new(
            "Trip Mode",
            vec![
                ItemStatus { name: "Wallet".into(), detected: false },
                ItemStatus { name: "Charger".into(), detected: true },
                ItemStatus { name: "Powerbank".into(), detected: false },
            ],
        );
        assert!(!report.all_detected);
        assert_eq!(report.missing_items, ["Wallet", "Powerbank"]);
    }

    #[test]
    fn empty_report_counts_as_all_detected() {
        let report = ScanReport::new("Beach Mode", Vec::new());
        assert!(report.all_detected);
        assert!(report.missing_items.is_empty());
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ScanReport::new("Gym Mode", Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("allDetected").is_some());
        assert!(json.get("missingItems").is_some());
    }

    #[test]
    fn random_detector_extremes_are_deterministic() {
        let always = RandomDetector::new(1.0);
        let never = RandomDetector::new(0.0);
        for _ in 0..50 {
            assert!(always.detect("Wallet"));
            assert!(!never.detect("Wallet"));
        }
        // out-of-range probabilities are clamped instead of panicking
        assert!(RandomDetector::new(3.0).detect("Keys"));
    }

    #[test]
    fn non_finite_probability_does_not_panic() {
        for p in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(sanitize_probability(p), DEFAULT_DETECTION_PROBABILITY);
            let detector = RandomDetector::new(p);
            for _ in 0..20 {
                detector.detect("Wallet");
            }
        }
    }

    #[test]
    fn random_detector_is_biased_toward_detected() {
        let detector = RandomDetector::default();
        let hits = (0..2000).filter(|_| detector.detect("Wallet")).count();
        // 0.7 * 2000 = 1400; leave a wide margin
        assert!((1200..=1600).contains(&hits), "hits = {hits}");
    }
}
