// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`],
// then every `Classifier` reports latency and outcome for each call to
// [`Classifier::classify`](crate::Classifier::classify). No metrics backend is
// linked here.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::MatchOutcome;

/// Metrics observer for classifications.
pub trait MatchMetrics: Send + Sync {
    /// Record one classification.
    ///
    /// `latency` covers candidate generation, regex evaluation and property
    /// resolution. `outcome` tells a hit from a miss from a failed lookup.
    fn record_classification(&self, outcome: MatchOutcome, latency: Duration);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global classification metrics recorder.
///
/// Usually called once at startup so every `Classifier` reports to the same
/// backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
