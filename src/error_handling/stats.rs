//! Run diagnostics tracking.
//!
//! Counts the conditions a run absorbs instead of failing on: dropped records,
//! repaired AI responses, geocoding fallbacks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::DiagnosticType;

/// Thread-safe diagnostics counter set.
///
/// Every `DiagnosticType` is initialised to zero on creation, so the map is
/// never missing a key. Shared between collaborators with `Arc`.
pub struct RunDiagnostics {
    counts: HashMap<DiagnosticType, AtomicUsize>,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for kind in DiagnosticType::iter() {
            counts.insert(kind, AtomicUsize::new(0));
        }
        RunDiagnostics { counts }
    }

    /// Increment a diagnostic counter.
    pub fn increment(&self, kind: DiagnosticType) {
        self.add(kind, 1);
    }

    /// Add `n` to a diagnostic counter.
    pub fn add(&self, kind: DiagnosticType, n: usize) {
        if let Some(counter) = self.counts.get(&kind) {
            counter.fetch_add(n, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment diagnostic {:?} which is not in the map. \
                 This indicates a bug in RunDiagnostics initialization.",
                kind
            );
        }
    }

    /// Get the count for a diagnostic type.
    pub fn get(&self, kind: DiagnosticType) -> usize {
        self.counts
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Records excluded from the snapshot by validation.
    pub fn dropped_records(&self) -> usize {
        DiagnosticType::iter()
            .filter(DiagnosticType::is_validation_drop)
            .map(|k| self.get(k))
            .sum()
    }

    /// Sum of all counters.
    pub fn total(&self) -> usize {
        DiagnosticType::iter().map(|k| self.get(k)).sum()
    }

    /// Non-zero counters in declaration order.
    pub fn non_zero(&self) -> Vec<(DiagnosticType, usize)> {
        DiagnosticType::iter()
            .map(|k| (k, self.get(k)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for RunDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}
