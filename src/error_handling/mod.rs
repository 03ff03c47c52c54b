//! Error handling and run diagnostics.
//!
//! This module provides:
//! - Error type definitions for every collaborator and for the run itself
//! - Transient/permanent categorization and the retry strategy
//! - Diagnostics counters for conditions a run absorbs
//!
//! Collaborator and storage failures abort a run. A single bad record does not:
//! it is dropped and counted.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{get_retry_strategy, is_transient_reqwest, is_transient_status};
pub use stats::RunDiagnostics;
pub use types::{
    DiagnosticType, DiscoveryError, ExtractionError, GeocodeError, InitializationError,
    PublishError, SyncError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_diagnostics_initialization() {
        let stats = RunDiagnostics::new();
        for kind in DiagnosticType::iter() {
            assert_eq!(stats.get(kind), 0);
        }
        assert_eq!(stats.total(), 0);
        assert!(stats.non_zero().is_empty());
    }

    #[test]
    fn test_diagnostics_increment_and_add() {
        let stats = RunDiagnostics::new();
        stats.increment(DiagnosticType::MissingName);
        stats.add(DiagnosticType::MissingAddress, 2);
        stats.increment(DiagnosticType::DistrictFallback);

        assert_eq!(stats.get(DiagnosticType::MissingName), 1);
        assert_eq!(stats.get(DiagnosticType::MissingAddress), 2);
        assert_eq!(stats.dropped_records(), 3);
        assert_eq!(stats.total(), 4);
        assert_eq!(
            stats.non_zero(),
            vec![
                (DiagnosticType::MissingName, 1),
                (DiagnosticType::MissingAddress, 2),
                (DiagnosticType::DistrictFallback, 1),
            ]
        );
    }

    #[test]
    fn test_diagnostics_shared_across_threads() {
        use std::sync::Arc;

        let stats = Arc::new(RunDiagnostics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        stats.increment(DiagnosticType::Geocoded);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(stats.get(DiagnosticType::Geocoded), 100);
    }
}
