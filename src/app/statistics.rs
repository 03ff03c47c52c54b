//! Diagnostics and summary printing.

use log::info;

use crate::error_handling::RunDiagnostics;
use crate::run::RunOutcome;

/// Logs every non-zero diagnostic counter.
///
/// Validation drops are listed first, then the absorbed extraction and
/// geocoding conditions.
pub fn print_diagnostics(diagnostics: &RunDiagnostics) {
    let counts = diagnostics.non_zero();
    if counts.is_empty() {
        return;
    }

    let dropped = diagnostics.dropped_records();
    if dropped > 0 {
        info!("Dropped records ({} total):", dropped);
        for (kind, count) in counts.iter().filter(|(k, _)| k.is_validation_drop()) {
            info!("   {}: {}", kind, count);
        }
    }

    info!("Diagnostics:");
    for (kind, count) in counts.iter().filter(|(k, _)| !k.is_validation_drop()) {
        info!("   {}: {}", kind, count);
    }
}

/// One-line summary of a finished run.
pub fn print_run_summary(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Published(report) => info!(
            "✅ Published {} shop{} from {} PDF{} to {}",
            report.snapshot.total_shops,
            if report.snapshot.total_shops == 1 { "" } else { "s" },
            report.snapshot.processed_pdfs.len(),
            if report.snapshot.processed_pdfs.len() == 1 { "" } else { "s" },
            report.snapshot_path.display()
        ),
        RunOutcome::Skipped(reason) => info!("⏭️  No processing needed: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::DiagnosticType;
    use crate::run::SkipReason;

    #[test]
    fn test_print_diagnostics_empty() {
        // Should not panic with no counters set
        print_diagnostics(&RunDiagnostics::new());
    }

    #[test]
    fn test_print_diagnostics_mixed() {
        let diagnostics = RunDiagnostics::new();
        diagnostics.increment(DiagnosticType::MissingAddress);
        diagnostics.add(DiagnosticType::DistrictFallback, 3);
        diagnostics.increment(DiagnosticType::RepairedResponse);
        print_diagnostics(&diagnostics);
    }

    #[test]
    fn test_print_run_summary_skipped() {
        print_run_summary(&RunOutcome::Skipped(SkipReason::NothingDiscovered));
    }
}
