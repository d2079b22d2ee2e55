use crate::backup::report::{BackupReport, SourceFailure, SourceSuccess};
use crate::backup::result_error::error::Error;
use crate::backup::retention::PruneSummary;
use crate::backup::source::Source;
use std::path::Path;

/// Hooks the runner calls as a run progresses.
///
/// Passed to the runner by reference so that callers decide where progress
/// goes; every hook has a no-op default.
pub trait RunObserver {
    fn run_started(&self, _timestamp: &str, _run_dir: &Path) {}
    fn source_started(&self, _source: &Source) {}
    fn source_succeeded(&self, _success: &SourceSuccess) {}
    fn source_failed(&self, _failure: &SourceFailure) {}
    fn pruned(&self, _summary: &PruneSummary) {}
    fn prune_failed(&self, _error: &Error) {}
    fn notification_failed(&self, _error: &Error) {}
    fn run_finished(&self, _report: &BackupReport) {}
}

/// Default observer, emits `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn run_started(&self, timestamp: &str, run_dir: &Path) {
        tracing::info!("Starting backup run {} into {:?}", timestamp, run_dir);
    }

    fn source_started(&self, source: &Source) {
        tracing::info!("Backing up {} from {:?}", source.name(), source.path());
    }

    fn source_succeeded(&self, success: &SourceSuccess) {
        tracing::info!(
            "Successfully backed up {} to {:?}",
            success.name,
            success.artifact_path
        );
    }

    fn source_failed(&self, failure: &SourceFailure) {
        tracing::error!(
            "Failed to backup {} ({:?}): {}",
            failure.name,
            failure.source_path,
            failure.reason
        );
    }

    fn pruned(&self, summary: &PruneSummary) {
        tracing::info!(
            "Retention removed {} run directories, {} failures",
            summary.removed.len(),
            summary.failures.len()
        );
    }

    fn prune_failed(&self, error: &Error) {
        tracing::error!("Retention pruning failed: {error}");
    }

    fn notification_failed(&self, error: &Error) {
        tracing::error!("{error}");
    }

    fn run_finished(&self, report: &BackupReport) {
        tracing::info!(
            "Backup process completed in {:.2} seconds: {} succeeded, {} failed",
            report.elapsed_seconds(),
            report.successes().len(),
            report.failures().len()
        );
    }
}
