use crate::backup::backup_config::BackupConfig;
use crate::backup::encrypt::Encrypt;
use crate::backup::notifications::Reporter;
use crate::backup::observer::RunObserver;
use crate::backup::report::{BackupReport, SourceFailure, SourceOutcome, SourceSuccess};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::source::Source;
use crate::backup::tar::create_archive;
use bon::Builder;
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;

static TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One backup run: archive, optionally encrypt, prune and report.
///
/// Every collaborator is borrowed; nothing here reads global state.
#[derive(Builder)]
pub struct BackupRunner<'a> {
    config: &'a BackupConfig,
    encryptor: &'a dyn Encrypt,
    reporter: Option<&'a dyn Reporter>,
    observer: &'a dyn RunObserver,
}

impl BackupRunner<'_> {
    pub fn run_backup(&self) -> Result<BackupReport> {
        self.run_backup_at(Local::now())
    }

    /// Runs with `started_at` naming the run directory.
    ///
    /// Only failing to create the run directory is returned as an error,
    /// per-source failures end up in the report.
    pub fn run_backup_at(&self, started_at: DateTime<Local>) -> Result<BackupReport> {
        let clock = Instant::now();
        let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
        let run_dir = self.config.general.backup_root.join(&timestamp);

        std::fs::create_dir_all(&run_dir)
            .map_err(|e| Error::run_directory(&run_dir, Error::from(e)))?;
        self.observer.run_started(&timestamp, &run_dir);

        let outcomes: Vec<_> = self
            .config
            .sources
            .iter()
            .map(|source| self.backup_source(source, &run_dir, &timestamp))
            .collect();

        let retention = self.config.general.retention();
        match retention.prune_older_than(&self.config.general.backup_root, Utc::now(), Some(&run_dir)) {
            Ok(summary) => self.observer.pruned(&summary),
            Err(e) => self.observer.prune_failed(&e),
        }

        let report = BackupReport::new(timestamp, run_dir, Local::now(), clock.elapsed(), outcomes);

        if let Some(reporter) = self.reporter {
            if let Err(e) = reporter.report(&report) {
                self.observer.notification_failed(&e);
            }
        }

        self.observer.run_finished(&report);
        Ok(report)
    }

    fn backup_source(&self, source: &Source, run_dir: &Path, timestamp: &str) -> SourceOutcome {
        self.observer.source_started(source);

        let outcome = match self.produce_artifact(source, run_dir, timestamp) {
            Ok(artifact_path) => SourceOutcome::Success(SourceSuccess {
                name: source.name().clone(),
                source_path: source.path().clone(),
                artifact_path,
            }),
            Err(e) => SourceOutcome::Failure(SourceFailure {
                name: source.name().clone(),
                source_path: source.path().clone(),
                reason: e.to_string(),
            }),
        };

        match &outcome {
            SourceOutcome::Success(success) => self.observer.source_succeeded(success),
            SourceOutcome::Failure(failure) => self.observer.source_failed(failure),
        }
        outcome
    }

    fn produce_artifact(&self, source: &Source, run_dir: &Path, timestamp: &str) -> Result<PathBuf> {
        if !source.exists() {
            return Err(Error::source_missing(source.path()));
        }

        let archive_path = create_archive(
            source.name(),
            source.path(),
            run_dir,
            timestamp,
            &self.config.general.compressor,
        )
        .map_err(|e| Error::archive(source.name(), e))?;

        let encryption = &self.config.encryption;
        if encryption.enabled {
            self.encryptor
                .encrypt(&archive_path, &encryption.recipient_identity)
        } else {
            Ok(archive_path)
        }
    }
}
