//! Per-source outcomes and the run summary handed to reporters.

use chrono::{DateTime, Local};
use getset::Getters;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceSuccess {
    pub name: String,
    pub source_path: PathBuf,
    pub artifact_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub name: String,
    pub source_path: PathBuf,
    pub reason: String,
}

/// Exactly one of these is recorded per source per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceOutcome {
    Success(SourceSuccess),
    Failure(SourceFailure),
}

/// Everything a run produced, in source declaration order.
#[derive(Clone, Debug, Serialize, Getters)]
#[getset(get = "pub")]
pub struct BackupReport {
    timestamp: String,
    run_dir: PathBuf,
    #[serde(skip)]
    finished_at: DateTime<Local>,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    elapsed: Duration,
    successes: Vec<SourceSuccess>,
    failures: Vec<SourceFailure>,
}

fn serialize_seconds<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl BackupReport {
    pub fn new(
        timestamp: String,
        run_dir: PathBuf,
        finished_at: DateTime<Local>,
        elapsed: Duration,
        outcomes: Vec<SourceOutcome>,
    ) -> Self {
        let (successes, failures) =
            outcomes
                .into_iter()
                .fold((vec![], vec![]), |(mut s, mut f), outcome| {
                    match outcome {
                        SourceOutcome::Success(success) => s.push(success),
                        SourceOutcome::Failure(failure) => f.push(failure),
                    }
                    (s, f)
                });

        Self {
            timestamp,
            run_dir,
            finished_at,
            elapsed,
            successes,
            failures,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_outcomes(self) -> (Vec<SourceSuccess>, Vec<SourceFailure>) {
        (self.successes, self.failures)
    }

    pub fn subject(&self) -> String {
        if self.has_failures() {
            format!(
                "[ALERT] Backup job completed with {} failures",
                self.failures.len()
            )
        } else {
            format!(
                "Backup job completed successfully - {}",
                self.finished_at.format("%Y-%m-%d")
            )
        }
    }
}

impl Display for BackupReport {
    /// Plain text notification body
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Backup Job Report")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Run: {}", self.timestamp)?;
        writeln!(f, "Date: {}", self.finished_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Elapsed Time: {:.2} seconds", self.elapsed_seconds())?;
        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "- Successful Backups: {}", self.successes.len())?;
        writeln!(f, "- Failed Backups: {}", self.failures.len())?;

        if !self.successes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Successful Backups:")?;
            for s in &self.successes {
                writeln!(
                    f,
                    "- {}: {} -> {}",
                    s.name,
                    s.source_path.display(),
                    s.artifact_path.display()
                )?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed Backups:")?;
            for fail in &self.failures {
                writeln!(
                    f,
                    "- {}: {} - Error: {}",
                    fail.name,
                    fail.source_path.display(),
                    fail.reason
                )?;
            }
        }

        writeln!(f)?;
        write!(f, "This is an automated message. Please do not reply.")
    }
}
