//! # autobak
//!
//! Scheduled directory backups: one timestamped run directory per run, one
//! compressed tar archive per source, optional encryption, age based
//! retention and an emailed report.
//!
//! ## Features
//!
//! - **Sources**: named directories, archived in declaration order
//! - **Compression**: XZ (LZMA) or plain tar
//! - **Encryption**: external `gpg` compatible tool or in-process age
//! - **Retention**: run directories older than `retention_days` are removed
//! - **Reporting**: SMTP notification with a per-source summary
//! - **Scheduling**: cron driven daemon mode
//!
//! ## Quick Start
//!
//! ```no_run
//! use autobak::backup::backup_config::BackupConfig;
//! use autobak::backup::notifications::Reporter;
//! use autobak::backup::observer::TracingObserver;
//! use autobak::backup::runner::BackupRunner;
//!
//! let config = BackupConfig::load("backup_config.yml")?;
//! let encryptor = config.encryption.tool.build_encryptor();
//! let report = BackupRunner::builder()
//!     .config(&config)
//!     .encryptor(encryptor.as_ref())
//!     .maybe_reporter(config.notification.reporter().map(|r| r as &dyn Reporter))
//!     .observer(&TracingObserver)
//!     .build()
//!     .run_backup()?;
//! println!("{} failures", report.failures().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
