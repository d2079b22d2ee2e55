use crate::backup::compress::CompressorConfig;
use crate::backup::encrypt::EncryptionConfig;
use crate::backup::notifications::NotificationConfig;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use crate::backup::retention::RetentionPolicy;
use crate::backup::source::{Source, Sources};
use crate::backup::validate::{validate_cron_str, validate_not_a_file};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use validator::Validate;

static DEFAULT_RETENTION_DAYS: u32 = 30;
static LOG_FILE_NAME: &str = "backup.log";

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[validate(custom(function = validate_not_a_file))]
    pub backup_root: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Directory receiving `backup.log` next to the console output
    #[validate(custom(function = validate_not_a_file))]
    pub log_directory: Option<PathBuf>,
    /// Schedule used by daemon mode
    #[validate(custom(function = validate_cron_str))]
    pub cron: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub compressor: CompressorConfig,
}

impl GeneralConfig {
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.retention_days)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_directory.as_ref().map(|d| d.join(LOG_FILE_NAME))
    }
}

/// Whole configuration file.
#[derive(Clone, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    #[validate(nested)]
    pub general: GeneralConfig,
    #[serde(default)]
    #[validate(nested)]
    pub sources: Sources,
    #[serde(default)]
    #[validate(nested)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    #[validate(nested)]
    pub notification: NotificationConfig,
}

impl BackupConfig {
    /// Reads and validates a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = File::open(path)
            .map_err(Error::from)
            .and_then(|f| serde_yml::from_reader::<_, BackupConfig>(f).map_err(Error::from))
            .with_msg(format!("Parse YAML config failed: {:?}", path))?;
        config
            .validate()
            .map_err(Error::from)
            .with_msg(format!("Config validation failed: {:?}", path))?;
        Ok(config)
    }

    /// Placeholder configuration written by `--init`.
    pub fn template() -> Self {
        Self {
            general: GeneralConfig {
                backup_root: PathBuf::from("/backups"),
                retention_days: DEFAULT_RETENTION_DAYS,
                log_directory: Some(PathBuf::from("logs")),
                cron: Some("0 2 * * *".to_string()),
                compressor: CompressorConfig::default(),
            },
            sources: Sources::from(vec![
                Source::builder().name("source1").path("/path/to/dir1").build(),
                Source::builder().name("source2").path("/path/to/dir2").build(),
            ]),
            encryption: EncryptionConfig {
                enabled: false,
                recipient_identity: "your_email@example.com".to_string(),
                ..Default::default()
            },
            notification: NotificationConfig::default(),
        }
    }

    /// Writes `template()` to `path`, never overwriting an existing file.
    pub fn write_template<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create_new(path)
            .map_err(Error::from)
            .with_msg(format!("Cannot create config file {:?}", path))?;
        serde_yml::to_writer(&mut file, &Self::template())?;
        file.flush()?;
        Ok(())
    }
}
