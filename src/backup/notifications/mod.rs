use crate::backup::notifications::smtp::SmtpNotificationConfig;
use crate::backup::report::BackupReport;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use derive_more::From;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::result;
use validator::{Validate, ValidationError, ValidationErrors};

pub mod smtp;

/// Transport used to deliver run reports.
#[derive(Clone, From, Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum NotificationChannelConfig {
    Smtp(SmtpNotificationConfig),
}

impl Validate for NotificationChannelConfig {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        match self {
            Self::Smtp(inner) => inner.validate(),
        }
    }
}

impl Notification for NotificationChannelConfig {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        match self {
            Self::Smtp(inner) => inner.send(topic, msg),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = validate_notification_config))]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    #[validate(nested)]
    pub channel: Option<NotificationChannelConfig>,
}

fn validate_notification_config(
    config: &NotificationConfig,
) -> result::Result<(), ValidationError> {
    if config.enabled && config.channel.is_none() {
        return Err(ValidationError::new("MissingChannel")
            .with_message("notification is enabled but no channel is configured".into()));
    }
    Ok(())
}

impl NotificationConfig {
    /// The configured channel, if notification is switched on.
    pub fn reporter(&self) -> Option<&NotificationChannelConfig> {
        self.channel.as_ref().filter(|_| self.enabled)
    }
}

pub trait Notification {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()>;
}

/// Receives the summary of a finished run.
pub trait Reporter {
    fn report(&self, report: &BackupReport) -> Result<()>;
}

impl<N: Notification> Reporter for N {
    fn report(&self, report: &BackupReport) -> Result<()> {
        tracing::info!("Sending backup notification");
        self.send(report.subject(), report)
            .map_err(Error::notification)
    }
}
