use crate::backup::function_path;
use crate::backup::notifications::Notification;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use crate::backup::secret::Secret;
use bon::Builder;
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Display;
use validator::Validate;

/// Email channel for run reports.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct SmtpNotificationConfig {
    #[builder(into)]
    host: String,
    /// Defaults to the standard port of `smtp_mode`
    port: Option<u16>,
    smtp_mode: SmtpMode,
    from: Mailbox,
    #[validate(length(min = 1))]
    to: Vec<Mailbox>,
    #[builder(into)]
    username: String,
    #[validate(nested)]
    #[builder(into)]
    password: Secret,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SmtpMode {
    /// Plain text, for local relays only
    Unsecured,
    /// Implicit TLS
    Ssl,
    StartTls,
}

impl SmtpNotificationConfig {
    fn message(&self, subject: String, body: String) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        builder.body(body).map_err(Error::from)
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let host = self.host.as_str();
        let mut builder = match self.smtp_mode {
            SmtpMode::Unsecured => SmtpTransport::builder_dangerous(host),
            SmtpMode::Ssl => SmtpTransport::relay(host)?,
            SmtpMode::StartTls => SmtpTransport::starttls_relay(host)?,
        };
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        let credentials = Credentials::new(self.username.clone(), self.password.expose().to_owned());
        Ok(builder.credentials(credentials).build())
    }
}

/// One error per line of a negative server reply.
fn rejection<I>(lines: I) -> Error
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Error::lots_of_error(lines.into_iter().map(|line| Error::smtp_send_error(line)).collect_vec())
}

impl Notification for SmtpNotificationConfig {
    #[named]
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        let recipients = self.to.iter().join(", ");
        tracing::info!("Emailing report to {} via {}", recipients, self.host);

        let email = self
            .message(topic.to_string(), msg.to_string())
            .with_msg(format!("Cannot build report email for {}", recipients))
            .add_fn_name(function_path!())?;
        let mailer = self
            .transport()
            .with_msg(format!(
                "Cannot set up smtp client for {:?} ({:?})",
                self.host, self.smtp_mode
            ))
            .add_fn_name(function_path!())?;

        let response = mailer
            .send(&email)
            .map_err(Error::from)
            .add_fn_name(function_path!())?;
        if !response.is_positive() {
            return Err(rejection(response.message()));
        }

        tracing::info!("Report email accepted by {}", self.host);
        Ok(())
    }
}
