//! Validation functions for configuration values.
//!
//! Custom validators for source names, cron expressions and encryption
//! recipients, shaped for `#[validate(custom(function = ...))]`.

use chrono::Local;
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::Path;

pub fn validate_valid_archive_base_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    if !is_sanitized(name.as_ref()) {
        return Err(ValidationError::new("InvalidArchiveBaseName").with_message(
            format!(
                "Invalid source name {:?}, try sanitizing like {:?}",
                name.as_ref(),
                sanitize(name.as_ref())
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_cron_str<S: AsRef<str>>(cron: S) -> Result<(), ValidationError> {
    let cron = cron.as_ref();
    if cron_parser::parse(cron, &Local::now()).is_err() {
        return Err(ValidationError::new("InvalidCron")
            .with_message(format!("Invalid cron string: {cron:?}").into()));
    }

    Ok(())
}

pub fn validate_not_a_file<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() && !dir.is_dir() {
        return Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} is not a directory", dir).into()));
    }

    Ok(())
}

pub fn validate_age_recipient<S: AsRef<str>>(recipient: S) -> Result<(), ValidationError> {
    let recipient = recipient.as_ref();
    recipient
        .parse::<age::x25519::Recipient>()
        .map(|_| ())
        .map_err(|e| {
            ValidationError::new("InvalidAgeRecipient")
                .with_message(format!("Invalid age recipient {recipient:?}: {e}").into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_base_name() {
        assert!(validate_valid_archive_base_name("documents").is_ok());
        assert!(validate_valid_archive_base_name("my-photos_2").is_ok());
        assert!(validate_valid_archive_base_name("../etc").is_err());
        assert!(validate_valid_archive_base_name("a/b").is_err());
    }

    #[test]
    fn test_cron_str() {
        assert!(validate_cron_str("0 2 * * *").is_ok());
        assert!(validate_cron_str("*/15 * * * *").is_ok());
        assert!(validate_cron_str("every night").is_err());
    }

    #[test]
    fn test_not_a_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_not_a_file(temp_dir.path()).is_ok());
        assert!(validate_not_a_file(temp_dir.path().join("later")).is_ok());

        let file = temp_dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(validate_not_a_file(&file).is_err());
    }

    #[test]
    fn test_age_recipient() {
        let identity = age::x25519::Identity::generate();
        assert!(validate_age_recipient(identity.to_public().to_string()).is_ok());
        assert!(validate_age_recipient("admin@example.com").is_err());
    }
}
