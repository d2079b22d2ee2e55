//! Credentials read from the configuration file.

use derive_more::From;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use std::result;
use validator::{Validate, ValidationError, ValidationErrors};
use zeroize::Zeroize;

pub static MASK: &str = "********";
static MIN_SECRET_LEN: usize = 8;

/// A password that prints and re-serializes as `MASK` and is wiped on drop.
#[derive(Clone, PartialEq, Eq, From)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(MASK)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(MASK)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

impl Validate for Secret {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        if self.0.chars().count() >= MIN_SECRET_LEN {
            return Ok(());
        }
        let mut errors = ValidationErrors::new();
        errors.add(
            "secret",
            ValidationError::new("TooShort").with_message(
                format!("secret must be at least {MIN_SECRET_LEN} characters").into(),
            ),
        );
        Err(errors)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_masked() {
        let secret = Secret::new("hunter2hunter2");
        assert_eq!(format!("{secret:?}"), MASK);
        assert_eq!(format!("{:?}", Some(secret)), format!("Some({MASK})"));
    }

    #[test]
    fn test_round_trip_through_yaml_masks_value() {
        let secret: Secret = serde_yml::from_str("\"correct horse battery\"").unwrap();
        assert_eq!(secret.expose(), "correct horse battery");

        let yaml = serde_yml::to_string(&secret).unwrap();
        assert!(!yaml.contains("correct horse"));
        assert!(yaml.contains(MASK));
    }

    #[test]
    fn test_minimum_length() {
        assert!(Secret::new("12345678").validate().is_ok());
        assert!(Secret::new("1234567").validate().is_err());
    }
}
