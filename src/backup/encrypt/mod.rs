pub mod age;
pub mod gpg;

use crate::backup::encrypt::age::AgeEncryptor;
use crate::backup::encrypt::gpg::{CommandEncryptor, GpgConfig};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::validate::validate_age_recipient;
use derive_more::From;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::result;
use validator::{Validate, ValidationError, ValidationErrors};

/// Replaces a plaintext archive by an encrypted artifact.
pub trait Encrypt {
    /// Suffix appended to the archive name, without the leading dot.
    fn file_ext(&self) -> &str;

    /// Writes the encrypted form of `src` to `dst`. Must not touch `src`.
    fn encrypt_to(&self, src: &Path, dst: &Path, recipient: &str) -> Result<()>;

    /// Encrypts `archive_path` next to itself and deletes the plaintext.
    ///
    /// The plaintext is removed only once `encrypt_to` succeeded. On any
    /// failure the plaintext archive is left in place.
    fn encrypt(&self, archive_path: &Path, recipient: &str) -> Result<PathBuf> {
        let encrypted_path = encrypted_path(archive_path, self.file_ext());
        tracing::info!(
            "Encrypting archive {:?} for recipient {}",
            archive_path,
            recipient
        );

        let res = self
            .encrypt_to(archive_path, &encrypted_path, recipient)
            .and_then(|_| {
                std::fs::remove_file(archive_path).map_err(|e| {
                    let mut e = Error::from(e);
                    if let Err(e2) = std::fs::remove_file(&encrypted_path) {
                        e = e.chain(e2.into());
                    }
                    e
                })
            });

        match res {
            Ok(_) => {
                tracing::info!("Encryption successful: {:?}", encrypted_path);
                Ok(encrypted_path)
            }
            Err(e) => Err(Error::encryption(archive_path, e)),
        }
    }
}

/// `{archive_path}.{ext}`
pub fn encrypted_path(archive_path: &Path, ext: &str) -> PathBuf {
    let mut path = archive_path.as_os_str().to_owned();
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

/// Which encryption backend produces the artifact.
#[derive(Clone, From, Serialize, Deserialize, Debug)]
#[serde(tag = "encryptor_type")]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum EncryptorConfig {
    /// External `gpg` compatible program, run once per archive
    Gpg(GpgConfig),
    /// In-process age encryption to an X25519 recipient
    Age,
}

impl Default for EncryptorConfig {
    fn default() -> Self {
        Self::Gpg(GpgConfig::default())
    }
}

impl Validate for EncryptorConfig {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        match self {
            EncryptorConfig::Gpg(gpg) => gpg.validate(),
            EncryptorConfig::Age => Ok(()),
        }
    }
}

impl EncryptorConfig {
    pub fn build_encryptor(&self) -> Box<dyn Encrypt> {
        match self {
            EncryptorConfig::Gpg(gpg) => Box::new(CommandEncryptor::from(gpg)),
            EncryptorConfig::Age => Box::new(AgeEncryptor),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = validate_encryption_config))]
pub struct EncryptionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub recipient_identity: String,
    #[serde(default)]
    #[validate(nested)]
    pub tool: EncryptorConfig,
}

fn validate_encryption_config(config: &EncryptionConfig) -> result::Result<(), ValidationError> {
    if !config.enabled {
        return Ok(());
    }
    if config.recipient_identity.trim().is_empty() {
        return Err(ValidationError::new("MissingRecipient")
            .with_message("encryption is enabled but recipient_identity is empty".into()));
    }
    match config.tool {
        EncryptorConfig::Age => validate_age_recipient(&config.recipient_identity),
        EncryptorConfig::Gpg(_) => Ok(()),
    }
}
