use crate::backup::encrypt::Encrypt;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use bon::Builder;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use validator::Validate;

static DEFAULT_PROGRAM: &str = "gpg";
static GPG_FILE_EXT: &str = "gpg";

fn default_program() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRAM)
}

/// Settings of the external encryption program.
///
/// The program is invoked as
/// `<program> [extra_args..] --recipient <id> --output <dst> --encrypt <src>`,
/// so any tool accepting the gpg command line works.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, PartialEq, Eq, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct GpgConfig {
    #[serde(default = "default_program")]
    #[builder(default = default_program(), into)]
    program: PathBuf,
    /// Inserted before the recipient, e.g. `["--batch", "--yes"]`
    #[serde(default)]
    #[builder(default, into)]
    extra_args: Vec<String>,
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Encrypts by running one child process per archive and waiting for it.
#[derive(Clone, Debug)]
pub struct CommandEncryptor {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl From<&GpgConfig> for CommandEncryptor {
    fn from(config: &GpgConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
        }
    }
}

impl Encrypt for CommandEncryptor {
    fn file_ext(&self) -> &str {
        GPG_FILE_EXT
    }

    fn encrypt_to(&self, src: &Path, dst: &Path, recipient: &str) -> Result<()> {
        tracing::debug!(
            "Running {:?} {:?} --recipient {} --output {:?} --encrypt {:?}",
            self.program,
            self.extra_args,
            recipient,
            dst,
            src
        );
        // output() waits for the child, so no process outlives this call
        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .arg("--recipient")
            .arg(recipient)
            .arg("--output")
            .arg(dst)
            .arg("--encrypt")
            .arg(src)
            .stdin(Stdio::null())
            .output()
            .map_err(Error::from)
            .with_msg(format!("Failed to run {:?}", self.program))?;

        let diagnostic = if !output.status.success() {
            Some(String::from_utf8_lossy(&output.stderr).trim().to_string())
        } else if !dst.exists() {
            Some(format!("reported success but {:?} was not written", dst))
        } else {
            None
        };

        match diagnostic {
            None => Ok(()),
            Some(diagnostic) => {
                tracing::error!("Encryption failed: {}", diagnostic);
                let mut error = Error::encryption_tool(
                    self.program.display().to_string(),
                    output.status.to_string(),
                    diagnostic,
                );
                if let Err(e) = std::fs::remove_file(dst) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        error = error.chain(e.into());
                    }
                }
                Err(error)
            }
        }
    }
}
