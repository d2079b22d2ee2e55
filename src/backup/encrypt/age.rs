use crate::backup::encrypt::Encrypt;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, IntoInnerError};
use std::path::Path;

static AGE_FILE_EXT: &str = "age";

/// Encrypts to a single `age1...` X25519 recipient without any external tool.
///
/// The ciphertext is streamed into a temporary file beside `dst` and renamed
/// once the age stream is finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct AgeEncryptor;

impl Encrypt for AgeEncryptor {
    fn file_ext(&self) -> &str {
        AGE_FILE_EXT
    }

    fn encrypt_to(&self, src: &Path, dst: &Path, recipient: &str) -> Result<()> {
        let recipient = recipient
            .parse::<age::x25519::Recipient>()
            .map_err(|_| Error::invalid_recipient(recipient))?;
        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(&recipient as &dyn age::Recipient))?;

        let dir = match dst.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let mut reader = BufReader::new(File::open(src)?);
        let mut writer = encryptor.wrap_output(BufWriter::new(tmp.as_file()))?;
        std::io::copy(&mut reader, &mut writer)?;
        writer
            .finish()?
            .into_inner()
            .map_err(IntoInnerError::into_error)?
            .sync_all()?;

        tmp.persist(dst).map_err(|e| Error::from(e.error))?;
        Ok(())
    }
}
