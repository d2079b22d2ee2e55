use crate::backup::result_error::ErrorContext;
use itertools::Itertools;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;
use thiserror_ext::Construct;

#[derive(Error, Debug, Construct)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    LiblzmaStream(#[from] liblzma::stream::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),
    #[error(transparent)]
    AgeEncrypt(#[from] age::EncryptError),
    #[error(transparent)]
    Lettre(#[from] lettre::error::Error),
    #[error(transparent)]
    SmtpTransport(#[from] lettre::transport::smtp::Error),
    #[error("Invalid cron string {0}")]
    InvalidCron(String),
    #[error("Invalid age recipient {0:?}")]
    InvalidRecipient(String),
    #[error("Smtp server rejected message: {0}")]
    SmtpSendError(String),
    #[error("source path does not exist")]
    SourceMissing(PathBuf),
    #[error("{program} exited with {status}: {diagnostic}")]
    EncryptionTool {
        program: String,
        status: String,
        diagnostic: String,
    },
    #[error("Archiving source {name:?} failed:\n{}", indent::indent_all_with("  ", error.to_string()))]
    Archive { name: String, error: Box<Error> },
    #[error("Encrypting {path:?} failed:\n{}", indent::indent_all_with("  ", error.to_string()))]
    Encryption { path: PathBuf, error: Box<Error> },
    #[error("Pruning {path:?} failed:\n{}", indent::indent_all_with("  ", error.to_string()))]
    Prune { path: PathBuf, error: Box<Error> },
    #[error("Sending notification failed:\n{}", indent::indent_all_with("  ", error.to_string()))]
    Notification { error: Box<Error> },
    #[error("Creating run directory {path:?} failed:\n{}", indent::indent_all_with("  ", error.to_string()))]
    RunDirectory { path: PathBuf, error: Box<Error> },
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    Context { msg: String, error: Box<Error> },
    #[error("{} failed:\n{}", fn_name, indent::indent_all_with("  ", error.to_string()))]
    InFunction { fn_name: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    DebugObjectContext {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
    #[error("{}", itertools::join(.0, "\n\n"))]
    LotsOfError(Vec<Error>),
}

impl ErrorContext for Error {
    fn with_msg<S: Into<String>>(self, msg: S) -> Self {
        Self::Context {
            msg: msg.into(),
            error: Box::new(self),
        }
    }

    fn add_fn_name<S: Into<String>>(self, fn_name: S) -> Self {
        Self::InFunction {
            fn_name: fn_name.into(),
            error: Box::new(self),
        }
    }

    fn with_debug_object<O: Debug + Send + 'static, S: Into<String>>(self, obj: O, fn_name: S) -> Self {
        Self::DebugObjectContext {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl Error {
    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(|e| e.into_iter())),
            e => Box::new(std::iter::once(e)),
        }
    }

    pub fn chain(self, other: Error) -> Error {
        Error::LotsOfError(self.into_iter().chain(other.into_iter()).collect_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(msg: &str) -> Error {
        Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, msg.to_string()))
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        match error {
            Error::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_source_missing_display() {
        let error = Error::source_missing("/does/not/exist");
        assert_eq!(error.to_string(), "source path does not exist");
    }

    #[test]
    fn test_encryption_tool_display_carries_diagnostic() {
        let error = Error::encryption_tool("gpg", "exit status: 2", "gpg: no public key");
        let error_str = error.to_string();
        assert!(error_str.contains("gpg"));
        assert!(error_str.contains("exit status: 2"));
        assert!(error_str.contains("no public key"));
    }

    #[test]
    fn test_stage_errors_indent_inner_error() {
        let error = Error::archive("docs", not_found("gone"));
        let error_str = error.to_string();
        assert!(error_str.starts_with("Archiving source \"docs\" failed:\n"));
        assert!(error_str.contains("  gone"));
    }

    #[test]
    fn test_error_with_msg() {
        let error = not_found("file not found").with_msg("Custom message");

        match error {
            Error::Context { msg, .. } => assert_eq!(msg, "Custom message"),
            _ => panic!("Expected Context error"),
        }
    }

    #[test]
    fn test_error_add_fn_name_display() {
        let error = not_found("file not found").add_fn_name("create_archive");
        let error_str = error.to_string();
        assert!(error_str.contains("create_archive failed"));
        assert!(error_str.contains("file not found"));
    }

    #[test]
    fn test_error_with_debug_display() {
        let error = not_found("file not found").with_debug_object(42, "test_function");
        let error_str = error.to_string();

        assert!(error_str.contains("42 test_function failed"));
        assert!(error_str.contains("file not found"));
    }

    #[test]
    fn test_chain_flattens_nested_lists() {
        let nested = not_found("a").chain(not_found("b"));
        let combined = nested.chain(not_found("c"));
        match combined {
            Error::LotsOfError(errors) => assert_eq!(errors.len(), 3),
            _ => panic!("Expected LotsOfError"),
        }
    }

    #[test]
    fn test_error_chain() {
        let chained = not_found("error1").chain(not_found("error2"));
        match chained {
            Error::LotsOfError(errors) => assert_eq!(errors.len(), 2),
            _ => panic!("Expected LotsOfError"),
        }
    }
}
