use crate::backup::result_error::error::Error;
use crate::backup::result_error::ErrorContext;
use std::fmt::Debug;

pub type Result<T> = std::result::Result<T, Error>;

impl<T> ErrorContext for Result<T> {
    fn with_msg<S: Into<String>>(self, msg: S) -> Self {
        self.map_err(|e| e.with_msg(msg))
    }

    fn add_fn_name<S: Into<String>>(self, fn_name: S) -> Self {
        self.map_err(|e| e.add_fn_name(fn_name))
    }

    fn with_debug_object<O: Debug + Send + 'static, S: Into<String>>(self, obj: O, fn_name: S) -> Self {
        self.map_err(|e| e.with_debug_object(obj, fn_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through_untouched() {
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.with_msg("unused").add_fn_name("unused").unwrap(), 7);
    }

    #[test]
    fn test_err_is_wrapped_outermost_last() {
        let err: Result<()> = Err(Error::invalid_cron("x"));
        let err = err.add_fn_name("parse").with_msg("loading config").unwrap_err();
        match err {
            Error::Context { msg, error } => {
                assert_eq!(msg, "loading config");
                assert!(matches!(*error, Error::InFunction { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
