use std::fmt::Debug;

pub mod error;
pub mod result;

/// Wraps an error, or the error of a `Result`, with where and why it happened.
pub trait ErrorContext: Sized {
    fn with_msg<S: Into<String>>(self, msg: S) -> Self;

    fn add_fn_name<S: Into<String>>(self, fn_name: S) -> Self;

    /// Like `add_fn_name`, also recording the value the function worked on.
    fn with_debug_object<O: Debug + Send + 'static, S: Into<String>>(self, obj: O, fn_name: S) -> Self;
}
