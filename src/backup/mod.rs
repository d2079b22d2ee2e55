pub mod archive;
pub mod backup_config;
pub mod compress;
pub mod encrypt;
pub mod notifications;
pub mod observer;
pub mod report;
pub mod result_error;
pub mod retention;
pub mod runner;
pub mod schedule;
pub mod secret;
pub mod source;
pub mod tar;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
