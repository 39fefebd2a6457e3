//!
//! Logger and logging macros
//!
//! The macros are those of the `log` facade. [`init_logger`] installs a log4rs backend
//! writing to stderr and, optionally, to rolling files.
//!
pub use log::{debug, error, info, trace, warn};

use log4rs::{
    Handle,
    config::{Config, Root},
};
use thiserror::Error;

mod appender;
mod consts;
mod logger;

pub use consts::*;
pub use logger::Filters;

use appender::AppenderSpec;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logger spec parsing error: {0}")]
    ParseLoggerSpecError(String),

    #[error("log appender error: {0}")]
    Appender(String),

    #[error("logger config error: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),

    #[error("a logger was already installed")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Installs the global logger.
///
/// `filters` is a filter expression (see [`Filters`]), further extended by the
/// `RUST_LOG` environment variable. When `log_dir` is given, all records are also written
/// to [`LOG_FILE_NAME`] and errors to [`ERR_LOG_FILE_NAME`] inside it.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> Result<Handle, LogError> {
    let mut parsed = Filters::new();
    parsed.parse_expression(filters)?.parse_env(DEFAULT_LOGGER_ENV)?;

    let mut specs = vec![AppenderSpec::console(consts::CONSOLE_APPENDER, None)];
    if let Some(log_dir) = log_dir {
        specs.push(AppenderSpec::roller(consts::LOG_FILE_APPENDER, None, log_dir, LOG_FILE_NAME)?);
        specs.push(AppenderSpec::roller(consts::ERR_LOG_FILE_APPENDER, Some(log::LevelFilter::Warn), log_dir, ERR_LOG_FILE_NAME)?);
    }
    let names = specs.iter().map(|spec| spec.name).collect::<Vec<_>>();

    let config = Config::builder()
        .appenders(specs.into_iter().map(AppenderSpec::appender))
        .loggers(parsed.loggers(&names))
        .build(Root::builder().appenders(names.iter().copied()).build(parsed.root_level()))?;

    Ok(log4rs::init_config(config)?)
}
