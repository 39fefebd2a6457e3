use clap::{Arg, ArgAction, Command, arg};
use kchain_consensus::config::{DuplicatePolicy, TreeConfig};
use serde::Deserialize;
use std::{ffi::OsString, fs};
use toml::from_str;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Args {
    // NOTE: it is best if property names match config file fields
    pub logdir: Option<String>,
    #[serde(rename = "nologfiles")]
    pub no_log_files: bool,
    #[serde(rename = "loglevel")]
    pub log_level: String,
    /// Read requests from this file instead of stdin
    pub input: Option<String>,
    pub duplicates: DuplicatePolicy,
    pub fold_malformed: bool,
    pub initial_capacity: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            logdir: None,
            no_log_files: false,
            log_level: "info".into(),
            input: None,
            duplicates: DuplicatePolicy::Reject,
            fold_malformed: false,
            initial_capacity: 1024,
        }
    }
}

impl Args {
    pub fn apply_to_config(&self, config: &mut TreeConfig) {
        config.duplicate_policy = self.duplicates;
        config.initial_capacity = self.initial_capacity;
    }

    pub fn tree_config(&self) -> TreeConfig {
        let mut config = TreeConfig::default();
        self.apply_to_config(&mut config);
        config
    }

    /// Directory for log files, unless file logging is disabled
    pub fn log_dir(&self) -> Option<&str> {
        self.logdir.as_deref().filter(|_| !self.no_log_files)
    }
}

pub fn cli() -> Command {
    let defaults: Args = Default::default();

    #[allow(clippy::let_and_return)]
    let cmd = Command::new("kchaind")
        .about(format!("{} v{}", env!("CARGO_PKG_DESCRIPTION"), env!("CARGO_PKG_VERSION")))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(-C --configfile <CONFIG_FILE> "Path of config file."))
        .arg(arg!(--logdir <LOG_DIR> "Directory to log output."))
        .arg(arg!(--nologfiles "Disable logging to files."))
        .arg(
            Arg::new("log_level")
                .short('d')
                .long("loglevel")
                .env("KCHAIND_LOG_LEVEL")
                .value_name("LEVEL")
                .default_value("info")
                .require_equals(true)
                .help("Logging level for all subsystems {off, error, warn, info, debug, trace}\n-- You may also specify <subsystem>=<level>,<subsystem2>=<level>,... to set the log level for individual subsystems.".to_string()),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .require_equals(true)
                .value_parser(clap::value_parser!(String))
                .help("Read commands from FILE instead of stdin."),
        )
        .arg(
            Arg::new("duplicates")
                .long("duplicates")
                .env("KCHAIND_DUPLICATES")
                .value_name("POLICY")
                .require_equals(true)
                .value_parser(clap::value_parser!(DuplicatePolicy))
                .help(format!(
                    "What to do when inserting an id which is already in the tree {{reject, replace}} (default: {}).",
                    defaults.duplicates
                )),
        )
        .arg(
            Arg::new("fold-malformed")
                .long("fold-malformed")
                .action(ArgAction::SetTrue)
                .help("Report unrecognized commands with the generic failure status 1 instead of 255."),
        )
        .arg(
            Arg::new("initial-capacity")
                .long("initial-capacity")
                .value_name("BLOCKS")
                .require_equals(true)
                .value_parser(clap::value_parser!(usize))
                .help(format!("Number of blocks to reserve memory for up front (default: {}).", defaults.initial_capacity)),
        );

    cmd
}

pub fn parse_args() -> Args {
    match Args::parse(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => err.exit(),
    }
}

impl Args {
    pub fn parse<I, T>(itr: I) -> Result<Args, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let m: clap::ArgMatches = cli().try_get_matches_from(itr)?;
        let mut defaults: Args = Default::default();

        if let Some(config_file) = m.get_one::<String>("configfile") {
            let config_str = fs::read_to_string(config_file)?;
            defaults = from_str(&config_str).map_err(|toml_error| {
                clap::Error::raw(
                    clap::error::ErrorKind::ValueValidation,
                    format!("failed parsing config file, reason: {}", toml_error.message()),
                )
            })?;
        }

        let args = Args {
            logdir: m.get_one::<String>("logdir").cloned().or(defaults.logdir),
            no_log_files: arg_match_unwrap_or::<bool>(&m, "nologfiles", defaults.no_log_files),
            log_level: arg_match_unwrap_or::<String>(&m, "log_level", defaults.log_level),
            input: m.get_one::<String>("input").cloned().or(defaults.input),
            duplicates: arg_match_unwrap_or::<DuplicatePolicy>(&m, "duplicates", defaults.duplicates),
            fold_malformed: arg_match_unwrap_or::<bool>(&m, "fold-malformed", defaults.fold_malformed),
            initial_capacity: arg_match_unwrap_or::<usize>(&m, "initial-capacity", defaults.initial_capacity),
        };

        Ok(args)
    }
}

use clap::parser::ValueSource::DefaultValue;
use std::marker::{Send, Sync};
fn arg_match_unwrap_or<T: Clone + Send + Sync + 'static>(m: &clap::ArgMatches, arg_id: &str, default: T) -> T {
    m.get_one::<T>(arg_id).cloned().filter(|_| m.value_source(arg_id) != Some(DefaultValue)).unwrap_or(default)
}
