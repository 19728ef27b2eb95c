use crate::config_file::ConfigFileError;
use colored::Colorize;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Unreadable or unparsable config file.
    Config(String),
    /// Config values that cannot be used.
    Usage(String),
    /// Unreadable or malformed link file.
    Input(String),
    /// Loading sameAs links or canonical URIs.
    Mapping(ldfusion_uri_mapping::MappingError),
    /// Reading, sorting or grouping the input.
    Loader(ldfusion_input_loader::LoaderError),
    /// Writing the fused output.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(
                f,
                "{} {msg}\n  {} run 'ldfusion --help' for usage",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Mapping(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Loader(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Output(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        match e {
            ConfigFileError::InvalidValue(msg) => CliError::Usage(msg),
            other => CliError::Config(other.to_string()),
        }
    }
}

impl From<ldfusion_uri_mapping::MappingError> for CliError {
    fn from(e: ldfusion_uri_mapping::MappingError) -> Self {
        CliError::Mapping(e)
    }
}

impl From<ldfusion_input_loader::LoaderError> for CliError {
    fn from(e: ldfusion_input_loader::LoaderError) -> Self {
        CliError::Loader(e)
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
