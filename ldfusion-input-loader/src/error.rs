//! Error types for the input loader

use std::path::PathBuf;
use thiserror::Error;

/// Input loader errors
#[derive(Error, Debug)]
pub enum LoaderError {
    /// A source could not be read
    #[error("Failed to read source '{source_label}': {source}")]
    SourceRead {
        source_label: String,
        #[source]
        source: std::io::Error,
    },

    /// A source produced a record that is not a valid statement
    #[error("Malformed record in source '{source_label}': {source}")]
    Malformed {
        source_label: String,
        #[source]
        source: ldfusion_nquads::NQuadsError,
    },

    /// Creating, writing or reading a run file failed
    #[error("Run file I/O error on {}: {source}", path.display())]
    RunIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run file does not decode
    #[error("Corrupt run file {}: {message}", path.display())]
    CorruptRun { path: PathBuf, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `next_quads` or iteration before `initialize`
    #[error("Loader has not been initialized")]
    NotInitialized,

    /// `initialize` called on a loader that already ran
    #[error("Loader has already been initialized")]
    AlreadyInitialized,

    /// `next_quads` with no resource block remaining
    #[error("No resource block remaining")]
    Exhausted,

    /// Operation after `close`
    #[error("Loader has been closed")]
    Closed,
}

impl LoaderError {
    pub(crate) fn run_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoaderError::RunIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LoaderError::CorruptRun {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify a run read failure: undecodable data is corruption,
    /// everything else is I/O.
    pub(crate) fn run_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                Self::corrupt(path, source.to_string())
            }
            _ => Self::run_io(path, source),
        }
    }
}

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;
