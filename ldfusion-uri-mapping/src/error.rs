//! Error types for URI mapping files

use std::path::PathBuf;

/// Errors raised while reading or writing mapping-related files
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

impl MappingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
