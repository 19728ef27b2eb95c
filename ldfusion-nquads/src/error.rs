//! Error types for N-Quads parsing

/// Error type for N-Quads parsing operations
#[derive(Debug, thiserror::Error)]
pub enum NQuadsError {
    /// Lexer error (invalid token)
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// Syntax error (tokens do not form a statement)
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Underlying reader failed
    #[error("I/O error after line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for N-Quads operations
pub type Result<T> = std::result::Result<T, NQuadsError>;

impl NQuadsError {
    /// Create a syntax error
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line the error was detected on (1-indexed)
    pub fn line(&self) -> usize {
        match self {
            Self::Lexer { line, .. } | Self::Syntax { line, .. } | Self::Io { line, .. } => *line,
        }
    }
}
