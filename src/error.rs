//! Error types for PDF sanitization

use std::path::PathBuf;

/// Result type alias for sanitizer operations
pub type Result<T> = std::result::Result<T, SanitizeError>;

/// Errors that can occur while checking or sanitizing a PDF
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// Input file does not exist or is not readable
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Document is encrypted and cannot be opened without credentials
    #[error("PDF is password protected: {0}")]
    PasswordProtected(PathBuf),

    /// Malformed document structure encountered while opening or traversing
    #[error("structural error in PDF: {0}")]
    Structural(#[from] lopdf::Error),

    /// Failed to write the sanitized output
    #[error("failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid command invocation, e.g. identical input and output paths
    #[error("{0}")]
    InvalidInvocation(String),
}
