//! Error types for the rstexport library.

use std::io;
use thiserror::Error;

/// Result type alias for rstexport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while saving, converting or exporting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text could not be encoded to or decoded from the configured encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The conversion program could not be started.
    #[error("Failed to launch converter `{program}`: {source}")]
    ConverterLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The conversion program ran but reported a failure.
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document path cannot be used for export.
    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
