//! Error types for panel configuration and module handoff

use thiserror::Error;

/// Result type alias for wavepanels operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing panels or starting the module
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid page or panel configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The binary module could not be fetched, read or recognized
    #[error("Module initialization failed: {0}")]
    ModuleInitError(String),

    /// The page content never became ready or could not be read
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// The module entry point rejected the run configuration
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Filesystem or stream error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(format!("malformed JSON: {}", err))
    }
}

#[cfg(feature = "fetch")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ModuleInitError(err.to_string())
    }
}
