//! Error types for the probe and the renderer

use thiserror::Error;

/// Result type alias for bridgecheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing or rendering
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to build the HTTP client or launch the browser
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Failed to place the document into the page
    #[error("Failed to load content: {0}")]
    LoadError(String),

    /// Failed to capture the page
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error (connection refused, reset, unreadable body)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Local file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
