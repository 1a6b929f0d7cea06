use thiserror::Error;

/// Result alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping logging or configuration
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value was missing, malformed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration sources could not be read or merged
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// The global tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
