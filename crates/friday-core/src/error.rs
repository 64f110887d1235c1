use thiserror::Error;

/// Top-level error type for the Friday system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for FridayError` where a conversion is needed, so
/// that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FridayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Learning store error: {0}")]
    Learning(String),

    #[error("Command execution error: {0}")]
    Execution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown intent: {0}")]
    UnknownIntent(String),
}

impl From<toml::de::Error> for FridayError {
    fn from(err: toml::de::Error) -> Self {
        FridayError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FridayError {
    fn from(err: toml::ser::Error) -> Self {
        FridayError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FridayError {
    fn from(err: serde_json::Error) -> Self {
        FridayError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Friday operations.
pub type Result<T> = std::result::Result<T, FridayError>;
