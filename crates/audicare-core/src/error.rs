use thiserror::Error;

/// Top-level error type for AudiCare.
///
/// Subsystem crates define their own error enums and convert into this one
/// where a failure has to cross a crate boundary (configuration, storage).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudiCareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AudiCareError {
    fn from(err: toml::de::Error) -> Self {
        AudiCareError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AudiCareError {
    fn from(err: toml::ser::Error) -> Self {
        AudiCareError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AudiCareError {
    fn from(err: serde_json::Error) -> Self {
        AudiCareError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for AudiCare operations.
pub type Result<T> = std::result::Result<T, AudiCareError>;
