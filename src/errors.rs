use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration issues, including unresolvable input names
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failures reported by the record decoder
    #[error("Decoder error: {0}")]
    Decoder(#[from] crate::decoder::DecoderError),

    /// Failures reported by the time frame geometry provider
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Lifecycle hook invoked out of order
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV processing
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Data validation/serialisation
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Config(format!("Glob pattern error: {}", err))
    }
}

impl From<glob::GlobError> for AppError {
    fn from(err: glob::GlobError) -> Self {
        AppError::Config(format!("Glob error: {}", err))
    }
}
