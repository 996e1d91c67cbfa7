use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    #[error("Empty field '{field}' in record")]
    EmptyField { field: &'static str },

    #[error("Device {device_id} not found")]
    UnknownDevice { device_id: String },

    #[error("Classifier used before it was trained")]
    ModelNotTrained,

    #[error("No training data available")]
    NoTrainingData,

    #[error("Invalid grid size {0}: must be a finite value greater than zero")]
    InvalidGridSize(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Concurrency error: {0}")]
    Concurrency(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProcessingError::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Errors that only reject a single record and leave the stream running.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::MalformedRecord { .. }
                | ProcessingError::EmptyField { .. }
                | ProcessingError::Validation(_)
        )
    }
}
