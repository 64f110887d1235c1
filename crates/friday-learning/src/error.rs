use friday_core::error::FridayError;

/// Failures inside the learning store.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    #[error("learning store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("learning record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid custom command: {0}")]
    InvalidCommand(String),
}

impl From<LearningError> for FridayError {
    fn from(err: LearningError) -> Self {
        FridayError::Learning(err.to_string())
    }
}
