//! Error types for utterance analysis.

use friday_core::error::FridayError;

/// Ways tokenization or tagging can fail.
///
/// These never escape [`NluPipeline::process`](crate::NluPipeline::process);
/// they are logged there and turned into the `error` intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NluError {
    #[error("transcript is not valid UTF-8: {0}")]
    InvalidEncoding(String),
    #[error("transcript contains unexpected character U+{0:04X}")]
    UnexpectedCharacter(u32),
    #[error("transcript exceeds maximum length of {0} characters")]
    TooLong(usize),
}

impl From<NluError> for FridayError {
    fn from(err: NluError) -> Self {
        FridayError::Analysis(err.to_string())
    }
}
