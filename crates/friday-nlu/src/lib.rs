//! Rule-based utterance understanding for Friday.
//!
//! Tokenizes and tags a transcript, extracts entity buckets, classifies the
//! intent with an ordered keyword table and scores the result.

pub mod analyzer;
pub mod confidence;
pub mod entity;
pub mod error;
pub mod intent;
pub mod pipeline;

pub use analyzer::TokenAnalyzer;
pub use confidence::ConfidenceScorer;
pub use entity::EntityExtractor;
pub use error::NluError;
pub use intent::{IntentClassifier, IntentMatch, IntentRule, IntentTrigger, INTENT_RULES};
pub use pipeline::{Analysis, NluPipeline};
