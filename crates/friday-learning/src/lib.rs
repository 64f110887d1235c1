//! Durable learning store for Friday: example utterances per intent, custom
//! commands, user preferences and a bounded interaction history.

pub mod error;
pub mod record;
pub mod store;

pub use error::LearningError;
pub use record::{CustomCommand, InteractionRecord, LearnedPattern, LearningRecord, Preference};
pub use store::LearningStore;
