//! Composition layer for the `friday` binary.

pub mod cli;
pub mod engine;
pub mod executor;

pub use engine::{Assistant, AssistantReply};
pub use executor::{CommandExecutor, LoggingExecutor};
