//! Shared types, configuration and errors for the Friday voice assistant core.

pub mod config;
pub mod error;
pub mod types;

pub use config::FridayConfig;
pub use error::{FridayError, Result};
pub use types::*;
