//! Command execution seam.
//!
//! The assistant core only decides *what* was asked. An executor turns the
//! decision into an effect (launching apps, sending mail, speaking).

use async_trait::async_trait;

use friday_core::error::{FridayError, Result};
use friday_core::types::{Action, ConfidenceScore, Entities, Intent};

/// Performs the effect behind a classified utterance or a custom command step.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Act on a classified utterance. Returns a short human-readable result.
    async fn execute(
        &self,
        intent: Intent,
        entities: &Entities,
        confidence: ConfidenceScore,
    ) -> Result<String>;

    /// Run one step of a custom command.
    async fn run_action(&self, action: &Action) -> Result<String>;
}

/// Executor that only logs what it would do.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingExecutor;

#[async_trait]
impl CommandExecutor for LoggingExecutor {
    async fn execute(
        &self,
        intent: Intent,
        entities: &Entities,
        confidence: ConfidenceScore,
    ) -> Result<String> {
        if intent == Intent::Error {
            return Err(FridayError::Execution(
                "nothing to execute for a failed analysis".to_string(),
            ));
        }
        let subject = entities
            .targets
            .first()
            .or_else(|| entities.nouns.first())
            .map(String::as_str)
            .unwrap_or("-");
        tracing::info!(%intent, %confidence, subject, "Executing intent");
        Ok(format!("{intent}: {subject}"))
    }

    async fn run_action(&self, action: &Action) -> Result<String> {
        if action.name.trim().is_empty() {
            return Err(FridayError::Execution("action has no name".to_string()));
        }
        tracing::info!(action = %action.name, params = action.parameters.len(), "Running action");
        Ok(format!("ran {}", action.name))
    }
}
