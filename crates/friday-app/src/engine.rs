//! Per-utterance orchestration.
//!
//! Analysis and the context commit run inline. Learning writes are spawned
//! onto the runtime and never awaited by [`Assistant::handle_utterance`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use friday_context::ConversationContext;
use friday_core::config::FridayConfig;
use friday_core::types::{ConfidenceScore, Entities, Intent};
use friday_learning::LearningStore;
use friday_nlu::NluPipeline;

use crate::executor::CommandExecutor;

/// What the assistant did with one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub entities: Entities,
    pub confidence: ConfidenceScore,
    /// Name of the custom command that ran, if the utterance matched one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_command: Option<String>,
    /// Executor results, one per executed step.
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Whether to keep listening for a follow-up without the wake word.
    pub continue_listening: bool,
}

pub struct Assistant {
    pipeline: NluPipeline,
    context: ConversationContext,
    learning: Arc<LearningStore>,
    executor: Arc<dyn CommandExecutor>,
    mirror_tasks: Mutex<JoinSet<()>>,
}

impl Assistant {
    pub fn new(config: &FridayConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::from_parts(
            NluPipeline::new(&config.nlu),
            ConversationContext::new(&config.conversation),
            Arc::new(LearningStore::new(config.learning_path(), &config.learning)),
            executor,
        )
    }

    pub fn from_parts(
        pipeline: NluPipeline,
        context: ConversationContext,
        learning: Arc<LearningStore>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            pipeline,
            context,
            learning,
            executor,
            mirror_tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn learning(&self) -> &Arc<LearningStore> {
        &self.learning
    }

    /// Process one final transcript.
    ///
    /// Never fails: analysis failures come back as the `error` intent and
    /// executor failures are collected in [`AssistantReply::errors`].
    pub async fn handle_utterance(&self, text: &str) -> AssistantReply {
        let analysis = self.pipeline.process(text);
        self.context
            .update(text, analysis.intent, analysis.entities.clone());

        let mut output = Vec::new();
        let mut errors = Vec::new();

        // Served from the store's snapshot; never waits on a learning write.
        let command_name = text.trim().to_lowercase();
        let custom = if command_name.is_empty() {
            None
        } else {
            self.learning.custom_command(&command_name).await
        };

        match &custom {
            Some(command) => {
                tracing::info!(name = %command_name, steps = command.actions.len(), "Running custom command");
                for action in &command.actions {
                    match self.executor.run_action(action).await {
                        Ok(out) => output.push(out),
                        Err(e) => {
                            tracing::warn!(action = %action.name, error = %e, "Custom command step failed");
                            errors.push(e.to_string());
                        }
                    }
                }
            }
            None => {
                match self
                    .executor
                    .execute(analysis.intent, &analysis.entities, analysis.confidence)
                    .await
                {
                    Ok(out) => output.push(out),
                    Err(e) => {
                        tracing::warn!(intent = %analysis.intent, error = %e, "Execution failed");
                        errors.push(e.to_string());
                    }
                }
            }
        }

        self.spawn_learning_mirror(text, analysis.intent, &analysis.entities, analysis.confidence)
            .await;

        AssistantReply {
            intent: analysis.intent,
            entities: analysis.entities,
            confidence: analysis.confidence,
            custom_command: custom.map(|_| command_name),
            output,
            errors,
            continue_listening: self.context.should_continue(),
        }
    }

    /// Wait for every spawned learning write to finish.
    pub async fn flush_learning(&self) {
        let mut tasks = self.mirror_tasks.lock().await;
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "Learning mirror task failed");
            }
        }
    }

    async fn spawn_learning_mirror(
        &self,
        text: &str,
        intent: Intent,
        entities: &Entities,
        confidence: ConfidenceScore,
    ) {
        let store = Arc::clone(&self.learning);
        let text = text.to_string();
        let last_app = match intent {
            Intent::AppControl => entities.nouns.first().cloned(),
            _ => None,
        };

        let mut tasks = self.mirror_tasks.lock().await;
        // Reap finished tasks so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if intent != Intent::Error {
                store.record_example(intent, &text).await;
            }
            store.record_interaction(&text, intent, confidence).await;
            if let Some(app) = last_app {
                store
                    .update_preference("last_app", serde_json::Value::String(app))
                    .await;
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
