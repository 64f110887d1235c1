//! Analyzer -> extractor/classifier -> scorer pipeline.
//!
//! [`NluPipeline::process`] is total: every failure is logged and turned
//! into the `error` intent with empty entities and zero confidence, so the
//! caller always receives a well-formed triple.

use friday_core::config::NluConfig;
use friday_core::types::{ConfidenceScore, Entities, Intent, TaggedToken, Utterance};

use crate::analyzer::TokenAnalyzer;
use crate::confidence::ConfidenceScorer;
use crate::entity::EntityExtractor;
use crate::error::NluError;
use crate::intent::{IntentClassifier, IntentTrigger};

/// Outcome of analysing one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub intent: Intent,
    pub entities: Entities,
    pub confidence: ConfidenceScore,
    pub tokens: Vec<TaggedToken>,
    /// Why the intent was chosen; `None` when analysis failed.
    pub trigger: Option<IntentTrigger>,
    /// Set when the analysis fell back to the `error` intent.
    pub failure: Option<NluError>,
}

impl Analysis {
    /// The fallback triple for a failed analysis.
    pub fn failed(err: NluError) -> Self {
        Self {
            intent: Intent::Error,
            entities: Entities::default(),
            confidence: ConfidenceScore::ZERO,
            tokens: Vec::new(),
            trigger: None,
            failure: Some(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Runs the full analysis chain for each utterance.
#[derive(Debug, Clone)]
pub struct NluPipeline {
    analyzer: TokenAnalyzer,
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    scorer: ConfidenceScorer,
}

impl Default for NluPipeline {
    fn default() -> Self {
        Self::new(&NluConfig::default())
    }
}

impl NluPipeline {
    pub fn new(config: &NluConfig) -> Self {
        Self {
            analyzer: TokenAnalyzer::new(config.max_utterance_chars),
            extractor: EntityExtractor::new(),
            classifier: IntentClassifier::new(),
            scorer: ConfidenceScorer::new(),
        }
    }

    /// Analyse `text`, surfacing tokenizer failures as errors.
    pub fn analyze(&self, text: &str) -> Result<Analysis, NluError> {
        let tokens = self.analyzer.analyze(text)?;

        // Both stages are pure functions over the same token slice.
        let entities = self.extractor.extract(&tokens);
        let matched = self.classifier.classify_detailed(&tokens);
        let confidence = self.scorer.score(matched.intent, &entities);

        tracing::debug!(
            intent = %matched.intent,
            confidence = %confidence,
            tokens = tokens.len(),
            "Utterance analysed"
        );

        Ok(Analysis {
            intent: matched.intent,
            entities,
            confidence,
            tokens,
            trigger: Some(matched.trigger),
            failure: None,
        })
    }

    /// Analyse `text`, degrading any failure to the `error` intent.
    pub fn process(&self, text: &str) -> Analysis {
        self.analyze(text).unwrap_or_else(Self::fallback)
    }

    /// Analyse a raw transcript that may not be valid UTF-8.
    pub fn process_bytes(&self, bytes: &[u8]) -> Analysis {
        std::str::from_utf8(bytes)
            .map_err(|e| NluError::InvalidEncoding(e.to_string()))
            .and_then(|text| self.analyze(text))
            .unwrap_or_else(Self::fallback)
    }

    pub fn process_utterance(&self, utterance: &Utterance) -> Analysis {
        self.process(&utterance.text)
    }

    fn fallback(err: NluError) -> Analysis {
        tracing::warn!(error = %err, "Utterance analysis failed; falling back to error intent");
        Analysis::failed(err)
    }
}
