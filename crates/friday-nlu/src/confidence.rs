//! Confidence scoring for an (intent, entities) pair.

use friday_core::types::{ConfidenceScore, Entities, Intent};

/// Additive confidence model, weighted in percentage points.
///
/// `error` scores 0.0. Otherwise the base score is raised by a fixed bonus
/// for a specific intent and for each non-empty noun, verb and target
/// bucket, capped at 100 and divided once, so 90 points is exactly `0.9`.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    pub base: u32,
    pub intent_bonus: u32,
    pub bucket_bonus: u32,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            base: 50,
            intent_bonus: 20,
            bucket_bonus: 10,
        }
    }
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, intent: Intent, entities: &Entities) -> ConfidenceScore {
        if intent == Intent::Error {
            return ConfidenceScore::ZERO;
        }

        let mut points = self.base;
        if intent != Intent::GeneralCommand {
            points = points.saturating_add(self.intent_bonus);
        }
        for bucket in [&entities.nouns, &entities.verbs, &entities.targets] {
            if !bucket.is_empty() {
                points = points.saturating_add(self.bucket_bonus);
            }
        }

        ConfidenceScore::new(points.min(100) as f32 / 100.0)
    }
}
