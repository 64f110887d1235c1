//! Durable learning record.
//!
//! The top-level keys (`custom_commands`, `learned_patterns`,
//! `user_preferences`, `interaction_history`, `last_updated`) are the on-disk
//! schema and must stay stable across releases.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use friday_core::types::{Action, ConfidenceScore, Intent, Timestamp};

/// Everything the assistant has learned about its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    #[serde(default)]
    pub custom_commands: BTreeMap<String, CustomCommand>,
    /// Keyed by intent wire label.
    #[serde(default)]
    pub learned_patterns: BTreeMap<String, LearnedPattern>,
    #[serde(default)]
    pub user_preferences: BTreeMap<String, Preference>,
    #[serde(default)]
    pub interaction_history: Vec<InteractionRecord>,
    pub last_updated: Timestamp,
}

impl Default for LearningRecord {
    fn default() -> Self {
        Self {
            custom_commands: BTreeMap::new(),
            learned_patterns: BTreeMap::new(),
            user_preferences: BTreeMap::new(),
            interaction_history: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl LearningRecord {
    pub fn examples_for(&self, intent: Intent) -> &[String] {
        self.learned_patterns
            .get(intent.as_str())
            .map(|p| p.examples.as_slice())
            .unwrap_or(&[])
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Keep only the newest `limit` interactions.
    pub fn trim_history(&mut self, limit: usize) {
        let len = self.interaction_history.len();
        if len > limit {
            self.interaction_history.drain(..len - limit);
        }
    }

    /// Layer `newer` on top of this record.
    ///
    /// Examples and interactions are appended; commands and preference values
    /// from `newer` win, with preference frequencies summed.
    pub fn absorb(&mut self, newer: LearningRecord) {
        for (intent, pattern) in newer.learned_patterns {
            self.learned_patterns
                .entry(intent)
                .or_default()
                .examples
                .extend(pattern.examples);
        }
        self.custom_commands.extend(newer.custom_commands);
        for (key, pref) in newer.user_preferences {
            let frequency = self
                .user_preferences
                .get(&key)
                .map_or(0, |old| old.frequency);
            self.user_preferences.insert(
                key,
                Preference {
                    frequency: frequency + pref.frequency,
                    ..pref
                },
            );
        }
        self.interaction_history.extend(newer.interaction_history);
        self.last_updated = self.last_updated.max(newer.last_updated);
    }
}

/// A named, user-defined sequence of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCommand {
    pub actions: Vec<Action>,
    pub created: Timestamp,
}

/// Example utterances recorded for one intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedPattern {
    #[serde(default)]
    pub examples: Vec<String>,
}

/// A remembered user preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub value: serde_json::Value,
    pub last_updated: Timestamp,
    /// Number of times this preference has been set.
    #[serde(default)]
    pub frequency: u64,
}

/// One processed utterance, kept for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub text: String,
    pub intent: Intent,
    pub confidence: ConfidenceScore,
    pub timestamp: Timestamp,
}
