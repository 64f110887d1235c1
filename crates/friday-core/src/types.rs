use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FridayError;

/// Wall-clock timestamp used throughout Friday.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Enums
// =============================================================================

/// Closed set of intent labels an utterance can be classified as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    Email,
    AppControl,
    Settings,
    GeneralCommand,
    /// Sentinel for analysis failure. Always scored 0.0.
    Error,
}

impl Intent {
    /// Every intent label, in declaration order.
    pub const ALL: [Intent; 6] = [
        Intent::Search,
        Intent::Email,
        Intent::AppControl,
        Intent::Settings,
        Intent::GeneralCommand,
        Intent::Error,
    ];

    /// Wire label for this intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Search => "search",
            Intent::Email => "email",
            Intent::AppControl => "app_control",
            Intent::Settings => "settings",
            Intent::GeneralCommand => "general_command",
            Intent::Error => "error",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = FridayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| FridayError::UnknownIntent(s.to_string()))
    }
}

/// Coarse part-of-speech class assigned by the token analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosClass {
    Verb,
    Noun,
    Adjective,
    Other,
}

impl fmt::Display for PosClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosClass::Verb => write!(f, "VERB"),
            PosClass::Noun => write!(f, "NOUN"),
            PosClass::Adjective => write!(f, "ADJECTIVE"),
            PosClass::Other => write!(f, "OTHER"),
        }
    }
}

/// Named entity bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityBucket {
    Nouns,
    Verbs,
    Adjectives,
    Targets,
}

impl EntityBucket {
    /// The bucket a token of the given class lands in, if any.
    pub fn for_pos(pos: PosClass) -> Option<EntityBucket> {
        match pos {
            PosClass::Verb => Some(EntityBucket::Verbs),
            PosClass::Noun => Some(EntityBucket::Nouns),
            PosClass::Adjective => Some(EntityBucket::Adjectives),
            PosClass::Other => None,
        }
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// A single final transcript handed over by the speech-to-text provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub received_at: Timestamp,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// One token with its coarse part-of-speech class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub surface: String,
    pub pos: PosClass,
}

impl TaggedToken {
    pub fn new(surface: impl Into<String>, pos: PosClass) -> Self {
        Self {
            surface: surface.into(),
            pos,
        }
    }
}

/// Words extracted from an utterance, grouped by grammatical role.
///
/// Insertion order is preserved within each bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    pub nouns: Vec<String>,
    pub verbs: Vec<String>,
    pub adjectives: Vec<String>,
    pub targets: Vec<String>,
}

impl Entities {
    pub fn push(&mut self, bucket: EntityBucket, word: impl Into<String>) {
        self.bucket_mut(bucket).push(word.into());
    }

    pub fn bucket(&self, bucket: EntityBucket) -> &[String] {
        match bucket {
            EntityBucket::Nouns => &self.nouns,
            EntityBucket::Verbs => &self.verbs,
            EntityBucket::Adjectives => &self.adjectives,
            EntityBucket::Targets => &self.targets,
        }
    }

    fn bucket_mut(&mut self, bucket: EntityBucket) -> &mut Vec<String> {
        match bucket {
            EntityBucket::Nouns => &mut self.nouns,
            EntityBucket::Verbs => &mut self.verbs,
            EntityBucket::Adjectives => &mut self.adjectives,
            EntityBucket::Targets => &mut self.targets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty()
            && self.verbs.is_empty()
            && self.adjectives.is_empty()
            && self.targets.is_empty()
    }
}

/// Confidence in an (intent, entities) pair, always within [0.0, 1.0].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f32);

impl ConfidenceScore {
    pub const ZERO: ConfidenceScore = ConfidenceScore(0.0);

    /// Clamp `value` into range. NaN becomes 0.0.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One committed exchange in the conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub text: String,
    pub intent: Intent,
    pub entities: Entities,
    pub timestamp: Timestamp,
}

/// A single step of a user-defined custom command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
