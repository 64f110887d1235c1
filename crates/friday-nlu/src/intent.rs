//! Ordered keyword rules mapping the leading verb to an intent.
//!
//! Rules are evaluated in table order and the first match wins. The order
//! is part of the classifier's contract and must not be re-sorted.

use friday_core::types::{Intent, PosClass, TaggedToken};

/// Verbs that introduce a `set X to Y` style settings command.
pub const SETTINGS_KEYWORDS: &[&str] = &["set", "change", "update"];

/// A keyword set linked to the intent it selects.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub keywords: &'static [&'static str],
    pub intent: Intent,
}

/// The rule table, in evaluation order.
pub const INTENT_RULES: [IntentRule; 4] = [
    IntentRule {
        keywords: &["search", "find", "look"],
        intent: Intent::Search,
    },
    IntentRule {
        keywords: &["send", "write", "email"],
        intent: Intent::Email,
    },
    IntentRule {
        keywords: &["open", "start", "launch"],
        intent: Intent::AppControl,
    },
    IntentRule {
        keywords: SETTINGS_KEYWORDS,
        intent: Intent::Settings,
    },
];

/// Why the classifier picked its intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentTrigger {
    /// The leading verb matched a rule keyword.
    Keyword(String),
    /// The utterance had a verb, but no rule lists it.
    UnlistedVerb(String),
    /// No token was tagged as a verb.
    NoVerb,
}

/// Classification result with the reason attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMatch {
    pub intent: Intent,
    pub trigger: IntentTrigger,
}

/// Rule-based intent classifier.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            rules: INTENT_RULES.to_vec(),
        }
    }

    /// Classify the tagged tokens of one utterance.
    pub fn classify(&self, tokens: &[TaggedToken]) -> Intent {
        self.classify_detailed(tokens).intent
    }

    /// Classify and report which verb (if any) decided the outcome.
    ///
    /// Only the first VERB token is inspected. Without a verb the result is
    /// `general_command`.
    pub fn classify_detailed(&self, tokens: &[TaggedToken]) -> IntentMatch {
        let Some(verb) = tokens.iter().find(|t| t.pos == PosClass::Verb) else {
            return IntentMatch {
                intent: Intent::GeneralCommand,
                trigger: IntentTrigger::NoVerb,
            };
        };

        let surface = verb.surface.as_str();
        for rule in &self.rules {
            if rule.keywords.contains(&surface) {
                return IntentMatch {
                    intent: rule.intent,
                    trigger: IntentTrigger::Keyword(verb.surface.clone()),
                };
            }
        }

        IntentMatch {
            intent: Intent::GeneralCommand,
            trigger: IntentTrigger::UnlistedVerb(verb.surface.clone()),
        }
    }
}
