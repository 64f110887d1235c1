//! Tokenization and coarse part-of-speech tagging.
//!
//! Lower-cases the transcript, splits it on whitespace and punctuation and
//! assigns each token a [`PosClass`] from a fixed lexicon, falling back to
//! suffix heuristics and finally to `NOUN`. No state is kept between calls.

use regex::Regex;
use std::sync::LazyLock;

use friday_core::types::{PosClass, TaggedToken};

use crate::error::NluError;

// =============================================================================
// Lexicon (compiled once, reused across calls)
// =============================================================================

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:'\p{L}+)*").expect("Invalid token regex"));

static VERBS: &[&str] = &[
    // Intent keywords
    "search", "find", "look", "send", "write", "email", "open", "start", "launch",
    "set", "change", "update",
    // Other imperative verbs
    "close", "quit", "exit", "stop", "play", "pause", "resume", "show", "tell",
    "get", "create", "delete", "remove", "add", "remind", "remember", "forget",
    "call", "turn", "check", "run", "go", "make", "take", "read", "mute",
    "unmute", "increase", "decrease", "lower", "raise", "schedule", "browse",
    "compose", "reply", "forward", "restart", "shut", "lock", "unlock", "switch",
    "enable", "disable", "adjust", "modify", "configure", "say", "give", "help",
    "want", "need", "like", "know", "see", "listen", "move", "put", "save",
    "copy", "paste", "type", "list", "navigate", "visit", "download", "install",
    "record", "capture", "dim", "brighten", "minimize", "maximize", "hide",
];

static ADJECTIVES: &[&str] = &[
    "new", "old", "big", "small", "large", "loud", "quiet", "bright", "dark",
    "fast", "slow", "high", "low", "good", "bad", "great", "latest", "recent",
    "next", "last", "previous", "first", "full", "empty", "hot", "cold", "warm",
    "red", "blue", "green", "black", "white", "urgent", "quick", "short", "long",
    "current", "default", "main", "whole", "private", "public", "favorite",
];

// Determiners, pronouns, prepositions, conjunctions, auxiliaries, particles.
static FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "our",
    "his", "her", "its", "their", "i", "me", "you", "we", "us", "he", "she",
    "it", "they", "them", "to", "for", "with", "on", "off", "in", "at", "from",
    "by", "about", "of", "into", "up", "down", "out", "over", "and", "or",
    "but", "if", "then", "so", "is", "are", "was", "were", "be", "been", "am",
    "do", "does", "did", "have", "has", "had", "will", "would", "can", "could",
    "should", "shall", "may", "might", "must", "what", "who", "whom", "which",
    "where", "when", "why", "how", "please", "now", "not", "no", "yes", "just",
    "also", "very", "too", "here", "there", "again", "all", "some", "any",
    "hey", "hi", "hello", "ok", "okay", "thanks", "don't", "can't", "i'm",
    "it's", "what's",
];

// Nouns the suffix heuristics would otherwise mis-tag.
static NOUNS: &[&str] = &[
    "family", "assembly", "supply", "archive", "variable", "timetable",
    "butterfly", "july", "italy", "spotify", "shopify",
];

static ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "less", "ive", "able", "ible"];
static VERB_SUFFIXES: &[&str] = &["ize", "ise", "ify"];

// =============================================================================
// TokenAnalyzer
// =============================================================================

/// Stateless lexical tokenizer and tagger.
#[derive(Debug, Clone)]
pub struct TokenAnalyzer {
    max_chars: usize,
}

impl TokenAnalyzer {
    /// Create an analyzer that rejects transcripts longer than `max_chars`.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Tokenize and tag `text`.
    ///
    /// Empty or whitespace-only input yields an empty sequence. Overlong
    /// input, NUL/control characters and U+FFFD replacement characters (a
    /// sign of lossy transcoding upstream) are reported as errors.
    pub fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>, NluError> {
        self.check_input(text)?;

        let lowered = text.to_lowercase().replace('\u{2019}', "'");
        let tokens = TOKEN_RE
            .find_iter(&lowered)
            .map(|m| {
                let surface = m.as_str();
                TaggedToken::new(surface, Self::tag(surface))
            })
            .collect();
        Ok(tokens)
    }

    fn check_input(&self, text: &str) -> Result<(), NluError> {
        let mut count = 0usize;
        for c in text.chars() {
            count += 1;
            if count > self.max_chars {
                return Err(NluError::TooLong(self.max_chars));
            }
            if c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()) {
                return Err(NluError::UnexpectedCharacter(c as u32));
            }
        }
        Ok(())
    }

    /// Assign a coarse class to a single lower-case word.
    pub fn tag(word: &str) -> PosClass {
        if word.chars().all(|c| c.is_numeric()) {
            return PosClass::Other;
        }
        if FUNCTION_WORDS.contains(&word) {
            return PosClass::Other;
        }
        if VERBS.contains(&word) {
            return PosClass::Verb;
        }
        if ADJECTIVES.contains(&word) {
            return PosClass::Adjective;
        }
        if NOUNS.contains(&word) {
            return PosClass::Noun;
        }

        let len = word.chars().count();
        if len > 4 && word.ends_with("ly") {
            return PosClass::Other;
        }
        if len >= 6 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return PosClass::Adjective;
        }
        if len >= 5 && VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return PosClass::Verb;
        }
        PosClass::Noun
    }
}

impl Default for TokenAnalyzer {
    fn default() -> Self {
        Self::new(2000)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<TaggedToken> {
        TokenAnalyzer::default().analyze(text).unwrap()
    }

    fn surfaces(tokens: &[TaggedToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    // ---- Tokenization ----

    #[test]
    fn test_open_terminal() {
        let tokens = analyze("open terminal");
        assert_eq!(
            tokens,
            vec![
                TaggedToken::new("open", PosClass::Verb),
                TaggedToken::new("terminal", PosClass::Noun),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(analyze("").is_empty());
    }

    #[test]
    fn test_whitespace_only_yields_no_tokens() {
        assert!(analyze("   \t\n  ").is_empty());
    }

    #[test]
    fn test_input_is_lower_cased() {
        let tokens = analyze("OPEN Safari");
        assert_eq!(surfaces(&tokens), vec!["open", "safari"]);
        assert_eq!(tokens[0].pos, PosClass::Verb);
    }

    #[test]
    fn test_splits_on_punctuation() {
        let tokens = analyze("search: cats, dogs & birds!");
        assert_eq!(surfaces(&tokens), vec!["search", "cats", "dogs", "birds"]);
    }

    #[test]
    fn test_keeps_contractions_together() {
        let tokens = analyze("don't stop");
        assert_eq!(surfaces(&tokens), vec!["don't", "stop"]);
        assert_eq!(tokens[0].pos, PosClass::Other);
        assert_eq!(tokens[1].pos, PosClass::Verb);
    }

    #[test]
    fn test_curly_apostrophe_normalized() {
        let tokens = analyze("what\u{2019}s new");
        assert_eq!(surfaces(&tokens), vec!["what's", "new"]);
    }

    #[test]
    fn test_unicode_letters_kept() {
        let tokens = analyze("find café");
        assert_eq!(surfaces(&tokens), vec!["find", "café"]);
    }

    // ---- Tagging ----

    #[test]
    fn test_tag_lexicon_classes() {
        assert_eq!(TokenAnalyzer::tag("launch"), PosClass::Verb);
        assert_eq!(TokenAnalyzer::tag("bright"), PosClass::Adjective);
        assert_eq!(TokenAnalyzer::tag("the"), PosClass::Other);
        assert_eq!(TokenAnalyzer::tag("is"), PosClass::Other);
        assert_eq!(TokenAnalyzer::tag("calendar"), PosClass::Noun);
    }

    #[test]
    fn test_tag_numbers_are_other() {
        assert_eq!(TokenAnalyzer::tag("50"), PosClass::Other);
    }

    #[test]
    fn test_tag_suffix_heuristics() {
        assert_eq!(TokenAnalyzer::tag("quickly"), PosClass::Other);
        assert_eq!(TokenAnalyzer::tag("wonderful"), PosClass::Adjective);
        assert_eq!(TokenAnalyzer::tag("organize"), PosClass::Verb);
        assert_eq!(TokenAnalyzer::tag("family"), PosClass::Noun);
        assert_eq!(TokenAnalyzer::tag("archive"), PosClass::Noun);
    }

    #[test]
    fn test_tag_unknown_word_defaults_to_noun() {
        assert_eq!(TokenAnalyzer::tag("xcode"), PosClass::Noun);
        assert_eq!(TokenAnalyzer::tag("spotify"), PosClass::Noun);
    }

    // ---- Failures ----

    #[test]
    fn test_rejects_nul_character() {
        let err = TokenAnalyzer::default().analyze("open\0terminal").unwrap_err();
        assert_eq!(err, NluError::UnexpectedCharacter(0));
    }

    #[test]
    fn test_rejects_replacement_character() {
        let err = TokenAnalyzer::default().analyze("open \u{FFFD}").unwrap_err();
        assert_eq!(err, NluError::UnexpectedCharacter(0xFFFD));
    }

    #[test]
    fn test_rejects_overlong_input() {
        let analyzer = TokenAnalyzer::new(5);
        assert_eq!(analyzer.analyze("abcdef"), Err(NluError::TooLong(5)));
        assert!(analyzer.analyze("abcde").is_ok());
    }

    #[test]
    fn test_analyze_is_stateless() {
        let analyzer = TokenAnalyzer::default();
        let first = analyzer.analyze("set volume to 50").unwrap();
        let second = analyzer.analyze("set volume to 50").unwrap();
        assert_eq!(first, second);
    }
}
