//! Entity extraction from tagged tokens.

use std::ops::Range;

use friday_core::types::{Entities, EntityBucket, PosClass, TaggedToken};

use crate::intent::SETTINGS_KEYWORDS;

/// Groups tagged tokens into noun, verb, adjective and target buckets.
///
/// Each token lands in exactly one bucket, or is dropped when tagged OTHER.
/// Tokens are marked as targets only by the `set X to Y` rule.
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract entities from one utterance's tokens.
    pub fn extract(&self, tokens: &[TaggedToken]) -> Entities {
        let targets = target_span(tokens);
        let mut entities = Entities::default();

        for (i, token) in tokens.iter().enumerate() {
            let Some(bucket) = EntityBucket::for_pos(token.pos) else {
                continue;
            };
            let in_target = targets.as_ref().is_some_and(|span| span.contains(&i));
            if in_target && token.pos != PosClass::Verb {
                entities.push(EntityBucket::Targets, token.surface.clone());
            } else {
                entities.push(bucket, token.surface.clone());
            }
        }

        entities
    }
}

/// Locate `X` in `<settings verb> X to Y`.
///
/// The first verb must be a settings keyword, `to` must follow at least one
/// token later, and a value must follow `to`.
fn target_span(tokens: &[TaggedToken]) -> Option<Range<usize>> {
    let verb_idx = tokens.iter().position(|t| t.pos == PosClass::Verb)?;
    if !SETTINGS_KEYWORDS.contains(&tokens[verb_idx].surface.as_str()) {
        return None;
    }

    let start = verb_idx + 1;
    let to_offset = tokens[start..].iter().position(|t| t.surface == "to")?;
    let end = start + to_offset;

    let has_object = tokens[start..end].iter().any(|t| t.pos != PosClass::Other);
    let has_value = end + 1 < tokens.len();
    (has_object && has_value).then_some(start..end)
}
