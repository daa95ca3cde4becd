//! Keyword rules.
//!
//! Every keyword of a script maps to exactly one [`Rule`]. The variants form a
//! closed set and are dispatched in one place, [`Rule::apply_transform`].

use super::reassemble::Reassembled;
use super::transform::{MemoryRule, TransformRule};
use crate::error::PatternError;
use crate::{Phrase, Word};

/// What a keyword does once it is found in the input.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Decomposition/reassembly pairs, tried in order.
    Transformation(Vec<TransformRule>),
    /// Replace the word and do nothing else.
    UnconditionalSubstitution,
    /// Attach these tags to the word (`DLIST(/...)`).
    WordTagging(Vec<String>),
    /// Hand over to the rule of another keyword.
    Equivalence(String),
    /// Capture parts of the input for later recall. Only hand-built rule sets
    /// use this; parsed scripts keep memories in `RuleSet::memories`.
    Memory(MemoryRule),
}

#[derive(Debug, Clone)]
pub struct Rule {
    precedence: u32,
    substitution: Option<String>,
    kind: RuleKind,
}

impl Rule {
    pub fn transformation(substitution: Option<String>, precedence: u32, transforms: Vec<TransformRule>) -> Self {
        Rule { precedence, substitution, kind: RuleKind::Transformation(transforms) }
    }

    pub fn unconditional(substitution: Option<String>, precedence: u32) -> Result<Self, PatternError> {
        match substitution {
            Some(sub) if !sub.is_empty() => {
                Ok(Rule { precedence, substitution: Some(sub), kind: RuleKind::UnconditionalSubstitution })
            }
            _ => Err(PatternError::MissingSubstitution),
        }
    }

    pub fn word_tagging(substitution: Option<String>, precedence: u32, tags: Vec<String>) -> Result<Self, PatternError> {
        if tags.is_empty() || tags.iter().any(String::is_empty) {
            return Err(PatternError::EmptyTagList);
        }
        Ok(Rule { precedence, substitution, kind: RuleKind::WordTagging(tags) })
    }

    pub fn equivalence(
        substitution: Option<String>,
        precedence: u32,
        keyword: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let keyword = keyword.into();
        if keyword.is_empty() {
            return Err(PatternError::MissingEquivalent);
        }
        Ok(Rule { precedence, substitution, kind: RuleKind::Equivalence(keyword) })
    }

    /// A memory rule placed on a keyword. Parsed scripts never build this.
    pub fn memory(precedence: u32, memory: MemoryRule) -> Self {
        Rule { precedence, substitution: None, kind: RuleKind::Memory(memory) }
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn substitution(&self) -> Option<&str> {
        self.substitution.as_deref()
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            RuleKind::Transformation(_) => "transformation",
            RuleKind::UnconditionalSubstitution => "substitution",
            RuleKind::WordTagging(_) => "tagging",
            RuleKind::Equivalence(_) => "equivalence",
            RuleKind::Memory(_) => "memory",
        }
    }

    /// Replace the word's text with the rule's substitution, if it has one.
    pub fn apply_substitution(&self, word: &mut Word) -> bool {
        match &self.substitution {
            Some(sub) => {
                word.set_literal(sub);
                true
            }
            None => false,
        }
    }

    /// Tag the word if this is a tagging rule.
    pub fn apply_tags(&self, word: &mut Word) -> bool {
        match &self.kind {
            RuleKind::WordTagging(tags) => {
                word.set_tags(tags);
                true
            }
            _ => false,
        }
    }

    /// Apply this rule to the current phrase on behalf of `keyword`.
    ///
    /// A transformation whose patterns all fail, and every rule that does not
    /// transform, hands the phrase back untouched with no link.
    pub fn apply_transform(&mut self, keyword: &Word, phrase: Phrase) -> Reassembled {
        match &mut self.kind {
            RuleKind::Transformation(transforms) => {
                for transform in transforms.iter_mut() {
                    if let Some(out) = transform.apply(&phrase) {
                        return out;
                    }
                }
                tracing::debug!(%keyword, "no decomposition matched");
                Reassembled { link: None, phrase }
            }
            RuleKind::Equivalence(target) => Reassembled { link: Some(target.clone()), phrase },
            RuleKind::UnconditionalSubstitution | RuleKind::WordTagging(_) | RuleKind::Memory(_) => {
                Reassembled { link: None, phrase }
            }
        }
    }
}
