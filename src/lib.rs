//! A script-driven ELIZA engine.
//!
//! A script (the classic 1966 DOCTOR script is bundled) is parsed into a
//! [`RuleSet`]: keyword-indexed rules that decompose the user's phrase with
//! wildcard patterns and reassemble it into a reply.
//!
//! ```
//! use eliza::Eliza;
//!
//! let mut eliza = Eliza::doctor();
//! let reply = eliza.respond_to("Men are all alike.");
//! assert_eq!(reply, "IN WHAT WAY\n");
//! ```

extern crate self as eliza;

use std::collections::BTreeSet;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod script;

pub use api::{Eliza, Options, Response, StepSummary, TurnDetails, DOCTOR_SCRIPT};
pub use engine::{
    Decomposition, DecompositionRule, KeyStack, KeyStackEntry, MemoryRule, PatternElement, Reassembled,
    ReassemblyPart, ReassemblyRule, Rule, RuleKind, RuleSet, StepMetrics, TransformRule, TurnFlags, TurnMetrics,
    TurnResult, finalize, normalize_input, MAX_LINK_HOPS, MEMORY_KEYWORD, NONE_KEYWORD,
};
pub use error::{PatternError, ScriptError};
pub use script::{parse_decomposition, parse_reassembly, parse_script};

// --- Word -------------------------------------------------------------------

/// A token of a phrase, or a single-token test inside a decomposition pattern.
///
/// Words coming from user input always carry literal text. Pattern words may
/// be tag-only (`(/FAMILY)` in script syntax), in which case they match any
/// phrase word that carries one of the tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word {
    literal: Option<String>,
    tags: BTreeSet<String>,
}

impl Word {
    /// A word with literal text and no tags.
    pub fn new(literal: impl Into<String>) -> Self {
        Word { literal: Some(literal.into()), tags: BTreeSet::new() }
    }

    /// A tag-only word (no literal text).
    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Word { literal: None, tags: tags.into_iter().map(Into::into).collect() }
    }

    /// A word with both literal text and tags.
    pub fn with_tags<I, S>(literal: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Word { literal: Some(literal.into()), tags: tags.into_iter().map(Into::into).collect() }
    }

    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// True when this word can not take part in a pattern: empty literal text,
    /// an empty tag, or neither literal nor tags.
    pub fn is_blank(&self) -> bool {
        match &self.literal {
            Some(text) if text.is_empty() => true,
            None if self.tags.is_empty() => true,
            _ => self.tags.iter().any(|t| t.is_empty()),
        }
    }

    /// True when the literal texts are equal or the tag sets intersect.
    pub fn matches(&self, test: &Word) -> bool {
        let same_text = matches!((&self.literal, &test.literal), (Some(a), Some(b)) if a == b);
        same_text || !self.tags.is_disjoint(&test.tags)
    }

    /// True when any of `tests` matches.
    pub fn matches_any<'a>(&self, tests: impl IntoIterator<Item = &'a Word>) -> bool {
        tests.into_iter().any(|t| self.matches(t))
    }

    pub(crate) fn set_literal(&mut self, literal: &str) {
        self.literal = Some(literal.to_string());
    }

    pub(crate) fn set_tags(&mut self, tags: &[String]) {
        self.tags = tags.iter().cloned().collect();
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.literal.as_deref().unwrap_or("_");
        if self.tags.is_empty() {
            return f.write_str(text);
        }
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        write!(f, "{}(/{})", text, tags.join(" "))
    }
}

impl From<&str> for Word {
    fn from(literal: &str) -> Self {
        Word::new(literal)
    }
}

// --- Phrase -----------------------------------------------------------------

/// An ordered sequence of words.
///
/// A phrase owns its words. Rule application mutates words only through
/// [`Phrase::word_mut`] by position, never through shared references, so a
/// substitution can not leak into another phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Phrase {
    words: Vec<Word>,
}

impl Phrase {
    /// Build a phrase by splitting `text` on whitespace.
    pub fn parse(text: &str) -> Self {
        Phrase { words: text.split_whitespace().map(Word::new).collect() }
    }

    pub fn from_words(words: Vec<Word>) -> Self {
        Phrase { words }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    pub(crate) fn word_mut(&mut self, index: usize) -> Option<&mut Word> {
        self.words.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    /// Join the literal texts with single spaces.
    pub fn render(&self) -> String {
        self.words.iter().filter_map(Word::literal).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Vec<Word>> for Phrase {
    fn from(words: Vec<Word>) -> Self {
        Phrase { words }
    }
}

impl FromIterator<Word> for Phrase {
    fn from_iter<T: IntoIterator<Item = Word>>(iter: T) -> Self {
        Phrase { words: iter.into_iter().collect() }
    }
}

impl std::ops::Index<usize> for Phrase {
    type Output = Word;

    fn index(&self, index: usize) -> &Word {
        &self.words[index]
    }
}

impl<'a> IntoIterator for &'a Phrase {
    type Item = &'a Word;
    type IntoIter = std::slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

impl IntoIterator for Phrase {
    type Item = Word;
    type IntoIter = std::vec::IntoIter<Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.into_iter()
    }
}
