//! Decomposition patterns and the matcher.
//!
//! A decomposition pattern splits a phrase into one segment per element:
//!
//! ```text
//! pattern: [ 0 ,  YOUR ,  0 , (/FAMILY) , 0 ]
//! phrase:  WELL YOUR OLD MOTHER(/FAMILY) IS KIND
//! result:  [WELL] [YOUR] [OLD] [MOTHER] [IS KIND]
//! ```
//!
//! - A word element consumes exactly one matching token.
//! - An alternative set consumes one token matching any member.
//! - `n > 0` consumes exactly `n` tokens.
//! - `0` consumes as few tokens as possible such that the rest of the pattern
//!   still matches, except when it is the last element, where it takes the
//!   whole remainder.
//!
//! ## Invariants
//!
//! - A successful decomposition has exactly one segment per element and the
//!   segments concatenate back into the input phrase.
//! - Within a run of consecutive count elements at most one is `0`. Two
//!   wildcards side by side would make the split ambiguous, so such patterns
//!   are rejected by [`DecompositionRule::new`].
//!
//! ## Complexity
//!
//! The search is a depth-first walk over `(element, cursor)` states. States
//! proven to fail are remembered for the duration of one call, so no state is
//! explored twice and a pathological pattern costs at most
//! O(elements × tokens²) instead of exponential backtracking.

use crate::error::PatternError;
use crate::{Phrase, Word};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// One element of a decomposition pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    /// Match one token by text or tag.
    Word(Word),
    /// Match one token against any member of the set.
    AnyOf(BTreeSet<Word>),
    /// `0`: any number of tokens; `n`: exactly `n` tokens.
    Count(usize),
}

impl PatternElement {
    pub fn word(literal: &str) -> Self {
        PatternElement::Word(Word::new(literal))
    }

    pub fn tag(tag: &str) -> Self {
        PatternElement::Word(Word::tagged([tag]))
    }

    pub fn any_of<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        PatternElement::AnyOf(words.into_iter().map(Into::into).collect())
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, PatternElement::Count(0))
    }
}

impl From<usize> for PatternElement {
    fn from(count: usize) -> Self {
        PatternElement::Count(count)
    }
}

impl From<&str> for PatternElement {
    fn from(literal: &str) -> Self {
        PatternElement::word(literal)
    }
}

impl From<Word> for PatternElement {
    fn from(word: Word) -> Self {
        PatternElement::Word(word)
    }
}

impl fmt::Display for PatternElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternElement::Word(w) => write!(f, "{w}"),
            PatternElement::AnyOf(set) => {
                let members: Vec<String> = set.iter().map(Word::to_string).collect();
                write!(f, "(* {})", members.join(" "))
            }
            PatternElement::Count(n) => write!(f, "{n}"),
        }
    }
}

/// The segments produced by a successful decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    segments: Vec<Vec<Word>>,
}

impl Decomposition {
    pub fn segments(&self) -> &[Vec<Word>] {
        &self.segments
    }

    /// The `index`-th segment, counting from 1 as script back-references do.
    pub fn segment(&self, index: usize) -> Option<&[Word]> {
        index.checked_sub(1).and_then(|i| self.segments.get(i)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments joined back together, in order.
    pub fn flatten(&self) -> Phrase {
        self.segments.iter().flatten().cloned().collect()
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.segments.iter().map(|s| s.iter().map(Word::to_string).collect::<Vec<_>>().join(" ")).collect();
        f.write_str(&parts.join(" | "))
    }
}

/// A validated decomposition pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompositionRule {
    pattern: Vec<PatternElement>,
}

impl DecompositionRule {
    /// Validate `pattern` and build a rule from it.
    pub fn new(pattern: Vec<PatternElement>) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        // Number of `0`s in the current run of count elements.
        let mut wildcards_in_run = 0;
        for (position, element) in pattern.iter().enumerate() {
            match element {
                PatternElement::Count(n) => {
                    if *n == 0 {
                        wildcards_in_run += 1;
                        if wildcards_in_run > 1 {
                            return Err(PatternError::AmbiguousWildcards { position });
                        }
                    }
                }
                PatternElement::Word(word) => {
                    wildcards_in_run = 0;
                    if word.is_blank() {
                        return Err(PatternError::BlankWord { position });
                    }
                }
                PatternElement::AnyOf(set) => {
                    wildcards_in_run = 0;
                    if set.is_empty() {
                        return Err(PatternError::EmptyAlternatives { position });
                    }
                    if set.iter().any(Word::is_blank) {
                        return Err(PatternError::BlankWord { position });
                    }
                }
            }
        }

        Ok(DecompositionRule { pattern })
    }

    pub fn pattern(&self) -> &[PatternElement] {
        &self.pattern
    }

    /// Number of elements, which is also the number of segments on success.
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Split `phrase` according to the pattern, or `None` when it does not fit.
    pub fn decompose(&self, phrase: &Phrase) -> Option<Decomposition> {
        let words = phrase.words();
        let mut matcher = Matcher { pattern: &self.pattern, words, dead: HashSet::new() };
        let mut spans = matcher.spans_from(0, 0)?;
        // Spans are collected back to front while the recursion unwinds.
        spans.reverse();

        let decomposition = Decomposition { segments: spans.into_iter().map(|span| words[span].to_vec()).collect() };
        debug!(pattern = %self, %decomposition, "decomposed phrase");
        Some(decomposition)
    }
}

impl fmt::Display for DecompositionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.pattern.iter().map(PatternElement::to_string).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Search state for a single `decompose` call.
struct Matcher<'a> {
    pattern: &'a [PatternElement],
    words: &'a [Word],
    /// `(element, cursor)` states known not to lead to a full match.
    dead: HashSet<(usize, usize)>,
}

impl Matcher<'_> {
    /// Match `pattern[idx..]` against `words[pos..]`. On success the spans of
    /// those elements are returned in reverse order.
    fn spans_from(&mut self, idx: usize, pos: usize) -> Option<Vec<Range<usize>>> {
        let end = self.words.len();
        let Some(element) = self.pattern.get(idx) else {
            return (pos == end).then(Vec::new);
        };
        if self.dead.contains(&(idx, pos)) {
            return None;
        }

        let is_last = idx + 1 == self.pattern.len();
        let found = match element {
            PatternElement::Count(0) if is_last => Some(vec![pos..end]),
            PatternElement::Count(0) => self.shortest_wildcard(idx, pos),
            PatternElement::Count(n) => {
                if pos + n <= end {
                    self.then(idx, pos, pos + n)
                } else {
                    None
                }
            }
            PatternElement::Word(test) => match self.words.get(pos) {
                Some(word) if word.matches(test) => self.then(idx, pos, pos + 1),
                _ => None,
            },
            PatternElement::AnyOf(tests) => match self.words.get(pos) {
                Some(word) if word.matches_any(tests) => self.then(idx, pos, pos + 1),
                _ => None,
            },
        };

        if found.is_none() {
            self.dead.insert((idx, pos));
        }
        found
    }

    /// Non-greedy `0`: the first split point where the remainder matches wins.
    fn shortest_wildcard(&mut self, idx: usize, pos: usize) -> Option<Vec<Range<usize>>> {
        debug_assert!(self.pattern[idx].is_wildcard());
        for stop in pos..=self.words.len() {
            if let Some(spans) = self.then(idx, pos, stop) {
                return Some(spans);
            }
        }
        None
    }

    /// Element `idx` took `start..stop`; match the rest from `stop`.
    fn then(&mut self, idx: usize, start: usize, stop: usize) -> Option<Vec<Range<usize>>> {
        let mut spans = self.spans_from(idx + 1, stop)?;
        spans.push(start..stop);
        Some(spans)
    }
}
