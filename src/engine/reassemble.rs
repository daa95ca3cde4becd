//! Reassembly: rebuilding a phrase from decomposition segments.
//!
//! ```text
//! decomposition: [WELL] [YOUR] [BOYFRIEND MADE YOU COME HERE]
//! reassembly:    YOUR 3
//! result:        YOUR BOYFRIEND MADE YOU COME HERE
//! ```
//!
//! A reassembly may also name a *link*: another keyword whose rule is applied
//! next to the rebuilt phrase.

use super::decompose::Decomposition;
use crate::error::PatternError;
use crate::{Phrase, Word};
use std::fmt;

/// One piece of a parts-based reassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyPart {
    /// 1-based reference to a decomposition segment.
    Segment(usize),
    /// Words inserted verbatim.
    Words(Vec<Word>),
}

impl ReassemblyPart {
    /// Literal words from whitespace-separated text.
    pub fn words(text: &str) -> Self {
        ReassemblyPart::Words(text.split_whitespace().map(Word::new).collect())
    }
}

/// How to build the reply phrase from a decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyRule {
    /// Splice segments and literal words, then optionally chain to `link`.
    Parts { parts: Vec<ReassemblyPart>, link: Option<String> },
    /// Pass the whole decomposition through and chain to the named keyword.
    Link(String),
    /// Pass the whole decomposition through without chaining; processing
    /// continues with the next keystack entry.
    NewKey,
}

/// A rebuilt phrase, plus the keyword to chain into, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassembled {
    pub link: Option<String>,
    pub phrase: Phrase,
}

impl ReassemblyRule {
    pub fn parts(parts: Vec<ReassemblyPart>) -> Self {
        ReassemblyRule::Parts { parts, link: None }
    }

    pub fn parts_then(parts: Vec<ReassemblyPart>, link: impl Into<String>) -> Self {
        ReassemblyRule::Parts { parts, link: Some(link.into()) }
    }

    pub fn link(keyword: impl Into<String>) -> Self {
        ReassemblyRule::Link(keyword.into())
    }

    /// Check that every back-reference points into a decomposition of
    /// `segments` elements.
    pub fn validate(&self, segments: usize) -> Result<(), PatternError> {
        let ReassemblyRule::Parts { parts, .. } = self else {
            return Ok(());
        };
        for part in parts {
            if let ReassemblyPart::Segment(index) = part {
                if *index == 0 || *index > segments {
                    return Err(PatternError::BackReference { index: *index, segments });
                }
            }
        }
        Ok(())
    }

    /// Build the new phrase. The decomposition is left untouched.
    pub fn apply(&self, decomposition: &Decomposition) -> Reassembled {
        match self {
            ReassemblyRule::Link(keyword) => {
                Reassembled { link: Some(keyword.clone()), phrase: decomposition.flatten() }
            }
            ReassemblyRule::NewKey => Reassembled { link: None, phrase: decomposition.flatten() },
            ReassemblyRule::Parts { parts, link } => {
                let mut words = Vec::new();
                for part in parts {
                    match part {
                        // Indices are checked by `validate` when the owning rule is built.
                        ReassemblyPart::Segment(index) => {
                            words.extend(decomposition.segment(*index).unwrap_or_default().iter().cloned())
                        }
                        ReassemblyPart::Words(literal) => words.extend(literal.iter().cloned()),
                    }
                }
                Reassembled { link: link.clone(), phrase: Phrase::from_words(words) }
            }
        }
    }
}

impl fmt::Display for ReassemblyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReassemblyRule::Link(keyword) => write!(f, "={keyword}"),
            ReassemblyRule::NewKey => f.write_str("NEWKEY"),
            ReassemblyRule::Parts { parts, link } => {
                let rendered: Vec<String> = parts
                    .iter()
                    .map(|part| match part {
                        ReassemblyPart::Segment(index) => index.to_string(),
                        ReassemblyPart::Words(words) => Phrase::from_words(words.clone()).render(),
                    })
                    .collect();
                match link {
                    Some(keyword) => write!(f, "PRE ({}) (={keyword})", rendered.join(" ")),
                    None => f.write_str(&rendered.join(" ")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DecompositionRule, PatternElement};

    fn decompose(pattern: Vec<PatternElement>, text: &str) -> Decomposition {
        DecompositionRule::new(pattern).unwrap().decompose(&Phrase::parse(text)).unwrap()
    }

    #[test]
    fn parts_splice_segments_and_words() {
        let d = decompose(vec![0.into(), "YOUR".into(), 0.into()], "WELL YOUR BOYFRIEND MADE YOU COME HERE");
        let rule = ReassemblyRule::parts(vec![ReassemblyPart::words("YOUR"), ReassemblyPart::Segment(3)]);
        let out = rule.apply(&d);
        assert_eq!(out.link, None);
        assert_eq!(out.phrase.render(), "YOUR BOYFRIEND MADE YOU COME HERE");
    }

    #[test]
    fn segments_can_repeat_and_reorder() {
        let d = decompose(vec![1.into(), 1.into()], "A B");
        let rule = ReassemblyRule::parts(vec![
            ReassemblyPart::Segment(2),
            ReassemblyPart::Segment(1),
            ReassemblyPart::Segment(2),
        ]);
        assert_eq!(rule.apply(&d).phrase.render(), "B A B");
    }

    #[test]
    fn pure_link_passes_everything_through() {
        let d = decompose(vec![0.into(), "I".into(), 0.into()], "WHY CAN I NOT");
        let out = ReassemblyRule::link("WHAT").apply(&d);
        assert_eq!(out.link.as_deref(), Some("WHAT"));
        assert_eq!(out.phrase.render(), "WHY CAN I NOT");
    }

    #[test]
    fn transform_link_rebuilds_then_links() {
        let d = decompose(vec![0.into(), "I'M".into(), 0.into()], "I'M SAD");
        let rule = ReassemblyRule::parts_then(vec![ReassemblyPart::words("I ARE"), ReassemblyPart::Segment(3)], "YOU");
        let out = rule.apply(&d);
        assert_eq!(out.link.as_deref(), Some("YOU"));
        assert_eq!(out.phrase.render(), "I ARE SAD");
        assert_eq!(rule.to_string(), "PRE (I ARE 3) (=YOU)");
    }

    #[test]
    fn new_key_keeps_the_phrase() {
        let d = decompose(vec![0.into()], "NOTHING TO SEE");
        let out = ReassemblyRule::NewKey.apply(&d);
        assert_eq!(out, Reassembled { link: None, phrase: Phrase::parse("NOTHING TO SEE") });
    }

    #[test]
    fn validate_rejects_out_of_range_references() {
        let rule = ReassemblyRule::parts(vec![ReassemblyPart::Segment(4)]);
        assert_eq!(rule.validate(3), Err(PatternError::BackReference { index: 4, segments: 3 }));
        assert_eq!(rule.validate(4), Ok(()));
        let zero = ReassemblyRule::parts(vec![ReassemblyPart::Segment(0)]);
        assert_eq!(zero.validate(3), Err(PatternError::BackReference { index: 0, segments: 3 }));
        assert_eq!(ReassemblyRule::link("X").validate(1), Ok(()));
    }
}
