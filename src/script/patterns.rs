//! Decomposition and reassembly text grammar.
//!
//! ```text
//! decomposition:  0 YOU (* WANT NEED) 0 (/FAMILY) 2
//! reassembly:     WHAT WOULD IT MEAN TO YOU IF YOU GOT 4
//!                 =WHAT
//!                 PRE (I ARE 3) (=YOU)
//!                 NEWKEY
//! ```

use super::brackets::{Chunk, chunks, inner};
use crate::engine::{DecompositionRule, PatternElement, ReassemblyPart, ReassemblyRule};
use crate::error::PatternError;
use crate::Word;

/// Parse decomposition text into a validated pattern.
pub fn parse_decomposition(text: &str) -> Result<DecompositionRule, PatternError> {
    let tokens = chunks(text).map_err(|pos| syntax(&text[pos..]))?;
    let elements = tokens.into_iter().map(element).collect::<Result<Vec<_>, _>>()?;
    DecompositionRule::new(elements)
}

/// Parse reassembly text. Back-references are checked later, against the
/// decomposition the reassembly is paired with.
pub fn parse_reassembly(text: &str) -> Result<ReassemblyRule, PatternError> {
    let text = text.trim();
    if text == "NEWKEY" {
        return Ok(ReassemblyRule::NewKey);
    }
    if let Some(caps) = regex!(r"^=\s*(\S+)$").captures(text) {
        return Ok(ReassemblyRule::link(&caps[1]));
    }
    if let Some(caps) = regex!(r"^PRE\s*\((.*)\)\s*\(\s*=\s*(\S+?)\s*\)$").captures(text) {
        return Ok(ReassemblyRule::parts_then(parts(&caps[1])?, &caps[2]));
    }
    if text.starts_with('=') || text.contains('(') || text.contains(')') {
        return Err(syntax(text));
    }
    Ok(ReassemblyRule::parts(parts(text)?))
}

fn parts(text: &str) -> Result<Vec<ReassemblyPart>, PatternError> {
    let mut parts = Vec::new();
    let mut run: Vec<Word> = Vec::new();

    for token in text.split_whitespace() {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            let index = token.parse().map_err(|_| syntax(token))?;
            if !run.is_empty() {
                parts.push(ReassemblyPart::Words(std::mem::take(&mut run)));
            }
            parts.push(ReassemblyPart::Segment(index));
        } else {
            run.push(Word::new(token));
        }
    }
    if !run.is_empty() {
        parts.push(ReassemblyPart::Words(run));
    }
    Ok(parts)
}

fn element(chunk: Chunk<'_>) -> Result<PatternElement, PatternError> {
    match chunk {
        Chunk::Word(token) if token.bytes().all(|b| b.is_ascii_digit()) => {
            token.parse().map(PatternElement::Count).map_err(|_| syntax(token))
        }
        Chunk::Word(token) => Ok(PatternElement::word(token)),
        Chunk::Group(group) => {
            let body = inner(group);
            if let Some(members) = body.strip_prefix('*') {
                let members = chunks(members).map_err(|_| syntax(group))?;
                let words = members
                    .into_iter()
                    .map(|m| match m {
                        Chunk::Word(w) => Ok(Word::new(w)),
                        Chunk::Group(g) => tag_word(g).ok_or_else(|| syntax(g)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(PatternElement::AnyOf(words))
            } else {
                tag_word(group).map(PatternElement::Word).ok_or_else(|| syntax(group))
            }
        }
    }
}

/// `(/TAG ...)` as a tag-only word.
fn tag_word(group: &str) -> Option<Word> {
    let tags = inner(group).strip_prefix('/')?;
    Some(Word::tagged(tags.split_whitespace()))
}

fn syntax(text: &str) -> PatternError {
    PatternError::Syntax { text: text.chars().take(40).collect() }
}
