//! Rule entries: `(KEYWORD [= SUBSTITUTION] [PRECEDENCE] INSTRUCTIONS)`.
//!
//! The shape of the instructions decides the rule variant:
//!
//! | instructions                    | variant                   |
//! |---------------------------------|---------------------------|
//! | empty, substitution present     | unconditional substitution|
//! | `DLIST(/TAG ...)`               | word tagging              |
//! | `(=KEYWORD)`                    | equivalence               |
//! | `((decomp) (reassembly) ...)...`| transformation            |
//!
//! `NONE` is always a transformation. `MEMORY KEY (decomp = reassembly)...`
//! builds a memory rule for `KEY`.

use super::brackets::{Chunk, chunks, inner};
use super::patterns::{parse_decomposition, parse_reassembly};
use crate::engine::{MEMORY_KEYWORD, MemoryRule, NONE_KEYWORD, Rule, TransformRule};
use crate::error::{PatternError, ScriptError};
use tracing::debug;

/// One parsed rule entry.
#[derive(Debug)]
pub(crate) enum Entry {
    Keyword(String, Rule),
    Memory(String, MemoryRule),
}

/// Parse a whole `( ... )` rule group.
pub(crate) fn parse_entry(group: &str) -> Result<Entry, ScriptError> {
    let body = inner(group);
    let (keyword, rest) = split_token(body);
    if keyword.is_empty() {
        return Err(ScriptError::malformed(group, "missing keyword"));
    }

    if keyword == MEMORY_KEYWORD {
        let (key, groups) = split_token(rest);
        if key.is_empty() {
            return Err(ScriptError::malformed(group, "MEMORY needs a keyword"));
        }
        let memory = memory_rule(key, groups)?;
        debug!(keyword = key, patterns = memory.patterns().len(), "parsed memory rule");
        return Ok(Entry::Memory(key.to_string(), memory));
    }

    let (substitution, precedence, instructions) = substitution_and_precedence(rest);
    let pattern_err = |source: PatternError| ScriptError::Pattern { keyword: keyword.to_string(), source };

    let rule = if keyword == NONE_KEYWORD {
        Rule::transformation(substitution, precedence, transforms(keyword, group, instructions)?)
    } else if instructions.is_empty() {
        if substitution.is_none() {
            return Err(ScriptError::malformed(group, "rule has no instructions"));
        }
        Rule::unconditional(substitution, precedence).map_err(pattern_err)?
    } else if regex!(r"^DLIST\(\s*/").is_match(instructions) {
        let caps = regex!(r"^DLIST\(\s*/([^()]*)\)$")
            .captures(instructions)
            .ok_or_else(|| ScriptError::malformed(group, "unreadable DLIST"))?;
        let tags = caps[1].split_whitespace().map(str::to_string).collect();
        Rule::word_tagging(substitution, precedence, tags).map_err(pattern_err)?
    } else if let Some(caps) = regex!(r"^\(\s*=\s*(\S+?)\s*\)$").captures(instructions) {
        Rule::equivalence(substitution, precedence, &caps[1]).map_err(pattern_err)?
    } else {
        Rule::transformation(substitution, precedence, transforms(keyword, group, instructions)?)
    };

    debug!(keyword, kind = rule.kind_name(), precedence, "parsed rule");
    Ok(Entry::Keyword(keyword.to_string(), rule))
}

/// First token of `text` (ending at whitespace or a bracket) and the trimmed rest.
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let end = text.find(|c: char| c.is_whitespace() || c == '(' || c == ')').unwrap_or(text.len());
    (&text[..end], text[end..].trim())
}

fn substitution_and_precedence(text: &str) -> (Option<String>, u32, &str) {
    let caps = regex!(r"^(?:=\s*([^\s()]+))?\s*(\d+)?\s*").captures(text);
    let Some(caps) = caps else { return (None, 0, text) };
    let substitution = caps.get(1).map(|m| m.as_str().to_string());
    let precedence = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let consumed = caps.get(0).map_or(0, |m| m.end());
    (substitution, precedence, text[consumed..].trim())
}

/// `((decomposition) (reassembly) ...) ...`
fn transforms(keyword: &str, group: &str, instructions: &str) -> Result<Vec<TransformRule>, ScriptError> {
    let pattern_err = |source| ScriptError::Pattern { keyword: keyword.to_string(), source };
    let mut out = Vec::new();

    for chunk in chunks(instructions).map_err(|pos| ScriptError::unbalanced(&instructions[pos..]))? {
        let Chunk::Group(transform) = chunk else {
            return Err(ScriptError::malformed(group, format!("unexpected `{}` in instructions", chunk.text())));
        };
        let parts = chunks(inner(transform)).map_err(|pos| ScriptError::unbalanced(&transform[pos..]))?;
        let mut texts = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Chunk::Group(text) => texts.push(inner(text)),
                Chunk::Word(word) => {
                    return Err(ScriptError::malformed(transform, format!("unexpected `{word}` outside brackets")));
                }
            }
        }
        let Some((decomposition, reassemblies)) = texts.split_first() else {
            return Err(ScriptError::malformed(transform, "empty transformation"));
        };
        if reassemblies.is_empty() {
            return Err(ScriptError::malformed(transform, "decomposition without reassembly"));
        }

        let decomposition = parse_decomposition(decomposition).map_err(pattern_err)?;
        let reassemblies = reassemblies
            .iter()
            .map(|text| parse_reassembly(text))
            .collect::<Result<Vec<_>, _>>()
            .map_err(pattern_err)?;
        out.push(TransformRule::new(decomposition, reassemblies).map_err(pattern_err)?);
    }

    if out.is_empty() {
        return Err(ScriptError::malformed(group, "transformation needs at least one pattern"));
    }
    Ok(out)
}

/// `(decomposition = reassembly) ...`
fn memory_rule(keyword: &str, text: &str) -> Result<MemoryRule, ScriptError> {
    let pattern_err = |source| ScriptError::Pattern { keyword: keyword.to_string(), source };
    let mut pairs = Vec::new();

    for chunk in chunks(text).map_err(|pos| ScriptError::unbalanced(&text[pos..]))? {
        let Chunk::Group(group) = chunk else {
            return Err(ScriptError::malformed(text, format!("unexpected `{}` in memory rule", chunk.text())));
        };
        let Some((decomposition, reassembly)) = inner(group).split_once('=') else {
            return Err(ScriptError::malformed(group, "memory pattern needs `=`"));
        };
        let decomposition = parse_decomposition(decomposition).map_err(pattern_err)?;
        let reassembly = parse_reassembly(reassembly).map_err(pattern_err)?;
        pairs.push((decomposition, reassembly));
    }

    MemoryRule::new(pairs).map_err(pattern_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleKind;

    fn rule(text: &str) -> (String, Rule) {
        match parse_entry(text).unwrap() {
            Entry::Keyword(keyword, rule) => (keyword, rule),
            Entry::Memory(keyword, _) => panic!("unexpected memory rule for {keyword}"),
        }
    }

    #[test]
    fn unconditional_substitution() {
        let (keyword, rule) = rule("(DONT = DON'T)");
        assert_eq!(keyword, "DONT");
        assert_eq!(rule.substitution(), Some("DON'T"));
        assert!(matches!(rule.kind(), RuleKind::UnconditionalSubstitution));
    }

    #[test]
    fn word_tagging_with_substitution() {
        let (_, rule) = rule("(MOM = MOTHER DLIST(/ FAMILY))");
        assert_eq!(rule.substitution(), Some("MOTHER"));
        let RuleKind::WordTagging(tags) = rule.kind() else { panic!("expected tagging") };
        assert_eq!(tags, &["FAMILY"]);
    }

    #[test]
    fn equivalence_with_precedence() {
        let (_, rule) = rule("(MACHINE 50 (=COMPUTER))");
        assert_eq!(rule.precedence(), 50);
        assert!(matches!(rule.kind(), RuleKind::Equivalence(k) if k == "COMPUTER"));
    }

    #[test]
    fn transformation_with_substitution_and_precedence() {
        let (keyword, rule) = rule("(YOU'RE = I'M 3 ((0 I'M 0) (PRE (I ARE 3) (=YOU))) ((0) (NEWKEY)))");
        assert_eq!(keyword, "YOU'RE");
        assert_eq!(rule.substitution(), Some("I'M"));
        assert_eq!(rule.precedence(), 3);
        let RuleKind::Transformation(transforms) = rule.kind() else { panic!("expected transformation") };
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[0].reassemblies()[0].to_string(), "PRE (I ARE 3) (=YOU)");
    }

    #[test]
    fn memory_entry() {
        let Entry::Memory(keyword, memory) =
            parse_entry("(MEMORY MY (0 YOUR 0 = LETS DISCUSS FURTHER WHY YOUR 3) (0 = BUT 1))").unwrap()
        else {
            panic!("expected memory rule")
        };
        assert_eq!(keyword, "MY");
        assert_eq!(memory.patterns().len(), 2);
    }

    #[test]
    fn malformed_entries() {
        assert!(matches!(parse_entry("(LONELY)"), Err(ScriptError::MalformedRule { .. })));
        assert!(matches!(parse_entry("(A ((0 A 0)))"), Err(ScriptError::MalformedRule { .. })));
        assert!(matches!(parse_entry("(A ((0) (X)) STRAY)"), Err(ScriptError::MalformedRule { .. })));
        assert!(matches!(parse_entry("(MEMORY MY (0 YOUR 0))"), Err(ScriptError::MalformedRule { .. })));
        assert!(matches!(parse_entry("(TAG DLIST(/))"), Err(ScriptError::Pattern { .. })));
    }

    #[test]
    fn pattern_errors_name_the_keyword() {
        let err = parse_entry("(WHY ((0 0) (X)))").unwrap_err();
        let ScriptError::Pattern { keyword, source } = err else { panic!("expected pattern error") };
        assert_eq!(keyword, "WHY");
        assert_eq!(source, PatternError::AmbiguousWildcards { position: 1 });

        let err = parse_entry("(WHY ((0 WHY) (2 3)))").unwrap_err();
        assert!(matches!(err, ScriptError::Pattern { source: PatternError::BackReference { index: 3, .. }, .. }));
    }
}
