//! Error taxonomy.
//!
//! Two families of failure exist:
//!
//! - [`PatternError`]: a rule component was built from invalid parts
//!   (empty pattern, blank word, ambiguous wildcards, dangling back-reference).
//!   These are construction-time failures and are never produced while a
//!   conversation is running.
//! - [`ScriptError`]: a script could not be turned into a [`RuleSet`]. Pattern
//!   errors found while parsing are wrapped together with the keyword of the
//!   offending rule.
//!
//! A decomposition that does not fit a phrase is *not* an error: it is an
//! `Option::None` from [`DecompositionRule::decompose`] so callers can move on
//! to the next alternative.
//!
//! [`RuleSet`]: crate::RuleSet
//! [`DecompositionRule::decompose`]: crate::DecompositionRule::decompose

use std::path::PathBuf;

/// A rule component could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("decomposition needs at least one element")]
    EmptyPattern,

    #[error("pattern element {position} is a blank word (no text and no tags)")]
    BlankWord { position: usize },

    #[error("pattern element {position} is an empty alternative set")]
    EmptyAlternatives { position: usize },

    #[error("pattern element {position} is a second `0` wildcard in the same run of counts")]
    AmbiguousWildcards { position: usize },

    #[error("reassembly references segment {index} but the decomposition has {segments} segment(s)")]
    BackReference { index: usize, segments: usize },

    #[error("cannot read pattern text near `{text}`")]
    Syntax { text: String },

    #[error("transform rule needs at least one reassembly")]
    NoReassembly,

    #[error("memory rule needs at least one decomposition/reassembly pair")]
    NoMemoryPatterns,

    #[error("unconditional substitution needs a non-empty substitution word")]
    MissingSubstitution,

    #[error("word tagging rule needs at least one non-empty tag")]
    EmptyTagList,

    #[error("equivalence rule needs a target keyword")]
    MissingEquivalent,
}

/// A script could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("missing 'START' keyword to separate the greetings from the rule set")]
    MissingStart,

    #[error("unbalanced brackets near `{context}`")]
    UnbalancedBrackets { context: String },

    #[error("malformed rule `{text}`: {reason}")]
    MalformedRule { text: String, reason: String },

    #[error("rule for keyword `{keyword}`: {source}")]
    Pattern {
        keyword: String,
        #[source]
        source: PatternError,
    },

    #[error("script defines no `NONE` rule")]
    MissingNoneRule,

    #[error("failed to read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    pub(crate) fn malformed(text: &str, reason: impl Into<String>) -> Self {
        ScriptError::MalformedRule { text: preview(text), reason: reason.into() }
    }

    pub(crate) fn unbalanced(text: &str) -> Self {
        ScriptError::UnbalancedBrackets { context: preview(text) }
    }
}

/// Keep error messages readable when a whole rule body is quoted.
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 60 { format!("{}...", flat.chars().take(60).collect::<String>()) } else { flat }
}
