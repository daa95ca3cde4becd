//! Per-turn metrics.
//!
//! `RuleSet::respond` always returns a [`TurnResult`]: the reply phrase plus a
//! [`TurnMetrics`] record describing how it was produced. The CLI's `--trace`
//! report and the public `Response` type are built from it.
//!
//! ## Design notes
//!
//! - Keywords are recorded as rendered strings, not `Word`s, so the record
//!   does not hold on to tags that were only meaningful during the turn.
//! - `StepMetrics::phrase` is the phrase *after* the step ran.

use crate::Phrase;
use std::time::Duration;

bitflags::bitflags! {
    /// What happened during one turn.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TurnFlags: u8 {
        /// At least one keyword rule substituted its word.
        const SUBSTITUTED     = 1 << 0;
        /// The keystack was not empty.
        const KEYWORDS        = 1 << 1;
        /// A reassembly chained into another rule.
        const LINKED          = 1 << 2;
        /// A link named a keyword with no rule.
        const UNRESOLVED_LINK = 1 << 3;
        /// A memory was stored.
        const MEMORIZED       = 1 << 4;
        /// The reply came from a stored memory.
        const RECALLED        = 1 << 5;
        /// The reply came from the `NONE` rule.
        const FALLBACK        = 1 << 6;
    }
}

/// One keystack entry applied to the phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMetrics {
    /// The input word that put this entry on the keystack.
    pub keyword: String,
    /// The key of the rule that was applied (differs from `keyword` after a link).
    pub rule: String,
    /// Rule variant, as reported by `Rule::kind_name`.
    pub kind: &'static str,
    /// Link produced by the step, if any.
    pub link: Option<String>,
    /// Phrase after the step.
    pub phrase: String,
}

#[derive(Debug, Default, Clone)]
pub struct TurnMetrics {
    pub flags: TurnFlags,
    /// Number of direct substitutions applied while building the keystack.
    pub substitutions: usize,
    /// Keystack order after construction.
    pub keystack: Vec<String>,
    pub steps: Vec<StepMetrics>,
    /// Phrases stored by memory rules during this turn.
    pub memorized: Vec<String>,
    /// Link targets that had no rule.
    pub unresolved_links: Vec<String>,
    /// Total elapsed time for `RuleSet::respond`.
    pub elapsed: Duration,
}

/// Reply phrase bundled with the metrics for the turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub phrase: Phrase,
    pub metrics: TurnMetrics,
}
