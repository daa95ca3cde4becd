//! Transform rules and memory rules.
//!
//! A [`TransformRule`] pairs one decomposition with its reassembly
//! alternatives. Alternatives are used in turn, never at random: every
//! successful match advances the rule's cursor, so repeated inputs cycle
//! through the replies.
//!
//! A [`MemoryRule`] reuses the same machinery to capture part of an input for
//! later: the reassembled phrase goes into a FIFO queue that is drained when a
//! later input has no keyword at all.

use super::decompose::DecompositionRule;
use super::reassemble::{Reassembled, ReassemblyRule};
use crate::Phrase;
use crate::error::PatternError;
use std::collections::VecDeque;
use tracing::debug;

/// One decomposition and its round-robin reassembly alternatives.
#[derive(Debug, Clone)]
pub struct TransformRule {
    decomposition: DecompositionRule,
    reassemblies: Vec<ReassemblyRule>,
    /// Index of the alternative used by the next successful match.
    cursor: usize,
}

impl TransformRule {
    /// Build a rule; every back-reference must point into the decomposition.
    pub fn new(decomposition: DecompositionRule, reassemblies: Vec<ReassemblyRule>) -> Result<Self, PatternError> {
        if reassemblies.is_empty() {
            return Err(PatternError::NoReassembly);
        }
        for reassembly in &reassemblies {
            reassembly.validate(decomposition.len())?;
        }
        Ok(TransformRule { decomposition, reassemblies, cursor: 0 })
    }

    pub fn decomposition(&self) -> &DecompositionRule {
        &self.decomposition
    }

    pub fn reassemblies(&self) -> &[ReassemblyRule] {
        &self.reassemblies
    }

    /// Decompose `phrase` and reassemble it with the next alternative.
    /// Returns `None` (and leaves the cursor alone) when the pattern does not fit.
    pub fn apply(&mut self, phrase: &Phrase) -> Option<Reassembled> {
        let decomposition = self.decomposition.decompose(phrase)?;
        let reassembly = &self.reassemblies[self.cursor];
        self.cursor = (self.cursor + 1) % self.reassemblies.len();

        let out = reassembly.apply(&decomposition);
        debug!(rule = %self.decomposition, %reassembly, phrase = %out.phrase, link = ?out.link, "reassembled");
        Some(out)
    }
}

/// Decomposition/reassembly pairs that capture input for later recall.
#[derive(Debug, Clone)]
pub struct MemoryRule {
    patterns: Vec<TransformRule>,
    recall: VecDeque<Phrase>,
}

impl MemoryRule {
    pub fn new(pairs: Vec<(DecompositionRule, ReassemblyRule)>) -> Result<Self, PatternError> {
        if pairs.is_empty() {
            return Err(PatternError::NoMemoryPatterns);
        }
        let patterns = pairs
            .into_iter()
            .map(|(decomposition, reassembly)| TransformRule::new(decomposition, vec![reassembly]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MemoryRule { patterns, recall: VecDeque::new() })
    }

    pub fn patterns(&self) -> &[TransformRule] {
        &self.patterns
    }

    /// Queue the reassembly of the first pattern that fits `phrase` and
    /// return the stored memory. Returns `None` when no pattern fits.
    pub fn memorize(&mut self, phrase: &Phrase) -> Option<&Phrase> {
        let out = self.patterns.iter_mut().find_map(|pattern| pattern.apply(phrase))?;
        debug!(memory = %out.phrase, "memorized");
        self.recall.push_back(out.phrase);
        self.recall.back()
    }

    /// Oldest memory first.
    pub fn recall(&mut self) -> Option<Phrase> {
        self.recall.pop_front()
    }

    /// Number of memories waiting to be recalled.
    pub fn pending(&self) -> usize {
        self.recall.len()
    }
}
