//! Keystack construction.
//!
//! The keystack is the ordered queue of keywords found in one input phrase.
//! It is *not* a sorted list: a keyword goes to the front only when its
//! precedence beats every precedence seen so far in the phrase, otherwise it
//! queues at the back.
//!
//! ```text
//! input:      K1(1)  K2(5)  K3(2)
//! K1: 1 > 0   [K1]            top = 1
//! K2: 5 > 1   [K2, K1]        top = 5
//! K3: 2 <= 5  [K2, K1, K3]
//! ```

use super::rules::RuleKind;
use super::ruleset::RuleSet;
use crate::{Phrase, Word};
use std::collections::VecDeque;
use tracing::debug;

/// A keyword waiting to be applied, and the key of the rule to apply.
///
/// `keyword` starts as the word's own key and is replaced when a reassembly
/// links to another rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStackEntry {
    pub word: Word,
    pub keyword: String,
}

#[derive(Debug, Clone, Default)]
pub struct KeyStack {
    entries: VecDeque<KeyStackEntry>,
    substitutions: usize,
    memory_keywords: Vec<String>,
}

impl KeyStack {
    /// Scan `phrase` left to right, applying substitutions and tags in place.
    pub fn scan(rules: &RuleSet, phrase: &mut Phrase) -> Self {
        let mut stack = KeyStack::default();
        let mut top_precedence = 0;

        for index in 0..phrase.len() {
            let Some(word) = phrase.word_mut(index) else { break };
            let Some(key) = word.literal().map(str::to_owned) else { continue };

            if rules.is_memory_keyword(&key) {
                stack.memory_keywords.push(key.clone());
            }
            let Some(rule) = rules.rule(&key) else { continue };

            if rule.apply_substitution(word) {
                stack.substitutions += 1;
            }
            match rule.kind() {
                RuleKind::UnconditionalSubstitution => continue,
                RuleKind::WordTagging(_) => {
                    rule.apply_tags(word);
                    debug!(%word, "tagged");
                    continue;
                }
                _ => {}
            }

            let entry = KeyStackEntry { word: word.clone(), keyword: key };
            if rule.precedence() > top_precedence {
                top_precedence = rule.precedence();
                stack.entries.push_front(entry);
            } else {
                stack.entries.push_back(entry);
            }
        }

        debug!(keystack = ?stack.keywords(), substitutions = stack.substitutions, "keystack built");
        stack
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn substitutions(&self) -> usize {
        self.substitutions
    }

    /// Memory rule keys seen in the phrase, in input order.
    pub fn memory_keywords(&self) -> &[String] {
        &self.memory_keywords
    }

    /// Rule keys in stack order.
    pub fn keywords(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.keyword.clone()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &KeyStackEntry> {
        self.entries.iter()
    }

    pub(crate) fn pop(&mut self) -> Option<KeyStackEntry> {
        self.entries.pop_front()
    }

    pub(crate) fn push_front(&mut self, entry: KeyStackEntry) {
        self.entries.push_front(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_script;

    const SCRIPT: &str = "
        (HELLO)
        START
        (K1 1 ((0) (ONE)))
        (K2 5 ((0) (TWO)))
        (K3 2 ((0) (THREE)))
        (PLAIN ((0) (PLAIN)))
        (DONT = DON'T)
        (MOM = MOTHER DLIST(/FAMILY))
        (MEMORY MY
            (0 MY 0 = YOUR 3)
            (0 = NOTHING))
        (NONE ((0) (GO ON)))
        ()
    ";

    fn scan(text: &str) -> (KeyStack, Phrase) {
        let rules = parse_script(SCRIPT).unwrap();
        let mut phrase = Phrase::parse(text);
        let stack = KeyStack::scan(&rules, &mut phrase);
        (stack, phrase)
    }

    #[test]
    fn higher_precedence_jumps_the_queue() {
        let (stack, _) = scan("K1 K2 K3");
        assert_eq!(stack.keywords(), vec!["K2", "K1", "K3"]);
    }

    #[test]
    fn zero_precedence_keywords_queue_in_order() {
        let (stack, _) = scan("PLAIN K3 PLAIN");
        assert_eq!(stack.keywords(), vec!["K3", "PLAIN", "PLAIN"]);
    }

    #[test]
    fn substitutions_and_tags_stay_off_the_stack() {
        let (stack, phrase) = scan("DONT TELL MOM");
        assert!(stack.is_empty());
        assert_eq!(stack.substitutions(), 2);
        assert_eq!(phrase.render(), "DON'T TELL MOTHER");
        assert_eq!(phrase[2], Word::with_tags("MOTHER", ["FAMILY"]));
    }

    #[test]
    fn memory_keywords_are_collected_separately() {
        let (stack, _) = scan("MY K1 MY");
        assert_eq!(stack.memory_keywords(), ["MY", "MY"]);
        assert_eq!(stack.keywords(), vec!["K1"]);
    }

    #[test]
    fn unknown_words_are_ignored() {
        let (stack, phrase) = scan("NOTHING TO SEE");
        assert!(stack.is_empty());
        assert_eq!(stack.substitutions(), 0);
        assert_eq!(phrase.render(), "NOTHING TO SEE");
    }
}
