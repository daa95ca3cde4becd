//! The rule set and the per-turn response state machine.
//!
//! ```text
//! ScanInput ──> BuildKeystack ──> Memorize ──┬──> ApplyKeystack ──> reply
//!                                            │
//!                                            └──> (nothing found)
//!                                                 recall memory / NONE rule
//! ```
//!
//! A turn with substitutions but no keystack entries replies with the
//! substituted phrase itself: the keystack walk runs, finds nothing to pop and
//! hands the phrase through.

use super::keystack::KeyStack;
use super::metrics::{StepMetrics, TurnFlags, TurnMetrics, TurnResult};
use super::rules::{Rule, RuleKind};
use super::transform::MemoryRule;
use crate::{Phrase, Word};
use crate::error::ScriptError;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Key of the fallback rule every rule set must define.
pub const NONE_KEYWORD: &str = "NONE";
/// Reserved script keyword introducing a memory rule.
pub const MEMORY_KEYWORD: &str = "MEMORY";
/// Upper bound on links followed in one turn.
pub const MAX_LINK_HOPS: usize = 64;

/// Everything a script defines, plus the per-conversation rule state
/// (round-robin cursors and memory queues).
///
/// Clone the set to start an independent conversation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    greetings: Vec<String>,
    rules: HashMap<String, Rule>,
    memories: IndexMap<String, MemoryRule>,
}

impl RuleSet {
    pub fn new(
        greetings: Vec<String>,
        rules: HashMap<String, Rule>,
        memories: IndexMap<String, MemoryRule>,
    ) -> Result<Self, ScriptError> {
        match rules.get(NONE_KEYWORD).map(Rule::kind) {
            Some(RuleKind::Transformation(_)) => Ok(RuleSet { greetings, rules, memories }),
            _ => Err(ScriptError::MissingNoneRule),
        }
    }

    pub fn greetings(&self) -> &[String] {
        &self.greetings
    }

    pub fn rule(&self, keyword: &str) -> Option<&Rule> {
        self.rules.get(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_memory_keyword(&self, keyword: &str) -> bool {
        self.memories.contains_key(keyword)
    }

    /// Memory rules in script order.
    pub fn memories(&self) -> impl Iterator<Item = (&str, &MemoryRule)> {
        self.memories.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// Run one turn on an already normalized phrase.
    pub fn respond(&mut self, mut phrase: Phrase) -> TurnResult {
        let start = Instant::now();
        let mut metrics = TurnMetrics::default();

        let mut keystack = KeyStack::scan(self, &mut phrase);
        metrics.substitutions = keystack.substitutions();
        metrics.keystack = keystack.keywords();
        if keystack.substitutions() > 0 {
            metrics.flags |= TurnFlags::SUBSTITUTED;
        }
        if !keystack.is_empty() {
            metrics.flags |= TurnFlags::KEYWORDS;
        }

        self.memorize(keystack.memory_keywords(), &phrase, &mut metrics);

        let phrase = if keystack.substitutions() == 0 && keystack.is_empty() {
            debug!("no keywords");
            self.no_keyword_response(&mut metrics)
        } else {
            info!(
                keywords = keystack.len(),
                substitutions = keystack.substitutions(),
                %phrase,
                "applying keystack"
            );
            self.apply_keystack(phrase, &mut keystack, &mut metrics)
        };

        metrics.elapsed = start.elapsed();
        TurnResult { phrase, metrics }
    }

    /// Store a memory for every memory keyword that appeared in the input.
    fn memorize(&mut self, keywords: &[String], phrase: &Phrase, metrics: &mut TurnMetrics) {
        for keyword in keywords {
            let Some(memory) = self.memories.get_mut(keyword) else { continue };
            match memory.memorize(phrase) {
                Some(stored) => {
                    metrics.flags |= TurnFlags::MEMORIZED;
                    metrics.memorized.push(stored.render());
                }
                None => debug!(%keyword, "no memory pattern matched"),
            }
        }
    }

    fn no_keyword_response(&mut self, metrics: &mut TurnMetrics) -> Phrase {
        for (keyword, memory) in self.memories.iter_mut() {
            // Empty memories are discarded, not used as replies.
            while let Some(recalled) = memory.recall() {
                if recalled.is_empty() {
                    debug!(%keyword, "dropped empty memory");
                    continue;
                }
                info!(%keyword, %recalled, "recalled memory");
                metrics.flags |= TurnFlags::RECALLED;
                return recalled;
            }
        }

        metrics.flags |= TurnFlags::FALLBACK;
        match self.rules.get_mut(NONE_KEYWORD) {
            Some(rule) => {
                let keyword = Word::new(NONE_KEYWORD);
                let out = rule.apply_transform(&keyword, Phrase::default());
                metrics.steps.push(StepMetrics {
                    keyword: NONE_KEYWORD.to_string(),
                    rule: NONE_KEYWORD.to_string(),
                    kind: rule.kind_name(),
                    link: None,
                    phrase: out.phrase.render(),
                });
                out.phrase
            }
            // `new` guarantees the rule exists.
            None => Phrase::default(),
        }
    }

    fn apply_keystack(&mut self, mut phrase: Phrase, keystack: &mut KeyStack, metrics: &mut TurnMetrics) -> Phrase {
        let mut hops = 0;

        while let Some(mut entry) = keystack.pop() {
            let Some(rule) = self.rules.get_mut(&entry.keyword) else {
                error!(keyword = %entry.keyword, "keystack entry has no rule");
                continue;
            };
            let kind = rule.kind_name();
            let out = rule.apply_transform(&entry.word, phrase);
            phrase = out.phrase;
            metrics.steps.push(StepMetrics {
                keyword: entry.word.to_string(),
                rule: entry.keyword.clone(),
                kind,
                link: out.link.clone(),
                phrase: phrase.render(),
            });

            let Some(link) = out.link else { continue };
            if !self.rules.contains_key(&link) {
                error!(%link, "could not find linked rule");
                metrics.flags |= TurnFlags::UNRESOLVED_LINK;
                metrics.unresolved_links.push(link);
                continue;
            }
            if hops == MAX_LINK_HOPS {
                warn!(%link, hops, "link limit reached, dropping link");
                continue;
            }
            hops += 1;
            info!(word = %entry.word, from = %entry.keyword, to = %link, "following link");
            metrics.flags |= TurnFlags::LINKED;
            entry.keyword = link;
            keystack.push_front(entry);
        }

        phrase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_script;

    fn rules(body: &str) -> RuleSet {
        parse_script(&format!("(HI) START {body} (NONE ((0) (FALLBACK ONE) (FALLBACK TWO))) ()")).unwrap()
    }

    fn reply(rules: &mut RuleSet, text: &str) -> String {
        rules.respond(Phrase::parse(text)).phrase.render()
    }

    #[test]
    fn none_rule_is_required() {
        let err = RuleSet::new(vec![], HashMap::new(), IndexMap::new()).unwrap_err();
        assert!(matches!(err, ScriptError::MissingNoneRule));
    }

    #[test]
    fn fallback_cycles_through_none_alternatives() {
        let mut set = rules("");
        assert_eq!(reply(&mut set, "HELLO"), "FALLBACK ONE");
        assert_eq!(reply(&mut set, "HELLO"), "FALLBACK TWO");
        let turn = set.respond(Phrase::parse("HELLO"));
        assert_eq!(turn.phrase.render(), "FALLBACK ONE");
        assert!(turn.metrics.flags.contains(TurnFlags::FALLBACK));
    }

    #[test]
    fn highest_precedence_keyword_answers() {
        let mut set = rules("(LOW 1 ((0) (LOW))) (HIGH 5 ((0) (HIGH)))");
        let turn = set.respond(Phrase::parse("LOW AND HIGH"));
        assert_eq!(turn.metrics.keystack, vec!["HIGH", "LOW"]);
        // LOW runs second against the reply of HIGH.
        assert_eq!(turn.phrase.render(), "LOW");
    }

    #[test]
    fn unmatched_keyword_falls_through_to_the_next() {
        let mut set = rules("(A 9 ((0 NEVER 0) (NO))) (B ((0 B 0) (GOT 3)))");
        assert_eq!(reply(&mut set, "A B C"), "GOT C");
    }

    #[test]
    fn equivalence_chains_into_the_target_rule() {
        let mut set = rules("(COMPUTER 50 ((0) (C1) (C2))) (MACHINE 50 (=COMPUTER))");
        let turn = set.respond(Phrase::parse("A MACHINE"));
        assert_eq!(turn.phrase.render(), "C1");
        assert!(turn.metrics.flags.contains(TurnFlags::LINKED));
        assert_eq!(turn.metrics.steps.len(), 2);
        assert_eq!(turn.metrics.steps[1].rule, "COMPUTER");
        // The cursor belongs to the COMPUTER rule, whichever word reached it.
        assert_eq!(reply(&mut set, "COMPUTER"), "C2");
    }

    #[test]
    fn unresolved_link_is_dropped() {
        let mut set = rules("(WHY ((0) (=NOWHERE)))");
        let turn = set.respond(Phrase::parse("WHY NOT"));
        assert_eq!(turn.phrase.render(), "WHY NOT");
        assert_eq!(turn.metrics.unresolved_links, vec!["NOWHERE"]);
        assert!(turn.metrics.flags.contains(TurnFlags::UNRESOLVED_LINK));
    }

    #[test]
    fn cyclic_links_stop_at_the_hop_limit() {
        let mut set = rules("(PING ((0) (=PONG))) (PONG ((0) (=PING)))");
        let turn = set.respond(Phrase::parse("PING"));
        assert_eq!(turn.phrase.render(), "PING");
        assert_eq!(turn.metrics.steps.len(), MAX_LINK_HOPS + 1);
    }

    #[test]
    fn substitution_only_input_echoes_the_substituted_phrase() {
        let mut set = rules("(DONT = DON'T)");
        assert_eq!(reply(&mut set, "DONT STOP"), "DON'T STOP");
    }

    #[test]
    fn memories_are_recalled_when_nothing_matches() {
        let mut set = rules("(MEMORY MY (0 MY 0 = EARLIER YOU SAID YOUR 3)) (MY ((0) (YOUR WHAT)))");
        let turn = set.respond(Phrase::parse("MY CAT IS ILL"));
        assert_eq!(turn.phrase.render(), "YOUR WHAT");
        assert_eq!(turn.metrics.memorized, vec!["EARLIER YOU SAID YOUR CAT IS ILL"]);
        set.respond(Phrase::parse("MY DOG TOO"));

        let turn = set.respond(Phrase::parse("HMM"));
        assert_eq!(turn.phrase.render(), "EARLIER YOU SAID YOUR CAT IS ILL");
        assert!(turn.metrics.flags.contains(TurnFlags::RECALLED));
        assert_eq!(reply(&mut set, "HMM"), "EARLIER YOU SAID YOUR DOG TOO");
        assert_eq!(reply(&mut set, "HMM"), "FALLBACK ONE");
    }

    #[test]
    fn empty_memories_are_skipped() {
        let mut set = rules("(MEMORY MY (0 MY 0 = 3)) (MEMORY HIS (0 HIS 0 = HIS 3)) (HAT ((0) (NICE HAT)))");
        assert_eq!(reply(&mut set, "HIS HAT"), "NICE HAT");

        // The memory stored this turn is empty, so recall moves on to HIS.
        let turn = set.respond(Phrase::parse("CAT MY"));
        assert_eq!(turn.metrics.memorized, vec![""]);
        assert_eq!(turn.phrase.render(), "HIS HAT");

        let turn = set.respond(Phrase::parse("DOG MY"));
        assert_eq!(turn.phrase.render(), "FALLBACK ONE");
        assert!(turn.metrics.flags.contains(TurnFlags::FALLBACK));
        assert!(!turn.metrics.flags.contains(TurnFlags::RECALLED));
    }

    #[test]
    fn memorize_sees_substituted_words() {
        let mut set = rules("(MEMORY YOUR (0 YOUR 0 = LATER 3)) (MY = YOUR)");
        let turn = set.respond(Phrase::parse("MY HAT"));
        // MY is not a memory key, and the scan checks keys before substituting.
        assert!(turn.metrics.memorized.is_empty());
        let turn = set.respond(Phrase::parse("YOUR MY HAT"));
        assert_eq!(turn.metrics.memorized, vec!["LATER YOUR HAT"]);
    }

    #[test]
    fn clones_do_not_share_state() {
        let template = rules("");
        let mut a = template.clone();
        let mut b = template.clone();
        assert_eq!(reply(&mut a, "X"), "FALLBACK ONE");
        assert_eq!(reply(&mut b, "X"), "FALLBACK ONE");
    }
}
