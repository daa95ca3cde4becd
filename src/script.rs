//! Script parser.
//!
//! A script is a list of bracketed greetings, the token `START`, then one
//! bracketed entry per keyword, closed by `()`:
//!
//! ```text
//! (HOW DO YOU DO.  PLEASE TELL ME YOUR PROBLEM)
//! START
//! (SORRY ((0) (PLEASE DON'T APOLOGIZE) (APOLOGIES ARE NOT NECESSARY)))
//! (DONT = DON'T)
//! (MOM = MOTHER DLIST(/ FAMILY))
//! (MACHINE 50 (=COMPUTER))
//! (MEMORY MY (0 YOUR 0 = LETS DISCUSS FURTHER WHY YOUR 3))
//! (NONE ((0) (I AM NOT SURE I UNDERSTAND YOU FULLY)))
//! ()
//! ```
//!
//! Lines starting with `;` are comments.
//!
//! - `brackets.rs`: comment stripping and top-level bracket splitting.
//! - `instructions.rs`: one rule entry into a `Rule` or `MemoryRule`.
//! - `patterns.rs`: decomposition and reassembly text.

#[path = "script/brackets.rs"]
mod brackets;
#[path = "script/instructions.rs"]
mod instructions;
#[path = "script/patterns.rs"]
mod patterns;

pub use patterns::{parse_decomposition, parse_reassembly};

use crate::engine::RuleSet;
use crate::error::ScriptError;
use brackets::{Chunk, chunks, inner, strip_script};
use indexmap::IndexMap;
use instructions::{Entry, parse_entry};
use std::collections::HashMap;
use tracing::{info, warn};

const START: &str = "START";

/// Parse script text into a rule set.
pub fn parse_script(script: &str) -> Result<RuleSet, ScriptError> {
    let text = strip_script(script);
    let chunks = chunks(&text).map_err(|pos| ScriptError::unbalanced(&text[pos..]))?;

    let Some(start) = chunks.iter().position(|c| *c == Chunk::Word(START)) else {
        return Err(ScriptError::MissingStart);
    };

    let mut greetings = Vec::new();
    for chunk in &chunks[..start] {
        match chunk {
            Chunk::Group(group) => greetings.push(inner(group).split_whitespace().collect::<Vec<_>>().join(" ")),
            Chunk::Word(word) => return Err(ScriptError::malformed(word, "text outside brackets before START")),
        }
    }

    let mut rules = HashMap::new();
    let mut memories = IndexMap::new();
    for chunk in &chunks[start + 1..] {
        let Chunk::Group(group) = chunk else {
            return Err(ScriptError::malformed(chunk.text(), "text outside brackets"));
        };
        match parse_entry(group)? {
            Entry::Keyword(keyword, rule) => {
                if rules.contains_key(&keyword) {
                    warn!(%keyword, "keyword defined twice, keeping the later rule");
                }
                rules.insert(keyword, rule);
            }
            Entry::Memory(keyword, memory) => {
                if memories.contains_key(&keyword) {
                    warn!(%keyword, "memory defined twice, keeping the later rule");
                }
                memories.insert(keyword, memory);
            }
        }
    }

    info!(greetings = greetings.len(), rules = rules.len(), memories = memories.len(), "loaded script");
    RuleSet::new(greetings, rules, memories)
}
