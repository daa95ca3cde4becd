//! Text boundary of the engine.
//!
//! `NONE` and `MEMORY` are control keywords in scripts. A user typing either
//! word must not trigger the fallback or memory rules, so standalone
//! occurrences are escaped on the way in and restored on the way out:
//!
//! ```text
//! "I said none of it"  -> I SAID zNONE OF IT   (engine sees this)
//! YOU SAY YOU SAID zNONE OF IT -> "YOU SAY YOU SAID NONE OF IT\n"
//! ```
//!
//! Input is uppercased before escaping, so the lowercase marker can only
//! reach the output through script text.

use super::ruleset::{MEMORY_KEYWORD, NONE_KEYWORD};
use crate::{Phrase, Word};

const ESCAPE: &str = "z";

fn is_stripped(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '"' | '(' | ')')
}

/// Uppercase `text`, optionally drop sentence punctuation, and escape the
/// control keywords.
pub fn normalize_input(text: &str, strip_punctuation: bool) -> Phrase {
    let upper = text.to_uppercase();
    let cleaned: String = if strip_punctuation {
        upper.chars().map(|c| if is_stripped(c) { ' ' } else { c }).collect()
    } else {
        upper
    };
    cleaned.split_whitespace().map(|token| Word::new(escape(token))).collect()
}

/// Render the reply phrase for the user.
pub fn finalize(phrase: &Phrase) -> String {
    let rendered: Vec<&str> = phrase.iter().filter_map(|w| w.literal()).map(unescape).collect();
    let mut out = rendered.join(" ").trim().to_string();
    out.push('\n');
    out
}

fn escape(token: &str) -> String {
    if token == NONE_KEYWORD || token == MEMORY_KEYWORD {
        format!("{ESCAPE}{token}")
    } else {
        token.to_string()
    }
}

fn unescape(token: &str) -> &str {
    match token.strip_prefix(ESCAPE) {
        Some(rest) if rest == NONE_KEYWORD || rest == MEMORY_KEYWORD => rest,
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_strips_punctuation() {
        let phrase = normalize_input("Well, my boyfriend made me come here.", true);
        assert_eq!(phrase.render(), "WELL MY BOYFRIEND MADE ME COME HERE");
    }

    #[test]
    fn apostrophes_survive() {
        assert_eq!(normalize_input("I don't know!", true).render(), "I DON'T KNOW");
    }

    #[test]
    fn punctuation_can_be_kept() {
        assert_eq!(normalize_input("hello, you.", false).render(), "HELLO, YOU.");
    }

    #[test]
    fn control_words_round_trip() {
        let phrase = normalize_input("I said none of it, memory fails", true);
        assert_eq!(phrase.render(), "I SAID zNONE OF IT zMEMORY FAILS");
        assert_eq!(finalize(&phrase), "I SAID NONE OF IT MEMORY FAILS\n");
    }

    #[test]
    fn only_standalone_control_words_are_escaped() {
        assert_eq!(normalize_input("nonesuch memorymap", true).render(), "NONESUCH MEMORYMAP");
    }

    #[test]
    fn finalize_trims_and_terminates() {
        assert_eq!(finalize(&Phrase::parse("IN WHAT WAY")), "IN WHAT WAY\n");
        assert_eq!(finalize(&Phrase::default()), "\n");
    }
}
