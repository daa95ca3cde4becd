//! Response engine.
//!
//! This module is the *core* of the crate: everything needed to turn one
//! normalized input phrase into a reply, given a [`RuleSet`]. The script
//! parser (`src/script.rs`) only feeds it validated rules.
//!
//! ## How the parts work together
//!
//! ```text
//! input ── normalize_input ──> Phrase                      (normalize.rs)
//!                                │
//!                                v
//!                      KeyStack::scan                      (keystack.rs)
//!                        - substitutions / word tagging
//!                        - precedence-ordered keystack
//!                        - memory keywords
//!                                │
//!            ┌───────────────────┼──────────────────────┐
//!            v                   v                      v
//!   RuleSet::memorize   RuleSet::apply_keystack   no keywords: recall a
//!   (MemoryRule queue)   Rule::apply_transform     memory, else NONE rule
//!                          TransformRule            (ruleset.rs)
//!                           DecompositionRule       (decompose.rs)
//!                           ReassemblyRule          (reassemble.rs)
//!                                │
//!                                v
//!                           finalize ──> String
//! ```
//!
//! ## Responsibilities by module
//!
//! - `decompose.rs`: pattern elements and the memoized backtracking matcher.
//! - `reassemble.rs`: rebuilding a phrase from decomposition segments.
//! - `transform.rs`: decomposition + round-robin reassembly alternatives, and
//!   the memory rule's FIFO recall queue.
//! - `rules.rs`: the closed set of rule variants and their single dispatch
//!   point (`Rule::apply_transform`).
//! - `keystack.rs`: the keyword scan that builds the keystack.
//! - `ruleset.rs`: the per-turn state machine.
//! - `normalize.rs`: the text boundary (uppercasing, reserved-word escaping).
//! - `metrics.rs`: per-turn trace data.
//!
//! ## Mutable state
//!
//! A `RuleSet` is read-mostly. Only the round-robin cursors of transform
//! rules and the memory queues change during a conversation, so concurrent
//! sessions each need their own clone.
//!
//! ## Debugging
//!
//! All stages emit `tracing` events; run the binary with `ELIZA_LOG=eliza=debug`
//! (or `-vv`) to see keystack construction, matching and link chasing.

#[path = "engine/decompose.rs"]
mod decompose;
#[path = "engine/keystack.rs"]
mod keystack;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/reassemble.rs"]
mod reassemble;
#[path = "engine/rules.rs"]
mod rules;
#[path = "engine/ruleset.rs"]
mod ruleset;
#[path = "engine/transform.rs"]
mod transform;

pub use decompose::{Decomposition, DecompositionRule, PatternElement};
pub use keystack::{KeyStack, KeyStackEntry};
pub use metrics::{StepMetrics, TurnFlags, TurnMetrics, TurnResult};
pub use normalize::{finalize, normalize_input};
pub use reassemble::{Reassembled, ReassemblyPart, ReassemblyRule};
pub use rules::{Rule, RuleKind};
pub use ruleset::{MAX_LINK_HOPS, MEMORY_KEYWORD, NONE_KEYWORD, RuleSet};
pub use transform::{MemoryRule, TransformRule};
