use crate::engine::{self, RuleSet, StepMetrics, TurnFlags};
use crate::error::ScriptError;
use crate::script::parse_script;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;

/// The 1966 DOCTOR script.
pub const DOCTOR_SCRIPT: &str = include_str!("../scripts/doctor.txt");

/// Parsed once; every session clones it.
static DOCTOR: Lazy<RuleSet> = Lazy::new(|| parse_script(DOCTOR_SCRIPT).expect("bundled DOCTOR script must parse"));

/// Session options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Seed for greeting selection. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Replace `. , ; : ! ? " ( )` with spaces before matching.
    pub strip_punctuation: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { seed: None, strip_punctuation: true }
    }
}

/// One step of a turn, as shown in verbose output.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub keyword: String,
    pub rule: String,
    pub kind: &'static str,
    pub link: Option<String>,
    /// Phrase after the step, cut to 80 characters.
    pub preview: String,
}

/// Additional details returned by [`Eliza::respond_verbose`].
#[derive(Debug, Clone)]
pub struct TurnDetails {
    pub flags: TurnFlags,
    pub substitutions: usize,
    /// Keystack order after the scan.
    pub keystack: Vec<String>,
    pub steps: Vec<StepSummary>,
    /// Memories stored during the turn.
    pub memorized: Vec<String>,
    pub unresolved_links: Vec<String>,
}

/// Result from [`Eliza::respond_verbose`].
#[derive(Debug, Clone)]
pub struct Response {
    /// The reply, exactly as [`Eliza::respond_to`] returns it.
    pub text: String,
    /// The input as the engine saw it (uppercased, escaped).
    pub normalized: String,
    pub elapsed: Duration,
    pub details: TurnDetails,
}

/// A conversation.
///
/// Each session owns its own copy of the rule set, so round-robin positions
/// and memories never leak between sessions.
///
/// ```
/// use eliza::Eliza;
///
/// let mut eliza = Eliza::doctor();
/// assert_eq!(eliza.respond_to("I need some help"), "WHAT WOULD IT MEAN TO YOU IF YOU GOT SOME HELP\n");
/// ```
#[derive(Debug, Clone)]
pub struct Eliza {
    rules: RuleSet,
    options: Options,
    rng: StdRng,
}

impl Eliza {
    pub fn new(rules: RuleSet, options: Options) -> Self {
        let rng = seeded(options.seed);
        Self { rules, options, rng }
    }

    /// Start a session from script text.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        Ok(Self::new(parse_script(script)?, Options::default()))
    }

    /// Start a session from a script file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let script =
            std::fs::read_to_string(path).map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;
        Self::from_script(&script)
    }

    /// Start a session with the bundled DOCTOR script.
    pub fn doctor() -> Self {
        Self::doctor_with(Options::default())
    }

    pub fn doctor_with(options: Options) -> Self {
        Self::new(DOCTOR.clone(), options)
    }

    /// Replace the session options (reseeding the greeting generator).
    pub fn with_options(self, options: Options) -> Self {
        Self::new(self.rules, options)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// A greeting picked at random, newline-terminated.
    pub fn greet(&mut self) -> String {
        let mut greeting = self.rules.greetings().choose(&mut self.rng).cloned().unwrap_or_default();
        greeting.push('\n');
        greeting
    }

    /// Run one turn and return the newline-terminated reply.
    pub fn respond_to(&mut self, input: &str) -> String {
        let phrase = engine::normalize_input(input, self.options.strip_punctuation);
        let turn = self.rules.respond(phrase);
        engine::finalize(&turn.phrase)
    }

    /// Like [`Eliza::respond_to`], also returning how the reply was built.
    pub fn respond_verbose(&mut self, input: &str) -> Response {
        let phrase = engine::normalize_input(input, self.options.strip_punctuation);
        let normalized = phrase.render();
        let turn = self.rules.respond(phrase);
        let metrics = turn.metrics;

        let details = TurnDetails {
            flags: metrics.flags,
            substitutions: metrics.substitutions,
            keystack: metrics.keystack,
            steps: metrics.steps.iter().map(step_to_summary).collect(),
            memorized: metrics.memorized,
            unresolved_links: metrics.unresolved_links,
        };

        Response { text: engine::finalize(&turn.phrase), normalized, elapsed: metrics.elapsed, details }
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn step_to_summary(step: &StepMetrics) -> StepSummary {
    StepSummary {
        keyword: step.keyword.clone(),
        rule: step.rule.clone(),
        kind: step.kind,
        link: step.link.clone(),
        preview: step.phrase.chars().take(80).collect(),
    }
}
