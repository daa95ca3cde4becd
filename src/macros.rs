/// Compile a regex literal once and hand out a `&'static Regex`.
///
/// Script grammar patterns are literals, so a bad one is a bug caught by the
/// first test that touches it.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("invalid regex literal"));
        &*RE
    }};
}
