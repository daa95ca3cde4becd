use eliza::{Response, StepSummary};
use std::io::{self, Write};

mod ansi {
    const RESET: &str = "\x1b[0m";
    const DIM: &str = "\x1b[2m";
    const BOLD: &str = "\x1b[1m";
    const GRAY: &str = "\x1b[90m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";

    /// ANSI styling that collapses to plain text when colour is off.
    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        fn wrap(&self, s: &str, code: &str) -> String {
            if self.enabled { format!("{code}{s}{RESET}") } else { s.to_string() }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            self.wrap(s.as_ref(), color)
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), DIM)
        }

        /// Section header line, e.g. `━━━ Steps ━━━`.
        pub fn section(&self, title: &str) -> String {
            self.wrap(&format!("━━━ {title} ━━━"), GRAY)
        }

        /// `[idx]` row marker.
        pub fn index(&self, idx: usize) -> String {
            self.wrap(&format!("[{idx}]"), GRAY)
        }
    }
}

pub fn print_turn(out: &mut impl Write, input: &str, res: &Response, color: bool) -> io::Result<()> {
    let palette = ansi::Palette::new(color);
    let details = &res.details;

    writeln!(out, "\n{}", palette.bold(palette.paint(format!("⚙  Input: \"{}\"", input.trim()), ansi::CYAN)))?;
    writeln!(out, "  {} {}", palette.dim("normalized:"), res.normalized)?;

    writeln!(out, "\n{}", palette.section("Keystack"))?;
    if details.keystack.is_empty() {
        writeln!(out, "  {}", palette.dim("no keywords"))?;
    } else {
        let keys: Vec<String> = details.keystack.iter().map(|k| palette.paint(k, ansi::BLUE)).collect();
        writeln!(out, "  {}", keys.join(palette.dim(" → ").as_str()))?;
    }
    writeln!(out, "  {} {}", palette.dim("substitutions:"), palette.paint(details.substitutions.to_string(), ansi::YELLOW))?;

    writeln!(out, "\n{}", palette.section("Steps"))?;
    if details.steps.is_empty() {
        writeln!(out, "  {}", palette.dim("none"))?;
    }
    for (idx, step) in details.steps.iter().enumerate() {
        print_step(out, idx, step, &palette)?;
    }

    if !details.memorized.is_empty() || !details.unresolved_links.is_empty() {
        writeln!(out, "\n{}", palette.section("Memory"))?;
        for memory in &details.memorized {
            writeln!(out, "  {} {}", palette.paint("stored", ansi::GREEN), memory)?;
        }
        for link in &details.unresolved_links {
            writeln!(out, "  {} {}", palette.paint("unresolved link", ansi::RED), link)?;
        }
    }

    let flags: Vec<&str> = details.flags.iter_names().map(|(name, _)| name).collect();
    writeln!(out, "\n{}", palette.section("Turn"))?;
    writeln!(
        out,
        "  {} {}  │  {} {}",
        palette.dim("flags:"),
        palette.paint(if flags.is_empty() { "-".to_string() } else { flags.join(" | ") }, ansi::YELLOW),
        palette.dim("elapsed:"),
        palette.paint(format!("{:?}", res.elapsed), ansi::GREEN),
    )?;
    writeln!(out)
}

fn print_step(out: &mut impl Write, idx: usize, step: &StepSummary, palette: &ansi::Palette) -> io::Result<()> {
    let link = match &step.link {
        Some(link) => format!(" {} {}", palette.dim("→"), palette.paint(link, ansi::CYAN)),
        None => String::new(),
    };
    writeln!(
        out,
        "  {} {} {} {}{}",
        palette.index(idx),
        palette.bold(palette.paint(&step.keyword, ansi::BLUE)),
        palette.dim("│"),
        palette.paint(step.kind, ansi::YELLOW),
        link,
    )?;
    writeln!(out, "      {} {}", palette.dim("rule:"), palette.paint(&step.rule, ansi::CYAN))?;
    writeln!(out, "      {}", palette.dim(&step.preview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eliza::Eliza;

    #[test]
    fn plain_palette_adds_no_escapes() {
        let palette = ansi::Palette::new(false);
        assert_eq!(palette.section("Steps"), "━━━ Steps ━━━");
        assert_eq!(palette.index(2), "[2]");
        assert_eq!(palette.paint("X", ansi::RED), "X");
        assert_eq!(ansi::Palette::new(true).bold("X"), "\x1b[1mX\x1b[0m");
    }

    #[test]
    fn report_lists_keystack_and_links() {
        let res = Eliza::doctor().respond_verbose("machines");
        let mut out = Vec::new();
        print_turn(&mut out, "machines", &res, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("━━━ Keystack ━━━"));
        assert!(text.contains("[0] MACHINES │ equivalence → COMPUTER"), "{text}");
        assert!(text.contains("KEYWORDS | LINKED"), "{text}");
        assert!(!text.contains('\x1b'));
    }
}
