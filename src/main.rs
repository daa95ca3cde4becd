mod debug_report;

use eliza::{Eliza, Options, ScriptError};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "ELIZA_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    let options = Options { seed: config.seed, ..Options::default() };
    let mut eliza = match load(&config, options) {
        Ok(eliza) => eliza,
        Err(err) => {
            eprintln!("error: {}", report(&err));
            std::process::exit(1);
        }
    };

    let result = match &config.replay {
        Some(path) => replay(&mut eliza, path, &config),
        None => repl(&mut eliza, &config),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    script: Option<PathBuf>,
    replay: Option<PathBuf>,
    seed: Option<u64>,
    trace: bool,
    color: bool,
    verbose: u8,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut config = CliConfig {
        script: None,
        replay: None,
        seed: None,
        trace: false,
        color: io::stdout().is_terminal(),
        verbose: 0,
    };
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("eliza {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => config.color = true,
            "--no-color" => config.color = false,
            "--trace" => config.trace = true,
            "-v" => config.verbose = config.verbose.saturating_add(1),
            "-vv" => config.verbose = config.verbose.saturating_add(2),
            "--script" => {
                let value = args.next().ok_or_else(|| "error: --script expects a path".to_string())?;
                config.script = Some(PathBuf::from(value));
            }
            "--replay" => {
                let value = args.next().ok_or_else(|| "error: --replay expects a path".to_string())?;
                config.replay = Some(PathBuf::from(value));
            }
            "--seed" => {
                let value = args.next().ok_or_else(|| "error: --seed expects a value".to_string())?;
                config.seed = Some(parse_seed(&value)?);
            }
            _ if arg.starts_with("--script=") => {
                config.script = Some(PathBuf::from(arg.trim_start_matches("--script=")));
            }
            _ if arg.starts_with("--replay=") => {
                config.replay = Some(PathBuf::from(arg.trim_start_matches("--replay=")));
            }
            _ if arg.starts_with("--seed=") => {
                config.seed = Some(parse_seed(arg.trim_start_matches("--seed="))?);
            }
            _ => return Err(format!("error: unknown argument '{arg}'\n\n{}", help_text())),
        }
    }

    Ok(config)
}

fn parse_seed(value: &str) -> Result<u64, String> {
    value.parse().map_err(|_| format!("error: invalid --seed '{value}' (expected an unsigned integer)"))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("eliza=warn")),
        1 => EnvFilter::new("eliza=info"),
        _ => EnvFilter::new("eliza=debug"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

fn load(config: &CliConfig, options: Options) -> Result<Eliza, ScriptError> {
    match &config.script {
        Some(path) => Ok(Eliza::from_path(path)?.with_options(options)),
        None => Ok(Eliza::doctor_with(options)),
    }
}

/// Error message with its chain of causes.
fn report(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    out
}

fn repl(eliza: &mut Eliza, config: &CliConfig) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", eliza.greet())?;
    stdout.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        answer(eliza, &line, config, &mut stdout)?;
    }

    writeln!(stdout, "GOODBYE")?;
    Ok(())
}

/// Feed a recorded conversation through the session. Lines starting with `#`
/// are comments.
fn replay(eliza: &mut Eliza, path: &Path, config: &CliConfig) -> io::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", eliza.greet())?;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        writeln!(stdout, "> {line}")?;
        answer(eliza, line, config, &mut stdout)?;
    }
    Ok(())
}

fn answer(eliza: &mut Eliza, line: &str, config: &CliConfig, out: &mut impl Write) -> io::Result<()> {
    if config.trace {
        let res = eliza.respond_verbose(line);
        debug_report::print_turn(out, line, &res, config.color)?;
        write!(out, "{}", res.text)?;
    } else {
        write!(out, "{}", eliza.respond_to(line))?;
    }
    out.flush()
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "eliza {version}

Talk to a script-driven ELIZA. Without --script the 1966 DOCTOR script is used.

Usage:
  eliza [OPTIONS]                    Interactive session on stdin/stdout.
  eliza [OPTIONS] --replay <file>    Replay a recorded conversation.

Options:
  --script <path>     Load rules from a script file.
  --replay <path>     Read user lines from a file ('#' lines are comments).
  --seed <n>          Seed greeting selection for reproducible sessions.
  --trace             Print a per-turn report before each reply.
  --color             Force ANSI color output.
  --no-color          Disable ANSI color output.
  -v, -vv             Log engine events to stderr (info, debug).
                      Without -v the {log_env} variable is honoured.
  -h, --help          Show this help message.
  -V, --version       Print version information.

Exit codes:
  0  Success.
  1  Script could not be loaded, or an I/O error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
