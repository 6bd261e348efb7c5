//! Porous command-line interpreter.
//!
//! Usage:
//!   porous <file.por>     Run the entry point of a program
//!   porous -e <code>      Evaluate statements

use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};

use log::{LevelFilter, Log, Metadata, Record};
use porous::{Interpreter, InterpreterConfig};

const USAGE: &str = "\
Usage: porous [OPTIONS] (FILE | -e CODE)

Arguments:
  [FILE]  Porous program whose entry point is run

Options:
  -e <CODE>        Evaluate CODE as statements
  --entry <NAME>   Global to run (default: main, or `entry` from the config)
  --config <FILE>  Read interpreter settings from a TOML file
  -v, -vv          Log debug / trace output to stderr
  -h, --help       Print this help message

The remaining stack is printed one `value:type` per line.";

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

enum Input {
    File(String),
    Code(String),
}

struct Options {
    input: Input,
    entry: Option<String>,
    config: Option<String>,
    verbosity: u8,
}

enum Action {
    Run(Options),
    Help,
}

fn parse_args(args: &[String]) -> Result<Action, String> {
    let mut input = None;
    let mut entry = None;
    let mut config = None;
    let mut verbosity = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Action::Help),
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = 2,
            "-e" => {
                let code = iter.next().ok_or("-e needs CODE")?;
                input = Some(Input::Code(code.clone()));
            }
            "--entry" => entry = Some(iter.next().ok_or("--entry needs NAME")?.clone()),
            "--config" => config = Some(iter.next().ok_or("--config needs FILE")?.clone()),
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}\n\n{USAGE}")),
            file => input = Some(Input::File(file.to_string())),
        }
    }

    let input = input.ok_or_else(|| USAGE.to_string())?;
    Ok(Action::Run(Options {
        input,
        entry,
        config,
        verbosity,
    }))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn run(options: Options) -> Result<(), String> {
    let config = match &options.config {
        Some(path) => InterpreterConfig::load(Path::new(path)).map_err(|e| e.to_string())?,
        None => InterpreterConfig::default(),
    };
    let entry = options.entry.clone().unwrap_or_else(|| config.entry.clone());
    let mut interp = Interpreter::with_config(config);

    let (source, result) = match &options.input {
        Input::Code(code) => (code.clone(), interp.eval(code)),
        Input::File(path) => {
            let source =
                fs::read_to_string(path).map_err(|e| format!("error reading {path}: {e}"))?;
            let result = interp.load(&source).and_then(|()| interp.run(&entry));
            (source, result)
        }
    };
    result.map_err(|e| e.to_diagnostic().render(&source))?;

    let mut stdout = io::stdout().lock();
    for line in interp.typed_stack() {
        writeln!(stdout, "{line}").map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        Ok(Action::Help) => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Action::Run(options)) => {
            init_logging(options.verbosity);
            match run(options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprint!("{e}");
                    if !e.ends_with('\n') {
                        eprintln!();
                    }
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
