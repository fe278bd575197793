use std::fs;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tinsel::{run, run_tests, ConsoleIo, RunOutcome};

/// tinsel is a small functional, expression-oriented language for solving
/// per-puzzle coding challenges.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Evaluate an inline script instead of a file.
    #[arg(short, long, value_name = "CODE", conflicts_with = "source")]
    eval: Option<String>,

    /// Run the solution's test sections instead of solving.
    #[arg(short, long)]
    test: bool,

    /// Include tests annotated @slow.
    #[arg(short, long)]
    slow: bool,

    /// Path to the solution file.
    source: Option<String>,
}

fn main() -> ExitCode {
    // The exit contract is part of the interface: 0 ok, 1 usage,
    // 2 parse/runtime error, 3 failing tests.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Let clap render --help and --version as normal output.
            if e.use_stderr() {
                eprint!("{e}");
                return ExitCode::from(1);
            }
            print!("{e}");
            return ExitCode::SUCCESS;
        },
    };

    let source = match (&args.eval, &args.source) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("failed to read '{path}': {e}");
                return ExitCode::from(1);
            },
        },
        (None, None) => {
            eprintln!("nothing to run; pass a source file or -e <code>");
            return ExitCode::from(1);
        },
    };

    let io = Rc::new(ConsoleIo::new());
    if args.test {
        run_test_mode(&source, io, args.slow)
    } else {
        run_solve_mode(&source, io)
    }
}

fn run_solve_mode(source: &str, io: Rc<ConsoleIo>) -> ExitCode {
    match run(source, io) {
        Ok(RunOutcome::Script { value, duration }) => {
            println!("{value} ({}ms)", duration.as_millis());
            ExitCode::SUCCESS
        },
        Ok(RunOutcome::Solution { parts }) => {
            for part in parts {
                println!("{}: {} ({}ms)", part.name, part.value, part.duration.as_millis());
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        },
    }
}

fn run_test_mode(source: &str, io: Rc<ConsoleIo>, include_slow: bool) -> ExitCode {
    let results = match run_tests(source, io, include_slow) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        },
    };

    let mut failed = false;
    for result in &results {
        if result.skipped {
            println!("{}: skipped (slow)", result.name);
            continue;
        }
        if result.passed() {
            println!("{}: passed", result.name);
            continue;
        }
        failed = true;
        println!("{}: failed", result.name);
        for failure in &result.failures {
            println!("  {}: expected {}, got {}", failure.part, failure.expected, failure.actual);
        }
    }

    if failed { ExitCode::from(3) } else { ExitCode::SUCCESS }
}
