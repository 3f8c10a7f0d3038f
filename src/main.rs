// ABOUTME: Thin CLI front end wiring argument parsing to the runner

use clap::Parser;
use santa_script::config::VERSION;
use santa_script::env::Environment;
use santa_script::error::InterpreterError;
use santa_script::io_handle::{IoHandle, IoHandleConfig};
use santa_script::parser::Parser as SourceParser;
use santa_script::builtins;
use santa_script::runner::{self, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for a small functional language for solving
/// per-puzzle coding challenges.
#[derive(Parser, Debug)]
#[command(name = "santa-script")]
#[command(version = VERSION)]
#[command(about = "Evaluate a script, or solve/test an Advent-of-Code-style puzzle source")]
struct CliArgs {
    /// Source file to run. Solve mode if it declares part_one/part_two, test mode if
    /// it declares a test section, otherwise evaluated as a plain script.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Evaluate SOURCE directly instead of reading a file.
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    eval: Option<String>,

    /// Run @slow-annotated test sections instead of skipping them.
    #[arg(long = "slow")]
    slow: bool,

    /// Filesystem root `read` may resolve paths under (repeatable).
    #[arg(long = "fs-root", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_roots: Vec<PathBuf>,

    /// Maximum file size in bytes `read` will accept.
    #[arg(long = "max-file-size", value_name = "BYTES", default_value = "10485760")]
    max_file_size: u64,

    /// Allow `read` to resolve http(s):// URLs.
    #[arg(long = "allow-net")]
    allow_net: bool,

    /// Restrict network resolution to hosts containing ADDR (repeatable).
    #[arg(long = "net-allow", value_name = "ADDR", action = clap::ArgAction::Append)]
    net_allow: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("usage error: {message}");
            return ExitCode::from(1);
        }
    };

    let io_config = IoHandleConfig {
        fs_roots: if args.fs_roots.is_empty() { IoHandleConfig::default().fs_roots } else { args.fs_roots.clone() },
        max_file_size: args.max_file_size,
        allow_net: args.allow_net,
        net_allow: args.net_allow.clone(),
    };
    let io_handle = match IoHandle::new(io_config) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("usage error: {e}");
            return ExitCode::from(1);
        }
    };

    let env = Environment::root();
    builtins::register(&env);
    env.set_io_handle(std::rc::Rc::new(io_handle));

    match run(&source, &env, args.slow) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            ExitCode::from(2)
        }
    }
}

fn read_source(args: &CliArgs) -> Result<String, String> {
    match (&args.eval, &args.script) {
        (Some(_), Some(_)) => Err("pass either -e/--eval or a script file, not both".to_string()),
        (Some(src), None) => Ok(src.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display())),
        (None, None) => Err("expected -e/--eval <SOURCE> or a script file".to_string()),
    }
}

fn run(source: &str, env: &std::rc::Rc<Environment>, allow_slow: bool) -> Result<ExitCode, InterpreterError> {
    let mut parser = SourceParser::new(source)?;
    let program = parser.parse_program()?;
    match runner::run(&program, env, allow_slow)? {
        RunOutcome::Script(result) => {
            println!("{}", result.value);
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Solve(report) => {
            if let Some(part) = &report.part_one {
                println!("part_one: {} ({:.3}ms)", part.value, part.duration_ms);
            }
            if let Some(part) = &report.part_two {
                println!("part_two: {} ({:.3}ms)", part.value, part.duration_ms);
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Test(report) => {
            print_test_report(&report);
            if report.skipped || report.passed() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::from(3)) }
        }
    }
}

fn print_test_report(report: &runner::TestReport) {
    if report.skipped {
        println!("test: skipped (slow)");
        return;
    }
    for (name, check) in [("part_one", &report.part_one), ("part_two", &report.part_two)] {
        if let Some(check) = check {
            let status = if check.passed { "ok" } else { "FAILED" };
            println!("{name}: {status} (expected {}, got {})", check.expected, check.actual);
        }
    }
}

fn report_error(err: &InterpreterError) {
    eprintln!("error: {err} at {}:{}", err.line(), err.column());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_and_script_are_mutually_exclusive() {
        let args = CliArgs {
            script: Some(PathBuf::from("x.ss")),
            eval: Some("1".to_string()),
            slow: false,
            fs_roots: vec![],
            max_file_size: 1024,
            allow_net: false,
            net_allow: vec![],
        };
        assert!(read_source(&args).is_err());
    }

    #[test]
    fn neither_eval_nor_script_is_a_usage_error() {
        let args = CliArgs {
            script: None,
            eval: None,
            slow: false,
            fs_roots: vec![],
            max_file_size: 1024,
            allow_net: false,
            net_allow: vec![],
        };
        assert!(read_source(&args).is_err());
    }

    #[test]
    fn eval_source_runs_as_a_script_and_succeeds() {
        let env = Environment::root();
        builtins::register(&env);
        let code = run("1 + 2", &env, false).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn a_type_error_surfaces_as_an_error_result() {
        let env = Environment::root();
        builtins::register(&env);
        let err = run("1 * \"x\"", &env, false).unwrap_err();
        assert!(matches!(err, InterpreterError::Type { .. }));
    }
}
