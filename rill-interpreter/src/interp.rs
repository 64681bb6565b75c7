//! Program entry: evaluate the top level, then invoke main.
//!
//! The top level of a program runs once in the root frame. If that
//! leaves a zero-argument function bound to `main`, its body runs in
//! a child frame with `argc` and `argv` bound, and an integer result
//! becomes the process exit status. A program without a main
//! function is still useful for its top-level effects and exits
//! neutrally.

use log::debug;
use rill_parser::ast::Node as Syntax;

use crate::error::{Result, RuntimeError};
use crate::frame::Frame;
use crate::nodes::lower;
use crate::value::Value;

/// Evaluate a parsed program. `argv` carries the program path first,
/// then the arguments passed on the command line.
pub fn run(tree: Syntax, argv: Vec<String>) -> Result<i64> {
    let program = lower(tree)?;
    debug!("lowered: {program}");
    let mut frame = Frame::new();
    program.eval(&mut frame)?;

    match frame.get("main") {
        Some(Value::Func0 { body }) => {
            let mut inner = frame.child();
            inner.set("argc", Value::Int(argv.len() as i64));
            inner.set(
                "argv",
                Value::Array(argv.into_iter().map(Value::Str).collect()),
            );
            let result = body.eval(&mut inner)?;
            debug!("main returned {result}");
            Ok(exit_code(result))
        }
        Some(Value::Func { params, .. }) => Err(RuntimeError::wrong_arity(params.len(), 0)),
        _ => {
            println!("no main function defined, exiting");
            Ok(0)
        }
    }
}

/// Integer results become the exit status, anything else is neutral.
fn exit_code(result: Value) -> i64 {
    match result {
        Value::Int(code) => code,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(source: &str, argv: &[&str]) -> Result<i64> {
        let tree = rill_parser::parse_program(source).unwrap();
        run(tree, argv.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_main_integer_result_is_exit_status() {
        let source = "main = ->\n  3";
        assert_eq!(run_source(source, &["prog"]).unwrap(), 3);
    }

    #[test]
    fn test_main_non_integer_result_is_neutral() {
        let source = "main = ->\n  \"done\"";
        assert_eq!(run_source(source, &["prog"]).unwrap(), 0);
    }

    #[test]
    fn test_missing_main_is_neutral() {
        assert_eq!(run_source("x = 1", &["prog"]).unwrap(), 0);
    }

    #[test]
    fn test_non_function_main_is_treated_as_missing() {
        assert_eq!(run_source("main = 7", &["prog"]).unwrap(), 0);
    }

    #[test]
    fn test_main_with_params_is_arity_error() {
        let err = run_source("main = x -> x", &["prog"]).unwrap_err();
        assert!(matches!(err, RuntimeError::WrongArity { expected: 1, found: 0 }));
    }

    #[test]
    fn test_argc_counts_program_path() {
        let source = "main = ->\n  argc";
        assert_eq!(run_source(source, &["prog", "a", "b"]).unwrap(), 3);
    }

    #[test]
    fn test_argv_entries_are_strings() {
        let source = "main = ->\n  assert argv[1] == \"first\"\n  0";
        assert_eq!(run_source(source, &["prog", "first"]).unwrap(), 0);
    }

    #[test]
    fn test_top_level_runs_before_main() {
        let source = "x = 40\nmain = ->\n  x + 2";
        assert_eq!(run_source(source, &["prog"]).unwrap(), 42);
    }

    #[test]
    fn test_top_level_errors_propagate() {
        let err = run_source("assert 1 == 2", &["prog"]).unwrap_err();
        assert!(matches!(err, RuntimeError::AssertionFailed { .. }));
    }
}
