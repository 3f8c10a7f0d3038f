// ABOUTME: End-to-end interpreter scenarios covering scripts, solutions, and tests

use santa_script::builtins;
use santa_script::env::Environment;
use santa_script::error::InterpreterError;
use santa_script::parser::Parser;
use santa_script::runner::{self, RunOutcome};

fn run_source(source: &str, allow_slow: bool) -> Result<RunOutcome, InterpreterError> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    let env = Environment::root();
    builtins::register(&env);
    runner::run(&program, &env, allow_slow)
}

#[test]
fn scenario_a_plain_arithmetic_script() {
    match run_source("1 + 2", false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "3"),
        other => panic!("expected Script, got {other:?}"),
    }
}

#[test]
fn scenario_b_map_over_a_list_literal() {
    match run_source("map(|x| x * 2, [1, 2, 3])", false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "[2, 4, 6]"),
        other => panic!("expected Script, got {other:?}"),
    }
}

#[test]
fn scenario_c_bare_part_one_section_solves() {
    match run_source("part_one: { 42 }", false).unwrap() {
        RunOutcome::Solve(report) => assert_eq!(report.part_one.unwrap().value, "42"),
        other => panic!("expected Solve, got {other:?}"),
    }
}

#[test]
fn scenario_d_parenthesis_balance_puzzle() {
    let src = r#"
        input: "()())"
        part_one: { input |> fold(0) |f, d| { if d == "(" { f + 1 } else { f - 1 } } }
    "#;
    match run_source(src, false).unwrap() {
        RunOutcome::Solve(report) => assert_eq!(report.part_one.unwrap().value, "-1"),
        other => panic!("expected Solve, got {other:?}"),
    }
}

#[test]
fn scenario_e_multiplying_a_string_is_a_type_error_at_the_operator_token() {
    let err = run_source("1 * \"x\"", false).unwrap_err();
    match err {
        InterpreterError::Type { line, column, .. } => {
            assert_eq!(line, 0);
            assert_eq!(column, 2);
        }
        other => panic!("expected Type error, got {other:?}"),
    }
}

#[test]
fn scenario_f_slow_test_is_skipped_without_the_flag_and_runs_with_it() {
    let src = r#"
        part_one: { input }
        @slow test: { #{"input": 1, "part_one": 1} }
    "#;
    match run_source(src, false).unwrap() {
        RunOutcome::Test(report) => {
            assert!(report.slow);
            assert!(report.skipped);
        }
        other => panic!("expected Test, got {other:?}"),
    }
    match run_source(src, true).unwrap() {
        RunOutcome::Test(report) => {
            assert!(report.slow);
            assert!(!report.skipped);
            assert!(report.passed());
        }
        other => panic!("expected Test, got {other:?}"),
    }
}

#[test]
fn property_tco_constant_stack_at_large_depth() {
    let src = "
        let count = |n, acc| { if n == 0 { acc } else { count(n - 1, acc + 1) } };
        count(1000000, 0)
    ";
    match run_source(src, false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "1000000"),
        other => panic!("expected Script, got {other:?}"),
    }
}

#[test]
fn property_partial_application_equivalences() {
    let src = "
        let f = |x, y| { x - y };
        let a = f(_, 3)(10);
        let b = f(10, 3);
        let c = f(10)(3);
        a == b && b == c
    ";
    match run_source(src, false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "true"),
        other => panic!("expected Script, got {other:?}"),
    }
}

#[test]
fn property_range_and_sequence_laziness() {
    match run_source("take(5, map(|x| x * 2, 1..))", false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "[2, 4, 6, 8, 10]"),
        other => panic!("expected Script, got {other:?}"),
    }

    let err = run_source("size(1..)", false).unwrap_err();
    assert!(matches!(err, InterpreterError::Domain { .. }));
}

#[test]
fn property_pattern_matching_exhaustiveness() {
    let err = run_source("match 5 { 0 => \"zero\" }", false).unwrap_err();
    assert!(matches!(err, InterpreterError::Domain { .. }));
}

#[test]
fn property_persistence_of_collection_mutating_operations() {
    let src = "
        let c1 = [1, 2, 3];
        let c2 = push(c1, 4);
        c1 == [1, 2, 3] && c2 == [1, 2, 3, 4]
    ";
    match run_source(src, false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "true"),
        other => panic!("expected Script, got {other:?}"),
    }
}

#[test]
fn property_short_circuit_suppresses_the_right_hand_side() {
    let src = "
        let mut fired = false;
        let mark = |x| { fired = true; x };
        let _ = false && mark(true);
        fired
    ";
    match run_source(src, false).unwrap() {
        RunOutcome::Script(result) => assert_eq!(result.value, "false"),
        other => panic!("expected Script, got {other:?}"),
    }
}
