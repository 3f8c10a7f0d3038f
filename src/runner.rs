// ABOUTME: Section-driven solution runner: solve mode, test mode, script mode

use crate::ast::{Block, Program, Statement, StatementKind};
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::eval::run_block_to_value;
use crate::value::Value;
use serde::Serialize;
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct PartResult {
    pub value: String,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub part_one: Option<PartResult>,
    pub part_two: Option<PartResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartCheck {
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub slow: bool,
    pub skipped: bool,
    pub part_one: Option<PartCheck>,
    pub part_two: Option<PartCheck>,
}

impl TestReport {
    /// A test with no checked parts or any failed check did not pass.
    pub fn passed(&self) -> bool {
        !self.skipped
            && self.part_one.as_ref().is_none_or(|c| c.passed)
            && self.part_two.as_ref().is_none_or(|c| c.passed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum RunOutcome {
    Script(PartResult),
    Solve(SolveReport),
    Test(TestReport),
}

/// `true` when `statements` contains a top-level (possibly `@slow`-annotated)
/// `Section` whose name is `name`.
fn has_section(statements: &[Statement], name: &str) -> bool {
    statements.iter().any(|s| section_name(s) == Some(name))
}

fn section_name(stmt: &Statement) -> Option<&str> {
    match &stmt.kind {
        StatementKind::Section { name, .. } => Some(name),
        StatementKind::Annotated { statement, .. } => section_name(statement),
        _ => None,
    }
}

/// `true` when the top-level `test` section (if any) carries the `@slow` marker.
fn test_is_slow(statements: &[Statement]) -> bool {
    statements.iter().any(|s| match &s.kind {
        StatementKind::Annotated { annotation, statement } => annotation == "slow" && section_name(statement) == Some("test"),
        _ => false,
    })
}

/// Runs a parsed source. `allow_slow` corresponds to the CLI's `--slow` flag.
pub fn run(program: &Program, root_env: &Rc<Environment>, allow_slow: bool) -> Result<RunOutcome, InterpreterError> {
    let block = Block { statements: program.statements.clone() };

    let has_test = has_section(&program.statements, "test");
    let has_solution = has_section(&program.statements, "part_one") || has_section(&program.statements, "part_two");

    if !has_test && !has_solution {
        log::info!("running in script mode");
        let start = Instant::now();
        let value = run_block_to_value(&block, root_env)?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        log::debug!("script evaluated in {duration_ms:.3}ms");
        return Ok(RunOutcome::Script(PartResult { value: value.inspect(), duration_ms }));
    }

    // Registers every top-level `let`/`Section` (sections only store their body; they
    // are not evaluated here) so that both solve and test mode see the same bindings.
    run_block_to_value(&block, root_env)?;

    if has_test {
        log::info!("running in test mode");
        let slow = test_is_slow(&program.statements);
        let skipped = slow && !allow_slow;
        if skipped {
            log::info!("test section skipped (@slow without --slow)");
            return Ok(RunOutcome::Test(TestReport { slow, skipped, part_one: None, part_two: None }));
        }

        let test_section = root_env.get_section("test").expect("has_section confirmed the test section is present");
        let expectations = run_block_to_value(&test_section.body, &test_section.env)?;
        let Value::Dict(expectations) = expectations else {
            return Err(InterpreterError::type_error("test", "Dict", expectations.type_name(), 0, 0));
        };
        let input = get_dict_field(&expectations, "input").unwrap_or(Value::Nil);

        let part_one = get_dict_field(&expectations, "part_one")
            .map(|expected| check_part(root_env, "part_one", input.clone(), expected))
            .transpose()?;
        let part_two = get_dict_field(&expectations, "part_two")
            .map(|expected| check_part(root_env, "part_two", input.clone(), expected))
            .transpose()?;

        return Ok(RunOutcome::Test(TestReport { slow, skipped: false, part_one, part_two }));
    }

    log::info!("running in solve mode");
    let input = match root_env.get_section("input") {
        Some(input_section) => run_block_to_value(&input_section.body, &input_section.env)?,
        None => Value::Nil,
    };

    let part_one = root_env.get_section("part_one").map(|s| run_part("part_one", &s.body, &s.env, input.clone())).transpose()?;
    let part_two = root_env.get_section("part_two").map(|s| run_part("part_two", &s.body, &s.env, input)).transpose()?;

    Ok(RunOutcome::Solve(SolveReport { part_one, part_two }))
}

fn run_part(name: &str, body: &Block, env: &Rc<Environment>, input: Value) -> Result<PartResult, InterpreterError> {
    let scope = Environment::child(env);
    scope.declare("input".to_string(), input, false)?;
    let start = Instant::now();
    let value = run_block_to_value(body, &scope)?;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    log::debug!("{name} evaluated in {duration_ms:.3}ms");
    Ok(PartResult { value: value.inspect(), duration_ms })
}

fn check_part(root_env: &Rc<Environment>, name: &str, input: Value, expected: Value) -> Result<PartCheck, InterpreterError> {
    let section = root_env.get_section(name).ok_or_else(|| InterpreterError::name(format!("test expects a {name} section but none is declared"), 0, 0))?;
    let actual = run_part(name, &section.body, &section.env, input)?.value;
    let expected = expected.inspect();
    let passed = actual == expected;
    Ok(PartCheck { expected, actual, passed })
}

fn get_dict_field(dict: &crate::value::Dict, name: &str) -> Option<Value> {
    dict.iter().find(|(k, _)| matches!(&k.0, Value::String(s) if s.as_ref() == name)).map(|(_, v)| v.clone())
}
