//! Arithmetic operators: +, -, *, /, %
//!
//! Bound as ordinary, shadowable identifiers — the parser desugars
//! `a + b` into `Call{callee: Identifier("+"), args: [a, b]}`, so these are looked
//! up and invoked exactly like any user-defined function.

use super::numeric::{self, operand};
use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{Arity, BuiltinFunction, Value};
use std::rc::Rc;

/// Adds two numbers. Two `Integer`s stay an `Integer`; mixing in a `Decimal`
/// promotes the result to `Decimal`.
///
/// # Examples
///
/// ```text
/// 1 + 2      => 3
/// 1 + 2.5    => 3.5
/// ```
pub fn add(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = operand(&args[0], "+", loc)?;
    let b = operand(&args[1], "+", loc)?;
    Ok(numeric::add(a, b))
}

/// Subtracts the second number from the first. Unary negation is handled
/// directly by the evaluator's `Prefix` dispatch, not through this identifier.
pub fn sub(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = operand(&args[0], "-", loc)?;
    let b = operand(&args[1], "-", loc)?;
    Ok(numeric::sub(a, b))
}

/// Multiplies two numbers.
pub fn mul(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = operand(&args[0], "*", loc)?;
    let b = operand(&args[1], "*", loc)?;
    Ok(numeric::mul(a, b))
}

/// Divides the first number by the second. Two `Integer`s stay an `Integer` when
/// the division is exact, otherwise the result promotes to `Decimal`.
///
/// # Examples
///
/// ```text
/// 10 / 2     => 5
/// 10 / 3     => 3.3333333333333335
/// ```
pub fn div(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = operand(&args[0], "/", loc)?;
    let b = operand(&args[1], "/", loc)?;
    numeric::div(a, b, loc)
}

/// Mathematical modulo: the result always takes the sign of the divisor, unlike Rust's built-in `%` operator.
///
/// # Examples
///
/// ```text
/// 5 % 3    => 2
/// -1 % 3   => 2
/// ```
pub fn modulo(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = operand(&args[0], "%", loc)?;
    let b = operand(&args[1], "%", loc)?;
    numeric::modulo(a, b, loc)
}

pub fn register(env: &Rc<Environment>) {
    env.declare("+".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "+", arity: Arity::Exact(2), func: add })), false).unwrap();
    env.declare("-".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "-", arity: Arity::Exact(2), func: sub })), false).unwrap();
    env.declare("*".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "*", arity: Arity::Exact(2), func: mul })), false).unwrap();
    env.declare("/".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "/", arity: Arity::Exact(2), func: div })), false).unwrap();
    env.declare("%".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "%", arity: Arity::Exact(2), func: modulo })), false).unwrap();
}
