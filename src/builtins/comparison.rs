//! Comparison operators: ==, !=, <, >, <=, >=
//!
//! `==`/`!=` use the Value tier's structural equality; the ordering
//! operators use numeric/lexicographic comparison with Integer/Decimal promotion
//!.

use super::numeric::compare;
use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{Arity, BuiltinFunction, Value};
use std::cmp::Ordering;
use std::rc::Rc;

pub fn eq(args: &[Value], _env: &Rc<Environment>, _loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(args[0].equals(&args[1])))
}

pub fn neq(args: &[Value], _env: &Rc<Environment>, _loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(!args[0].equals(&args[1])))
}

pub fn lt(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(compare(&args[0], &args[1], "<", loc)? == Ordering::Less))
}

pub fn gt(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(compare(&args[0], &args[1], ">", loc)? == Ordering::Greater))
}

pub fn lte(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(compare(&args[0], &args[1], "<=", loc)? != Ordering::Greater))
}

pub fn gte(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::Boolean(compare(&args[0], &args[1], ">=", loc)? != Ordering::Less))
}

pub fn register(env: &Rc<Environment>) {
    env.declare("==".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "==", arity: Arity::Exact(2), func: eq })), false).unwrap();
    env.declare("!=".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "!=", arity: Arity::Exact(2), func: neq })), false).unwrap();
    env.declare("<".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "<", arity: Arity::Exact(2), func: lt })), false).unwrap();
    env.declare(">".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: ">", arity: Arity::Exact(2), func: gt })), false).unwrap();
    env.declare("<=".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "<=", arity: Arity::Exact(2), func: lte })), false).unwrap();
    env.declare(">=".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: ">=", arity: Arity::Exact(2), func: gte })), false).unwrap();
}
