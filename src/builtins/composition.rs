//! Pipeline and composition: `|>`, `>>`
//!
//! Both desugar the same way every other binary operator does — the parser emits
//! `Call{callee: Identifier("|>"), args: [x, f]}` — so they're ordinary, shadowable
//! `BuiltinFunction`s, not structural evaluator cases.

use crate::ast::{Block, Expression, ExpressionKind, Pattern, PatternKind, SourceLocation, Statement, StatementKind};
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::eval::call;
use crate::value::{Arity, BuiltinFunction, FunctionValue, Value};
use std::rc::Rc;

/// `x |> f` ≡ `f(x)`.
pub fn pipe(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    call(&args[1], vec![args[0].clone()], env, loc)
}

/// `(f >> g)(x)` ≡ `g(f(x))`. Built as a one-parameter user `Function` whose
/// body calls `g(f(x))`, closing over `f` and `g` in a fresh child scope — the same
/// representation a hand-written `|x| g(f(x))` closure would produce.
pub fn compose(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let scope = Environment::child(env);
    scope.declare("f".to_string(), args[0].clone(), false)?;
    scope.declare("g".to_string(), args[1].clone(), false)?;

    let ident = |name: &str| Expression::new(ExpressionKind::Identifier(name.to_string()), loc);
    let inner_call = Expression::new(ExpressionKind::Call { callee: Box::new(ident("f")), args: vec![ident("x")] }, loc);
    let outer_call = Expression::new(ExpressionKind::Call { callee: Box::new(ident("g")), args: vec![inner_call] }, loc);
    let body = Block { statements: vec![Statement::new(StatementKind::Expression(outer_call), loc)] };
    let param = Pattern::new(PatternKind::Identifier("x".to_string()), loc);

    Ok(Value::Function(Rc::new(FunctionValue { params: vec![param], body, env: scope })))
}

pub fn register(env: &Rc<Environment>) {
    env.declare("|>".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "|>", arity: Arity::Exact(2), func: pipe })), false).unwrap();
    env.declare(">>".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: ">>", arity: Arity::Exact(2), func: compose })), false).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn loc() -> SourceLocation {
        SourceLocation::new(0, 0)
    }

    fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    fn increment() -> Value {
        Value::BuiltinFunction(Rc::new(BuiltinFunction {
            name: "inc",
            arity: Arity::Exact(1),
            func: |args, _env, _loc| match &args[0] {
                Value::Integer(n) => Ok(Value::Integer(n + 1)),
                _ => unreachable!(),
            },
        }))
    }

    fn double() -> Value {
        Value::BuiltinFunction(Rc::new(BuiltinFunction {
            name: "double",
            arity: Arity::Exact(1),
            func: |args, _env, _loc| match &args[0] {
                Value::Integer(n) => Ok(Value::Integer(n * 2)),
                _ => unreachable!(),
            },
        }))
    }

    #[test]
    fn pipe_applies_the_right_hand_function_to_the_left_hand_value() {
        let env = Environment::root();
        let v = pipe(&[int(5), increment()], &env, loc()).unwrap();
        assert!(v.equals(&int(6)));
    }

    #[test]
    fn compose_applies_left_then_right() {
        let env = Environment::root();
        let composed = compose(&[increment(), double()], &env, loc()).unwrap();
        let v = call(&composed, vec![int(5)], &env, loc()).unwrap();
        assert!(v.equals(&int(12)));
    }
}
