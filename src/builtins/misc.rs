//! Miscellaneous built-ins: `type`, `assert`

use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{Arity, BuiltinFunction, Value};
use std::rc::Rc;

/// `type(x)`: the type-name string the evaluator already uses in error messages.
pub fn type_of(args: &[Value], _env: &Rc<Environment>, _loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::String(Rc::from(args[0].type_name())))
}

/// `assert(cond, msg)`: a `DomainError` carrying `msg` when `cond` is falsy.
pub fn assert(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    if args[0].is_truthy() {
        return Ok(Value::Nil);
    }
    let message = match &args[1] {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    };
    Err(InterpreterError::domain(message, loc.line, loc.column))
}

pub fn register(env: &Rc<Environment>) {
    env.declare("type".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "type", arity: Arity::Exact(1), func: type_of })), false).unwrap();
    env.declare("assert".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "assert", arity: Arity::Exact(2), func: assert })), false).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn loc() -> SourceLocation {
        SourceLocation::new(0, 0)
    }

    #[test]
    fn type_of_names_the_runtime_tier() {
        let env = Environment::root();
        let v = type_of(&[Value::Integer(BigInt::from(1))], &env, loc()).unwrap();
        assert!(v.equals(&Value::String(Rc::from("Integer"))));
    }

    #[test]
    fn assert_passes_through_on_truthy_condition() {
        let env = Environment::root();
        let v = assert(&[Value::Boolean(true), Value::String(Rc::from("unused"))], &env, loc()).unwrap();
        assert!(matches!(v, Value::Nil));
    }

    #[test]
    fn assert_raises_a_domain_error_with_the_message_on_falsy_condition() {
        let env = Environment::root();
        let err = assert(&[Value::Boolean(false), Value::String(Rc::from("must be positive"))], &env, loc()).unwrap_err();
        match err {
            InterpreterError::Domain { message, .. } => assert_eq!(message, "must be positive"),
            other => panic!("expected Domain, got {other:?}"),
        }
    }
}
