//! String operations: split, trim, int, str

use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{Arity, BuiltinFunction, Value};
use std::rc::Rc;

fn expect_string<'a>(v: &'a Value, op: &str, loc: SourceLocation) -> Result<&'a str, InterpreterError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(InterpreterError::type_error(op, "String", other.type_name(), loc.line, loc.column)),
    }
}

/// `split(s, sep)`: splits `s` on every occurrence of `sep`, returning a `List` of
/// `String`s.
pub fn split(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let s = expect_string(&args[0], "split", loc)?;
    let sep = expect_string(&args[1], "split", loc)?;
    let parts: im::Vector<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::String(Rc::from(c.to_string().as_str()))).collect()
    } else {
        s.split(sep).map(|p| Value::String(Rc::from(p))).collect()
    };
    Ok(Value::List(parts))
}

/// `trim(s)`: strips leading/trailing whitespace.
pub fn trim(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let s = expect_string(&args[0], "trim", loc)?;
    Ok(Value::String(Rc::from(s.trim())))
}

/// `int(s)`: parses a `String` into an `Integer`. A `DomainError` if `s`
/// isn't a valid base-10 integer literal.
pub fn int(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match &args[0] {
        Value::String(s) => s
            .trim()
            .parse::<num_bigint::BigInt>()
            .map(Value::Integer)
            .map_err(|_| InterpreterError::domain(format!("int: {s:?} is not a valid integer"), loc.line, loc.column)),
        Value::Integer(n) => Ok(Value::Integer(n.clone())),
        Value::Decimal(d) => Ok(Value::Integer(num_bigint::BigInt::from(*d as i64))),
        other => Err(InterpreterError::type_error("int", "String, Integer or Decimal", other.type_name(), loc.line, loc.column)),
    }
}

/// `str(x)`: formats any value the same way string interpolation does.
pub fn str_of(args: &[Value], _env: &Rc<Environment>, _loc: SourceLocation) -> Result<Value, InterpreterError> {
    Ok(Value::String(Rc::from(args[0].to_string().as_str())))
}

pub fn register(env: &Rc<Environment>) {
    let mut reg = |name: &'static str, arity: Arity, func: crate::value::NativeFn| {
        env.declare(name.to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name, arity, func })), false).unwrap();
    };
    reg("split", Arity::Exact(2), split);
    reg("trim", Arity::Exact(1), trim);
    reg("int", Arity::Exact(1), int);
    reg("str", Arity::Exact(1), str_of);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(0, 0)
    }

    #[test]
    fn split_on_comma_produces_parts() {
        let env = Environment::root();
        let v = split(&[Value::String(Rc::from("a,b,c")), Value::String(Rc::from(","))], &env, loc()).unwrap();
        assert!(v.equals(&Value::List(im::vector![
            Value::String(Rc::from("a")),
            Value::String(Rc::from("b")),
            Value::String(Rc::from("c")),
        ])));
    }

    #[test]
    fn trim_strips_surrounding_whitespace() {
        let env = Environment::root();
        let v = trim(&[Value::String(Rc::from("  hi  "))], &env, loc()).unwrap();
        assert!(v.equals(&Value::String(Rc::from("hi"))));
    }

    #[test]
    fn int_parses_a_numeric_string() {
        let env = Environment::root();
        let v = int(&[Value::String(Rc::from("42"))], &env, loc()).unwrap();
        assert!(v.equals(&Value::Integer(num_bigint::BigInt::from(42))));
    }

    #[test]
    fn int_rejects_non_numeric_string() {
        let env = Environment::root();
        let err = int(&[Value::String(Rc::from("abc"))], &env, loc()).unwrap_err();
        assert!(matches!(err, InterpreterError::Domain { .. }));
    }

    #[test]
    fn str_formats_non_string_values() {
        let env = Environment::root();
        let v = str_of(&[Value::Integer(num_bigint::BigInt::from(7))], &env, loc()).unwrap();
        assert!(v.equals(&Value::String(Rc::from("7"))));
    }
}
