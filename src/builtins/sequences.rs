//! Lazy sequence operations: iterate, take, drop, cycle
//!
//! `iterate`/`cycle` build a `Sequence`: a producer closure plus a memoisation
//! buffer, so repeated access to the same index never re-runs user code and
//! infinite sequences stay representable.

use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::eval::call;
use crate::value::{Arity, BuiltinFunction, Sequence, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::rc::Rc;

/// `iterate(f, seed)`: the infinite sequence `seed, f(seed), f(f(seed)), ...`.
pub fn iterate(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    build_iterate(args[0].clone(), args[1].clone(), env.clone(), loc)
}

fn build_iterate(f: Value, seed: Value, env: Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    use std::cell::RefCell;
    let prev: Rc<RefCell<Option<Value>>> = Rc::new(RefCell::new(None));
    let seq = Sequence::new(Rc::new(move |i| {
        if i == 0 {
            *prev.borrow_mut() = Some(seed.clone());
            return Ok(Some(seed.clone()));
        }
        let last = prev.borrow().clone().expect("previous element memoised before this one is requested");
        let next = call(&f, vec![last], &env, loc)?;
        *prev.borrow_mut() = Some(next.clone());
        Ok(Some(next))
    }));
    Ok(Value::Sequence(seq))
}

/// `take(n, coll)`: the first `n` elements, as a `List`. Works for both
/// finite collections and infinite `Range`/`Sequence` values.
pub fn take(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Integer(n) = &args[0] else {
        return Err(InterpreterError::type_error("take", "Integer", args[0].type_name(), loc.line, loc.column));
    };
    let n = n.to_usize().ok_or_else(|| InterpreterError::domain("take: count must be non-negative", loc.line, loc.column))?;
    let mut out = im::Vector::new();
    match &args[1] {
        Value::Sequence(seq) => {
            for i in 0..n {
                match seq.nth(i)? {
                    Some(v) => out.push_back(v),
                    None => break,
                }
            }
        }
        Value::Range(r) => {
            for i in 0..n {
                match r.nth(i) {
                    Some(v) => out.push_back(Value::Integer(v)),
                    None => break,
                }
            }
        }
        Value::List(items) => {
            out.extend(items.iter().take(n).cloned());
        }
        other => return Err(InterpreterError::type_error("take", "List, Range or Sequence", other.type_name(), loc.line, loc.column)),
    }
    Ok(Value::List(out))
}

/// `drop(n, coll)`: everything after the first `n` elements. Only defined
/// for finite collections.
pub fn drop(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Integer(n) = &args[0] else {
        return Err(InterpreterError::type_error("drop", "Integer", args[0].type_name(), loc.line, loc.column));
    };
    let n = n.to_usize().ok_or_else(|| InterpreterError::domain("drop: count must be non-negative", loc.line, loc.column))?;
    match &args[1] {
        Value::List(items) => Ok(Value::List(items.iter().skip(n).cloned().collect())),
        Value::Range(r) => {
            if r.is_infinite() {
                let start = r.nth(n).unwrap_or_else(|| &r.start + &r.step * BigInt::from(n));
                return Ok(Value::Range(crate::value::RangeValue { start, end: None, step: r.step.clone(), inclusive: r.inclusive }));
            }
            let len = r.len().unwrap_or(0);
            let items: im::Vector<Value> = (n..len).map(|i| Value::Integer(r.nth(i).expect("within range"))).collect();
            Ok(Value::List(items))
        }
        other => Err(InterpreterError::type_error("drop", "List or Range", other.type_name(), loc.line, loc.column)),
    }
}

/// `cycle(coll)`: the infinite, repeating `Sequence` over a finite collection's
/// elements.
pub fn cycle(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let items: Vec<Value> = match &args[0] {
        Value::List(items) => items.iter().cloned().collect(),
        other => return Err(InterpreterError::type_error("cycle", "List", other.type_name(), loc.line, loc.column)),
    };
    if items.is_empty() {
        return Err(InterpreterError::domain("cycle: collection is empty", loc.line, loc.column));
    }
    let seq = Sequence::new(Rc::new(move |i| Ok(Some(items[i % items.len()].clone()))));
    Ok(Value::Sequence(seq))
}

pub fn register(env: &Rc<Environment>) {
    let mut reg = |name: &'static str, arity: Arity, func: crate::value::NativeFn| {
        env.declare(name.to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name, arity, func })), false).unwrap();
    };
    reg("iterate", Arity::Exact(2), iterate);
    reg("take", Arity::Exact(2), take);
    reg("drop", Arity::Exact(2), drop);
    reg("cycle", Arity::Exact(1), cycle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Arity as AR, BuiltinFunction as BF};

    fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    fn loc() -> SourceLocation {
        SourceLocation::new(0, 0)
    }

    fn increment() -> Value {
        Value::BuiltinFunction(Rc::new(BF {
            name: "inc",
            arity: AR::Exact(1),
            func: |args, _env, _loc| match &args[0] {
                Value::Integer(n) => Ok(Value::Integer(n + 1)),
                _ => unreachable!(),
            },
        }))
    }

    #[test]
    fn iterate_then_take_produces_the_expected_prefix() {
        let env = Environment::root();
        let seq = iterate(&[increment(), int(0)], &env, loc()).unwrap();
        let taken = take(&[int(5), seq], &env, loc()).unwrap();
        assert!(taken.equals(&Value::List(im::vector![int(0), int(1), int(2), int(3), int(4)])));
    }

    #[test]
    fn cycle_repeats_indefinitely() {
        let env = Environment::root();
        let seq = cycle(&[Value::List(im::vector![int(1), int(2)])], &env, loc()).unwrap();
        let taken = take(&[int(5), seq], &env, loc()).unwrap();
        assert!(taken.equals(&Value::List(im::vector![int(1), int(2), int(1), int(2), int(1)])));
    }

    #[test]
    fn drop_skips_the_first_n_elements() {
        let env = Environment::root();
        let list = Value::List(im::vector![int(1), int(2), int(3)]);
        let dropped = drop(&[int(1), list], &env, loc()).unwrap();
        assert!(dropped.equals(&Value::List(im::vector![int(2), int(3)])));
    }
}
