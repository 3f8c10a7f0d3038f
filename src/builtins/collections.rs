//! Collection operations: map, filter, fold, reduce, each, size, get, push, push!,
//! zip, range, first, last, rest, sort, reverse, keys, values, entries, asMutable,
//! asImmutable.
//!
//! Higher-order operations (`map`, `filter`, `fold`, `each`) inspect the callback's
//! declared arity to decide whether to also pass the element's index or key
//!: a callback declared with 2+ parameters receives `(value, index)` (lists,
//! ranges, sequences) or `(value, key)` (dicts); otherwise it receives just the
//! value.

use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::eval::{call, call_breakable, declared_arity};
use crate::value::{Arity, BuiltinFunction, RangeValue, Sequence, TransientKind, Value, ValueKey};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::cell::RefCell;
use std::rc::Rc;

/// Normalizes any iterable `Value` (`List`, `Range`, `Sequence`, `Set`) into a
/// concrete `Vec<Value>`. Only safe for finite collections; callers must reject
/// infinite ranges/sequences before calling this.
fn materialize(v: &Value, op: &str, loc: SourceLocation) -> Result<Vec<Value>, InterpreterError> {
    match v {
        Value::List(items) => Ok(items.iter().cloned().collect()),
        Value::Set(s) => Ok(s.iter().map(|k| k.0.clone()).collect()),
        Value::Range(r) => {
            if r.is_infinite() {
                return Err(InterpreterError::domain(format!("{op}: range is infinite"), loc.line, loc.column));
            }
            let len = r.len().unwrap_or(0);
            Ok((0..len).map(|i| Value::Integer(r.nth(i).expect("within range length"))).collect())
        }
        Value::Sequence(seq) => {
            let mut out = Vec::new();
            let mut i = 0;
            while let Some(v) = seq.nth(i)? {
                out.push(v);
                i += 1;
            }
            Ok(out)
        }
        Value::Transient(cell) => match &*cell.borrow() {
            TransientKind::List(items) => Ok(items.iter().cloned().collect()),
            TransientKind::Set(s) => Ok(s.iter().map(|k| k.0.clone()).collect()),
            TransientKind::Dict(_) => {
                Err(InterpreterError::type_error(op, "List, Set, Range or Sequence", "TransientDict", loc.line, loc.column))
            }
        },
        other => Err(InterpreterError::type_error(op, "List, Set, Range or Sequence", other.type_name(), loc.line, loc.column)),
    }
}

fn index_value(i: usize) -> Value {
    Value::Integer(BigInt::from(i))
}

/// `true` for the two runtime values `map`/`filter` must keep lazy: a `Range` or a
/// `Sequence` may be infinite, so they stay producer closures instead of being
/// walked eagerly.
fn is_lazy_source(v: &Value) -> bool {
    matches!(v, Value::Range(_) | Value::Sequence(_))
}

/// The element at position `i` of a `Range` or `Sequence` source, or `None` past
/// the end. Panics (via `unreachable!`) on any other value — callers must check
/// `is_lazy_source` first.
fn lazy_source_nth(source: &Value, i: usize) -> Result<Option<Value>, InterpreterError> {
    match source {
        Value::Range(r) => Ok(r.nth(i).map(Value::Integer)),
        Value::Sequence(s) => s.nth(i),
        _ => unreachable!("lazy_source_nth called on a non-lazy source"),
    }
}

/// `map(f, coll)`: applies `f` to every element. Over a `List`/`Set`/`Dict`,
/// produces a new `List` eagerly; over a `Range`/`Sequence` (which may be
/// infinite), produces a lazy `Sequence` instead.
pub fn map(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let f = args[0].clone();
    let with_index = declared_arity(&f) >= 2;
    match &args[1] {
        Value::Dict(d) => {
            let mut out = im::Vector::new();
            for (k, v) in d.iter() {
                let call_args = if with_index { vec![v.clone(), k.0.clone()] } else { vec![v.clone()] };
                out.push_back(call(&f, call_args, env, loc)?);
            }
            Ok(Value::List(out))
        }
        source if is_lazy_source(source) => {
            let source = source.clone();
            let env = env.clone();
            let seq = Sequence::new(Rc::new(move |i| match lazy_source_nth(&source, i)? {
                Some(v) => {
                    let call_args = if with_index { vec![v, index_value(i)] } else { vec![v] };
                    Ok(Some(call(&f, call_args, &env, loc)?))
                }
                None => Ok(None),
            }));
            Ok(Value::Sequence(seq))
        }
        other => {
            let items = materialize(other, "map", loc)?;
            let mut out = im::Vector::new();
            for (i, item) in items.into_iter().enumerate() {
                let call_args = if with_index { vec![item, index_value(i)] } else { vec![item] };
                out.push_back(call(&f, call_args, env, loc)?);
            }
            Ok(Value::List(out))
        }
    }
}

/// `filter(f, coll)`: keeps elements for which `f` returns a truthy value. Over a
/// `List`/`Set`, produces a new `List` eagerly; over a `Range`/`Sequence` (which may
/// be infinite), produces a lazy `Sequence` that scans forward for the next match.
pub fn filter(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let f = args[0].clone();
    let with_index = declared_arity(&f) >= 2;
    if is_lazy_source(&args[1]) {
        let source = args[1].clone();
        let env = env.clone();
        let cursor = Rc::new(RefCell::new(0usize));
        let seq = Sequence::new(Rc::new(move |_output_i| loop {
            let i = *cursor.borrow();
            match lazy_source_nth(&source, i)? {
                Some(v) => {
                    *cursor.borrow_mut() += 1;
                    let call_args = if with_index { vec![v.clone(), index_value(i)] } else { vec![v.clone()] };
                    if call(&f, call_args, &env, loc)?.is_truthy() {
                        return Ok(Some(v));
                    }
                }
                None => return Ok(None),
            }
        }));
        return Ok(Value::Sequence(seq));
    }
    let items = materialize(&args[1], "filter", loc)?;
    let mut out = im::Vector::new();
    for (i, item) in items.into_iter().enumerate() {
        let call_args = if with_index { vec![item.clone(), index_value(i)] } else { vec![item.clone()] };
        if call(&f, call_args, env, loc)?.is_truthy() {
            out.push_back(item);
        }
    }
    Ok(Value::List(out))
}

/// `fold(seed, f, coll)`: threads an accumulator through `coll`, left to right. The
/// callback may `break` early with a value, which becomes the result.
pub fn fold(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let mut acc = args[0].clone();
    let f = &args[1];
    let with_index = declared_arity(f) >= 3;
    let items = materialize(&args[2], "fold", loc)?;
    for (i, item) in items.into_iter().enumerate() {
        let call_args = if with_index { vec![acc, item, index_value(i)] } else { vec![acc, item] };
        let (result, broke) = call_breakable(f, call_args, env, loc)?;
        acc = result;
        if broke {
            break;
        }
    }
    Ok(acc)
}

/// `reduce(f, coll)`: like `fold`, but seeds the accumulator with the collection's
/// first element. A `DomainError` on an empty collection.
pub fn reduce(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let f = &args[0];
    let items = materialize(&args[1], "reduce", loc)?;
    let mut iter = items.into_iter();
    let mut acc = iter
        .next()
        .ok_or_else(|| InterpreterError::domain("reduce: collection is empty", loc.line, loc.column))?;
    for item in iter {
        let (result, broke) = call_breakable(f, vec![acc, item], env, loc)?;
        acc = result;
        if broke {
            break;
        }
    }
    Ok(acc)
}

/// `each(f, coll)`: calls `f` for side effects on every element, returns `nil`.
pub fn each(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let f = &args[0];
    let with_index = declared_arity(f) >= 2;
    match &args[1] {
        Value::Dict(d) => {
            for (k, v) in d.iter() {
                let call_args = if with_index { vec![v.clone(), k.0.clone()] } else { vec![v.clone()] };
                let (_, broke) = call_breakable(f, call_args, env, loc)?;
                if broke {
                    break;
                }
            }
        }
        other => {
            let items = materialize(other, "each", loc)?;
            for (i, item) in items.into_iter().enumerate() {
                let call_args = if with_index { vec![item, index_value(i)] } else { vec![item] };
                let (_, broke) = call_breakable(f, call_args, env, loc)?;
                if broke {
                    break;
                }
            }
        }
    }
    Ok(Value::Nil)
}

/// `size(coll)`: element count for `List`/`Dict`/`Set`/`String`, or `len` of a
/// finite `Range`.
pub fn size(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let n = match &args[0] {
        Value::List(items) => items.len(),
        Value::Dict(d) => d.len(),
        Value::Set(s) => s.len(),
        Value::String(s) => s.chars().count(),
        Value::Range(r) => r
            .len()
            .ok_or_else(|| InterpreterError::domain("size: range is infinite", loc.line, loc.column))?,
        other => return Err(InterpreterError::type_error("size", "List, Dict, Set, String or Range", other.type_name(), loc.line, loc.column)),
    };
    Ok(Value::Integer(BigInt::from(n)))
}

/// `get(coll, key)`: `List`/`String` indexing or `Dict` lookup, returning `nil` if
/// absent or out of range.
pub fn get(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match &args[0] {
        Value::Dict(d) => {
            let key = ValueKey::new(args[1].clone())
                .map_err(|_| InterpreterError::domain("get: key is not hashable", loc.line, loc.column))?;
            Ok(d.get(&key).cloned().unwrap_or(Value::Nil))
        }
        Value::List(items) => {
            let Value::Integer(i) = &args[1] else {
                return Err(InterpreterError::type_error("get", "Integer", args[1].type_name(), loc.line, loc.column));
            };
            let idx = i.to_i64().unwrap_or(-1);
            if idx < 0 || idx as usize >= items.len() {
                Ok(Value::Nil)
            } else {
                Ok(items.get(idx as usize).cloned().unwrap_or(Value::Nil))
            }
        }
        other => Err(InterpreterError::type_error("get", "Dict or List", other.type_name(), loc.line, loc.column)),
    }
}

/// `push(coll, value)`: persistent append, returns a new `List`/`Set`.
pub fn push(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match &args[0] {
        Value::List(items) => {
            let mut items = items.clone();
            items.push_back(args[1].clone());
            Ok(Value::List(items))
        }
        Value::Set(s) => {
            let key = ValueKey::new(args[1].clone())
                .map_err(|_| InterpreterError::domain("push: value is not hashable", loc.line, loc.column))?;
            Ok(Value::Set(s.insert(key)))
        }
        other => Err(InterpreterError::type_error("push", "List or Set", other.type_name(), loc.line, loc.column)),
    }
}

/// `push!(transient, value)`: in-place append to a transient view.
pub fn push_bang(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Transient(cell) = &args[0] else {
        return Err(InterpreterError::type_error("push!", "a transient collection (see asMutable)", args[0].type_name(), loc.line, loc.column));
    };
    let mut kind = cell.borrow_mut();
    match &mut *kind {
        TransientKind::List(items) => {
            items.push_back(args[1].clone());
        }
        TransientKind::Set(s) => {
            let key = ValueKey::new(args[1].clone())
                .map_err(|_| InterpreterError::domain("push!: value is not hashable", loc.line, loc.column))?;
            *s = s.insert(key);
        }
        TransientKind::Dict(_) => {
            return Err(InterpreterError::type_error("push!", "a transient List or Set", "TransientDict", loc.line, loc.column));
        }
    }
    Ok(args[0].clone())
}

/// `asMutable(coll)`: wraps a persistent collection in a transient, single-owner
/// view for batched in-place mutation.
pub fn as_mutable(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let kind = match &args[0] {
        Value::List(items) => TransientKind::List(items.clone()),
        Value::Dict(d) => TransientKind::Dict(d.clone()),
        Value::Set(s) => TransientKind::Set(s.clone()),
        other => return Err(InterpreterError::type_error("asMutable", "List, Dict or Set", other.type_name(), loc.line, loc.column)),
    };
    Ok(Value::Transient(Rc::new(RefCell::new(kind))))
}

/// `asImmutable(transient)`: snapshots a transient view back into a persistent,
/// structurally-shared collection.
pub fn as_immutable(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Transient(cell) = &args[0] else {
        return Err(InterpreterError::type_error("asImmutable", "a transient collection", args[0].type_name(), loc.line, loc.column));
    };
    Ok(match &*cell.borrow() {
        TransientKind::List(items) => Value::List(items.clone()),
        TransientKind::Dict(d) => Value::Dict(d.clone()),
        TransientKind::Set(s) => Value::Set(s.clone()),
    })
}

/// `zip(a, b)`: pairs elements positionally into a `List` of two-element `List`s,
/// truncated to the shorter collection.
pub fn zip(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let a = materialize(&args[0], "zip", loc)?;
    let b = materialize(&args[1], "zip", loc)?;
    let out: im::Vector<Value> = a
        .into_iter()
        .zip(b)
        .map(|(x, y)| Value::List(im::vector![x, y]))
        .collect();
    Ok(Value::List(out))
}

/// `range(start, end)`: builds the same `Range` value as the `start..end` literal
/// syntax.
pub fn range(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Integer(start) = &args[0] else {
        return Err(InterpreterError::type_error("range", "Integer", args[0].type_name(), loc.line, loc.column));
    };
    let Value::Integer(end) = &args[1] else {
        return Err(InterpreterError::type_error("range", "Integer", args[1].type_name(), loc.line, loc.column));
    };
    Ok(Value::Range(RangeValue { start: start.clone(), end: Some(end.clone()), step: BigInt::from(1), inclusive: false }))
}

/// `first(coll)` / `last(coll)` / `rest(coll)`: positional access and the tail of a
/// `List`.
pub fn first(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let items = materialize(&args[0], "first", loc)?;
    Ok(items.into_iter().next().unwrap_or(Value::Nil))
}

pub fn last(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let items = materialize(&args[0], "last", loc)?;
    Ok(items.into_iter().next_back().unwrap_or(Value::Nil))
}

pub fn rest(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let items = materialize(&args[0], "rest", loc)?;
    let tail: im::Vector<Value> = items.into_iter().skip(1).collect();
    Ok(Value::List(tail))
}

/// `sort(coll)`: ascending order by the numeric/lexicographic comparison also used
/// by `< > <= >=`.
pub fn sort(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let mut items = materialize(&args[0], "sort", loc)?;
    let mut err = None;
    items.sort_by(|a, b| {
        if err.is_some() {
            return std::cmp::Ordering::Equal;
        }
        match super::numeric::compare(a, b, "sort", loc) {
            Ok(o) => o,
            Err(e) => {
                err = Some(e);
                std::cmp::Ordering::Equal
            }
        }
    });
    if let Some(e) = err {
        return Err(e);
    }
    Ok(Value::List(items.into()))
}

pub fn reverse(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let items = materialize(&args[0], "reverse", loc)?;
    Ok(Value::List(items.into_iter().rev().collect()))
}

/// `keys(dict)` / `values(dict)` / `entries(dict)`: the dict's keys, values, or
/// `[key, value]` pairs, in insertion order.
pub fn keys(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Dict(d) = &args[0] else {
        return Err(InterpreterError::type_error("keys", "Dict", args[0].type_name(), loc.line, loc.column));
    };
    Ok(Value::List(d.iter().map(|(k, _)| k.0.clone()).collect()))
}

pub fn values(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Dict(d) = &args[0] else {
        return Err(InterpreterError::type_error("values", "Dict", args[0].type_name(), loc.line, loc.column));
    };
    Ok(Value::List(d.iter().map(|(_, v)| v.clone()).collect()))
}

pub fn entries(args: &[Value], _env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::Dict(d) = &args[0] else {
        return Err(InterpreterError::type_error("entries", "Dict", args[0].type_name(), loc.line, loc.column));
    };
    Ok(Value::List(d.iter().map(|(k, v)| Value::List(im::vector![k.0.clone(), v.clone()])).collect()))
}

pub fn register(env: &Rc<Environment>) {
    let mut reg = |name: &'static str, arity: Arity, func: crate::value::NativeFn| {
        env.declare(name.to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name, arity, func })), false).unwrap();
    };
    reg("map", Arity::Exact(2), map);
    reg("filter", Arity::Exact(2), filter);
    reg("fold", Arity::Exact(3), fold);
    reg("reduce", Arity::Exact(2), reduce);
    reg("each", Arity::Exact(2), each);
    reg("size", Arity::Exact(1), size);
    reg("get", Arity::Exact(2), get);
    reg("push", Arity::Exact(2), push);
    reg("push!", Arity::Exact(2), push_bang);
    reg("asMutable", Arity::Exact(1), as_mutable);
    reg("asImmutable", Arity::Exact(1), as_immutable);
    reg("zip", Arity::Exact(2), zip);
    reg("range", Arity::Exact(2), range);
    reg("first", Arity::Exact(1), first);
    reg("last", Arity::Exact(1), last);
    reg("rest", Arity::Exact(1), rest);
    reg("sort", Arity::Exact(1), sort);
    reg("reverse", Arity::Exact(1), reverse);
    reg("keys", Arity::Exact(1), keys);
    reg("values", Arity::Exact(1), values);
    reg("entries", Arity::Exact(1), entries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dict;

    fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    fn loc() -> SourceLocation {
        SourceLocation::new(0, 0)
    }

    fn list(items: &[i64]) -> Value {
        Value::List(items.iter().map(|n| int(*n)).collect())
    }

    fn adder(n: i64) -> Value {
        use crate::ast::{Block, ExpressionKind, Pattern, PatternKind, Statement, StatementKind};
        let env = Environment::root();
        let param = Pattern::new(PatternKind::Identifier("x".into()), SourceLocation::new(0, 0));
        let body = Block {
            statements: vec![Statement::new(
                StatementKind::Expression(crate::ast::Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(crate::ast::Expression::new(ExpressionKind::Identifier("+".into()), SourceLocation::new(0, 0))),
                        args: vec![
                            crate::ast::Expression::new(ExpressionKind::Identifier("x".into()), SourceLocation::new(0, 0)),
                            crate::ast::Expression::new(ExpressionKind::Integer(BigInt::from(n)), SourceLocation::new(0, 0)),
                        ],
                    },
                    SourceLocation::new(0, 0),
                )),
                SourceLocation::new(0, 0),
            )],
        };
        super::super::arithmetic::register(&env);
        Value::Function(Rc::new(crate::value::FunctionValue { params: vec![param], body, env }))
    }

    #[test]
    fn map_applies_function_to_every_element() {
        let env = Environment::root();
        let f = adder(1);
        let result = map(&[f, list(&[1, 2, 3])], &env, loc()).unwrap();
        assert!(result.equals(&list(&[2, 3, 4])));
    }

    #[test]
    fn filter_keeps_truthy_results() {
        let env = Environment::root();
        let gt = Value::BuiltinFunction(Rc::new(BuiltinFunction { name: ">", arity: Arity::Exact(2), func: super::super::comparison::gt }));
        // partial application: filter needs a 1-arg predicate, so bind the threshold.
        let f = Value::Partial(Rc::new(crate::value::PartialApp { callee: gt, bound: vec![Value::Placeholder, int(1)] }));
        let result = filter(&[f, list(&[1, 2, 3])], &env, loc()).unwrap();
        assert!(result.equals(&list(&[2, 3])));
    }

    #[test]
    fn fold_accumulates_left_to_right() {
        let env = Environment::root();
        let add = Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "+", arity: Arity::Exact(2), func: super::super::arithmetic::add }));
        let result = fold(&[int(0), add, list(&[1, 2, 3])], &env, loc()).unwrap();
        assert!(result.equals(&int(6)));
    }

    #[test]
    fn push_does_not_mutate_the_original_list() {
        let original = list(&[1, 2]);
        let env = Environment::root();
        let pushed = push(&[original.clone(), int(3)], &env, loc()).unwrap();
        assert!(original.equals(&list(&[1, 2])));
        assert!(pushed.equals(&list(&[1, 2, 3])));
    }

    #[test]
    fn push_bang_mutates_the_transient_view_in_place() {
        let env = Environment::root();
        let transient = as_mutable(&[list(&[1, 2])], &env, loc()).unwrap();
        push_bang(&[transient.clone(), int(3)], &env, loc()).unwrap();
        let snapshot = as_immutable(&[transient], &env, loc()).unwrap();
        assert!(snapshot.equals(&list(&[1, 2, 3])));
    }

    #[test]
    fn zip_truncates_to_shorter_collection() {
        let env = Environment::root();
        let result = zip(&[list(&[1, 2, 3]), list(&[10, 20])], &env, loc()).unwrap();
        assert!(result.equals(&Value::List(im::vector![
            Value::List(im::vector![int(1), int(10)]),
            Value::List(im::vector![int(2), int(20)]),
        ])));
    }

    #[test]
    fn sort_orders_integers_ascending() {
        let env = Environment::root();
        let result = sort(&[list(&[3, 1, 2])], &env, loc()).unwrap();
        assert!(result.equals(&list(&[1, 2, 3])));
    }

    #[test]
    fn keys_values_entries_preserve_insertion_order() {
        let env = Environment::root();
        let d = Dict::new()
            .insert(ValueKey::new(Value::String(Rc::from("z"))).unwrap(), int(1))
            .insert(ValueKey::new(Value::String(Rc::from("a"))).unwrap(), int(2));
        let k = keys(&[Value::Dict(d.clone())], &env, loc()).unwrap();
        assert!(k.equals(&Value::List(im::vector![Value::String(Rc::from("z")), Value::String(Rc::from("a"))])));
        let v = values(&[Value::Dict(d.clone())], &env, loc()).unwrap();
        assert!(v.equals(&list(&[1, 2])));
        let e = entries(&[Value::Dict(d)], &env, loc()).unwrap();
        assert!(e.equals(&Value::List(im::vector![
            Value::List(im::vector![Value::String(Rc::from("z")), int(1)]),
            Value::List(im::vector![Value::String(Rc::from("a")), int(2)]),
        ])));
    }
}
