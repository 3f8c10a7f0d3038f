// ABOUTME: Tree-walking evaluator: dispatch, tail-call trampoline, pattern matching

use crate::ast::{
    Block, Expression, ExpressionKind, Pattern, PatternKind, SourceLocation, Statement,
    StatementKind, StringSegment,
};
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{
    Arity, Dict, FunctionValue, PartialApp, SetValue, Value, ValueKey,
};
use num_bigint::BigInt;
use std::rc::Rc;

/// The result of evaluating a statement or an expression evaluated in a
/// control-flow-aware position. `TailCall` only ever arises from a genuine tail
/// position (see `eval_node`'s `tail` parameter) and is consumed by the trampoline
/// loop in `run_block_to_value`.
enum Flow {
    Value(Value),
    Return(Value),
    Break(Value),
    TailCall(Rc<Environment>, Block),
}

macro_rules! try_value {
    ($flow:expr) => {
        match $flow {
            Flow::Value(v) => v,
            other => return Ok(other),
        }
    };
}

/// Evaluates a single expression to a `Value` for callers outside the evaluator
/// (builtins, the solution runner, tests). A bare top-level `return` resolves to its
/// value; `break` outside of any loop callback is a `DomainError`.
pub fn eval_expr(expr: &Expression, env: &Rc<Environment>) -> Result<Value, InterpreterError> {
    match eval_node(expr, env, false)? {
        Flow::Value(v) | Flow::Return(v) => Ok(v),
        Flow::Break(_) => {
            Err(InterpreterError::domain("break used outside of a loop callback", expr.loc.line, expr.loc.column))
        }
        Flow::TailCall(e, b) => run_block_to_value(&b, &e),
    }
}

/// Runs a block to completion, trampolining any `TailCall` it or its tail-position
/// descendants produce so that self/mutual tail recursion runs in constant stack
/// space. Used for function bodies, section bodies and top-level scripts.
pub fn run_block_to_value(block: &Block, env: &Rc<Environment>) -> Result<Value, InterpreterError> {
    let mut cur_env = env.clone();
    let mut cur_block = block.clone();
    loop {
        match eval_block(&cur_block, &cur_env, true)? {
            Flow::Value(v) | Flow::Return(v) => return Ok(v),
            Flow::Break(_) => {
                return Err(InterpreterError::domain("break used outside of a loop callback", 0, 0));
            }
            Flow::TailCall(e, b) => {
                cur_env = e;
                cur_block = b;
            }
        }
    }
}

fn eval_block(block: &Block, env: &Rc<Environment>, tail: bool) -> Result<Flow, InterpreterError> {
    let n = block.statements.len();
    for (i, stmt) in block.statements.iter().enumerate() {
        let is_last = i + 1 == n;
        let flow = eval_statement(stmt, env, is_last && tail)?;
        if is_last {
            return Ok(flow);
        }
        if let Flow::Value(_) = flow {
            continue;
        }
        return Ok(flow);
    }
    Ok(Flow::Value(Value::Nil))
}

fn eval_statement(stmt: &Statement, env: &Rc<Environment>, tail: bool) -> Result<Flow, InterpreterError> {
    match &stmt.kind {
        StatementKind::Let { mutable, pattern, value } => {
            let v = try_value!(eval_node(value, env, false)?);
            match match_pattern(pattern, &v, env)? {
                Some(bindings) => {
                    for (name, bound) in bindings {
                        env.declare(name, bound, *mutable)?;
                    }
                    Ok(Flow::Value(Value::Nil))
                }
                None => Err(InterpreterError::domain(
                    "let pattern did not match the bound value",
                    stmt.loc.line,
                    stmt.loc.column,
                )),
            }
        }
        StatementKind::Return(expr) => {
            // `return`'s operand is always evaluated in tail position: an explicit
            // return always attempts TCO regardless of the enclosing block's own
            // tail-position flag.
            match eval_node(expr, env, true)? {
                Flow::Value(v) => Ok(Flow::Return(v)),
                other => Ok(other),
            }
        }
        StatementKind::Break(expr) => {
            let v = try_value!(eval_node(expr, env, false)?);
            Ok(Flow::Break(v))
        }
        StatementKind::Section { name, body } => {
            env.declare_section(
                name.clone(),
                crate::value::SectionValue { body: body.clone(), env: env.clone() },
            )?;
            Ok(Flow::Value(Value::Nil))
        }
        StatementKind::Expression(expr) => eval_node(expr, env, tail),
        StatementKind::Annotated { statement, .. } => eval_statement(statement, env, tail),
    }
}

fn eval_node(expr: &Expression, env: &Rc<Environment>, tail: bool) -> Result<Flow, InterpreterError> {
    match &expr.kind {
        ExpressionKind::If { condition, consequence, alternative } => {
            let cond = try_value!(eval_node(condition, env, false)?);
            if cond.is_truthy() {
                eval_block(consequence, env, tail)
            } else if let Some(alt) = alternative {
                eval_block(alt, env, tail)
            } else {
                Ok(Flow::Value(Value::Nil))
            }
        }
        ExpressionKind::Match { scrutinee, arms } => {
            let scrutinee_val = try_value!(eval_node(scrutinee, env, false)?);
            for arm in arms {
                if let Some(bindings) = match_pattern(&arm.pattern, &scrutinee_val, env)? {
                    let child = Environment::child(env);
                    for (name, v) in bindings {
                        child.declare(name, v, false)?;
                    }
                    return eval_block(&arm.body, &child, tail);
                }
            }
            Err(InterpreterError::domain(
                "no match arm matched the scrutinee",
                expr.loc.line,
                expr.loc.column,
            ))
        }
        ExpressionKind::Call { callee, args } => eval_call(callee, args, env, expr.loc, tail),
        ExpressionKind::ListLiteral(elements) => {
            let mut items = im::Vector::new();
            for e in elements {
                items.push_back(try_value!(eval_node(e, env, false)?));
            }
            Ok(Flow::Value(Value::List(items)))
        }
        ExpressionKind::DictLiteral(pairs) => {
            let mut dict = Dict::new();
            for (k, v) in pairs {
                let key_val = eval_dict_key(k, env)?;
                let value_val = try_value!(eval_node(v, env, false)?);
                let key = ValueKey::new(key_val)
                    .map_err(|_| InterpreterError::domain("dict key is not hashable", k.loc.line, k.loc.column))?;
                dict = dict.insert(key, value_val);
            }
            Ok(Flow::Value(Value::Dict(dict)))
        }
        ExpressionKind::SetLiteral(elements) => {
            let mut set = SetValue::new();
            for e in elements {
                let v = try_value!(eval_node(e, env, false)?);
                let key = ValueKey::new(v)
                    .map_err(|_| InterpreterError::domain("set element is not hashable", e.loc.line, e.loc.column))?;
                set = set.insert(key);
            }
            Ok(Flow::Value(Value::Set(set)))
        }
        ExpressionKind::RangeLiteral { start, end, inclusive } => {
            let start_val = try_value!(eval_node(start, env, false)?);
            let start_int = expect_integer(&start_val, "..", start.loc)?;
            let end_int = match end {
                Some(e) => {
                    let v = try_value!(eval_node(e, env, false)?);
                    Some(expect_integer(&v, "..", e.loc)?)
                }
                None => None,
            };
            Ok(Flow::Value(Value::Range(crate::value::RangeValue {
                start: start_int,
                end: end_int,
                step: BigInt::from(1),
                inclusive: *inclusive,
            })))
        }
        ExpressionKind::FunctionLiteral { params, body } => Ok(Flow::Value(Value::Function(Rc::new(
            FunctionValue { params: params.clone(), body: body.clone(), env: env.clone() },
        )))),
        ExpressionKind::Prefix { operator, operand } => {
            let v = try_value!(eval_node(operand, env, false)?);
            let result = match operator.as_str() {
                "-" => negate(&v, expr.loc)?,
                "!" => Value::Boolean(!v.is_truthy()),
                other => {
                    return Err(InterpreterError::parse(format!("unknown prefix operator {other}"), expr.loc.line, expr.loc.column))
                }
            };
            Ok(Flow::Value(result))
        }
        ExpressionKind::Index { object, index } => {
            let obj = try_value!(eval_node(object, env, false)?);
            let idx = try_value!(eval_node(index, env, false)?);
            Ok(Flow::Value(index_value(&obj, &idx, expr.loc)?))
        }
        ExpressionKind::StringLiteral(segments) => {
            let mut out = String::new();
            for seg in segments {
                match seg {
                    StringSegment::Text(t) => out.push_str(t),
                    StringSegment::Interpolation(e) => {
                        let v = try_value!(eval_node(e, env, false)?);
                        out.push_str(&v.to_string());
                    }
                }
            }
            Ok(Flow::Value(Value::String(Rc::from(out.as_str()))))
        }
        ExpressionKind::Integer(n) => Ok(Flow::Value(Value::Integer(n.clone()))),
        ExpressionKind::Decimal(d) => Ok(Flow::Value(Value::Decimal(*d))),
        ExpressionKind::Boolean(b) => Ok(Flow::Value(Value::Boolean(*b))),
        ExpressionKind::Nil => Ok(Flow::Value(Value::Nil)),
        ExpressionKind::Placeholder => Ok(Flow::Value(Value::Placeholder)),
        ExpressionKind::Identifier(name) => env
            .get(name)
            .map(Flow::Value)
            .ok_or_else(|| InterpreterError::undefined(name, expr.loc.line, expr.loc.column)),
    }
}

/// Dict literal keys written as a bare identifier are keyword-style shorthand for a
/// string key of the same name (`#{a: 1}` is keyed by `"a"`, not a variable lookup).
/// Any other key expression is evaluated normally.
fn eval_dict_key(key_expr: &Expression, env: &Rc<Environment>) -> Result<Value, InterpreterError> {
    if let ExpressionKind::Identifier(name) = &key_expr.kind {
        Ok(Value::String(Rc::from(name.as_str())))
    } else {
        eval_expr(key_expr, env)
    }
}

fn expect_integer(v: &Value, op: &str, loc: SourceLocation) -> Result<BigInt, InterpreterError> {
    match v {
        Value::Integer(n) => Ok(n.clone()),
        other => Err(InterpreterError::type_error(op, "Integer", other.type_name(), loc.line, loc.column)),
    }
}

fn negate(v: &Value, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match v {
        Value::Integer(n) => Ok(Value::Integer(-n.clone())),
        Value::Decimal(d) => Ok(Value::Decimal(-d)),
        other => Err(InterpreterError::type_error("-", "Integer or Decimal", other.type_name(), loc.line, loc.column)),
    }
}

fn index_value(obj: &Value, idx: &Value, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match obj {
        Value::List(items) => match idx {
            Value::Range(r) => Ok(Value::List(slice_indices(r, items.len(), loc)?.map(|i| items[i].clone()).collect())),
            _ => {
                let i = expect_integer(idx, "[]", loc)?;
                match normalize_index(&i, items.len()) {
                    Some(i) => Ok(items.get(i).cloned().unwrap_or(Value::Nil)),
                    None => Ok(Value::Nil),
                }
            }
        },
        Value::Dict(d) => {
            let key = ValueKey::new(idx.clone())
                .map_err(|_| InterpreterError::domain("dict key is not hashable", loc.line, loc.column))?;
            Ok(d.get(&key).cloned().unwrap_or(Value::Nil))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            match idx {
                Value::Range(r) => {
                    let sliced: String = slice_indices(r, chars.len(), loc)?.map(|i| chars[i]).collect();
                    Ok(Value::String(Rc::from(sliced.as_str())))
                }
                _ => {
                    let i = expect_integer(idx, "[]", loc)?;
                    match normalize_index(&i, chars.len()) {
                        Some(i) => Ok(Value::String(Rc::from(chars[i].to_string().as_str()))),
                        None => Ok(Value::Nil),
                    }
                }
            }
        }
        other => Err(InterpreterError::type_error("[]", "List, Dict or String", other.type_name(), loc.line, loc.column)),
    }
}

/// Resolves a `Range` index used for slicing against a concrete length,
/// producing the in-bounds positions to keep, in order. An infinite range is
/// clamped at `len`.
fn slice_indices(r: &crate::value::RangeValue, len: usize, loc: SourceLocation) -> Result<std::vec::IntoIter<usize>, InterpreterError> {
    use num_traits::ToPrimitive;
    let mut out = Vec::new();
    let mut i = 0usize;
    loop {
        if !r.is_infinite() {
            match r.len() {
                Some(n) if i >= n => break,
                _ => {}
            }
        }
        let Some(v) = r.nth(i) else { break };
        let Some(pos) = v.to_i64() else { break };
        let pos = if pos < 0 { pos + len as i64 } else { pos };
        if pos < 0 {
            return Err(InterpreterError::domain("slice index out of range", loc.line, loc.column));
        }
        let pos = pos as usize;
        if pos >= len {
            if r.is_infinite() {
                break;
            }
            return Err(InterpreterError::domain("slice index out of range", loc.line, loc.column));
        }
        out.push(pos);
        i += 1;
    }
    Ok(out.into_iter())
}

fn normalize_index(i: &BigInt, len: usize) -> Option<usize> {
    use num_traits::ToPrimitive;
    let i = i.to_i64()?;
    let resolved = if i < 0 { i + len as i64 } else { i };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

fn eval_call(
    callee_expr: &Expression,
    arg_exprs: &[Expression],
    env: &Rc<Environment>,
    loc: SourceLocation,
    tail: bool,
) -> Result<Flow, InterpreterError> {
    if let ExpressionKind::Identifier(name) = &callee_expr.kind {
        if name == "&&" || name == "||" {
            return eval_short_circuit(name, arg_exprs, env, loc);
        }
        if name == "=" {
            return eval_assign(arg_exprs, env, loc);
        }
    }
    let callee_val = try_value!(eval_node(callee_expr, env, false)?);
    let mut arg_vals = Vec::with_capacity(arg_exprs.len());
    for a in arg_exprs {
        arg_vals.push(try_value!(eval_node(a, env, false)?));
    }
    invoke(callee_val, arg_vals, env, loc, tail)
}

/// `&&` and `||` are recognised structurally by the evaluator (not looked up as
/// ordinary callables) so that the right-hand side is only evaluated when needed
///. Every other operator is an ordinary, shadowable identifier.
fn eval_short_circuit(
    name: &str,
    arg_exprs: &[Expression],
    env: &Rc<Environment>,
    loc: SourceLocation,
) -> Result<Flow, InterpreterError> {
    if arg_exprs.len() != 2 {
        return Err(InterpreterError::arity_error(name, "2", arg_exprs.len(), loc.line, loc.column));
    }
    let left = try_value!(eval_node(&arg_exprs[0], env, false)?);
    let short_circuits = if name == "&&" { !left.is_truthy() } else { left.is_truthy() };
    if short_circuits {
        Ok(Flow::Value(left))
    } else {
        eval_node(&arg_exprs[1], env, false)
    }
}

/// `=` is recognised structurally (not looked up as an ordinary callable) because
/// the left-hand side names a mutable binding rather than evaluating to a value
///. The parser desugars `x = value` the same way it desugars every
/// other binary operator, so this is where that uniform representation is peeled
/// back for the one operator that needs the unevaluated left AST node.
fn eval_assign(arg_exprs: &[Expression], env: &Rc<Environment>, loc: SourceLocation) -> Result<Flow, InterpreterError> {
    if arg_exprs.len() != 2 {
        return Err(InterpreterError::arity_error("=", "2", arg_exprs.len(), loc.line, loc.column));
    }
    let ExpressionKind::Identifier(name) = &arg_exprs[0].kind else {
        return Err(InterpreterError::type_error("=", "assignable identifier", "expression", loc.line, loc.column));
    };
    let value = try_value!(eval_node(&arg_exprs[1], env, false)?);
    env.set(name, value.clone())?;
    Ok(Flow::Value(value))
}

fn is_placeholder(v: &Value) -> bool {
    matches!(v, Value::Placeholder)
}

/// Invokes a callable `Value` with fully-evaluated arguments, either producing a
/// value directly, a `TailCall` (when `tail` is set and the callee is a plain
/// user-defined `Function` invoked at full arity), or a new partially-applied
/// `Function` when the call is under-saturated or contains `_` placeholders.
fn invoke(
    callee: Value,
    args: Vec<Value>,
    env: &Rc<Environment>,
    loc: SourceLocation,
    tail: bool,
) -> Result<Flow, InterpreterError> {
    match callee {
        Value::Partial(p) => invoke_partial(p, args, env, loc, tail),
        Value::Function(f) => {
            if args.iter().any(is_placeholder) || args.len() < f.params.len() {
                Ok(Flow::Value(make_partial(Value::Function(f.clone()), args, f.params.len())))
            } else if args.len() > f.params.len() {
                Err(InterpreterError::arity_error("function", f.params.len().to_string(), args.len(), loc.line, loc.column))
            } else if tail {
                let child = bind_params(&f, &args, loc)?;
                Ok(Flow::TailCall(child, f.body.clone()))
            } else {
                Ok(Flow::Value(apply_function(&f, args, loc)?))
            }
        }
        Value::BuiltinFunction(b) => {
            let min = b.arity.min();
            if args.iter().any(is_placeholder) || args.len() < min {
                Ok(Flow::Value(make_partial(Value::BuiltinFunction(b.clone()), args, min)))
            } else {
                if let Arity::Exact(n) = b.arity {
                    if args.len() > n {
                        return Err(InterpreterError::arity_error(b.name, n.to_string(), args.len(), loc.line, loc.column));
                    }
                }
                Ok(Flow::Value((b.func)(&args, env, loc)?))
            }
        }
        other => Err(InterpreterError::type_error("call", "Function", other.type_name(), loc.line, loc.column)),
    }
}

fn invoke_partial(
    partial: Rc<PartialApp>,
    new_args: Vec<Value>,
    env: &Rc<Environment>,
    loc: SourceLocation,
    tail: bool,
) -> Result<Flow, InterpreterError> {
    let mut filled = partial.bound.clone();
    let mut consumed = 0;
    for slot in filled.iter_mut() {
        if is_placeholder(slot) && consumed < new_args.len() {
            *slot = new_args[consumed].clone();
            consumed += 1;
        }
    }
    filled.extend(new_args.into_iter().skip(consumed));
    invoke(partial.callee.clone(), filled, env, loc, tail)
}

fn make_partial(callee: Value, mut args: Vec<Value>, declared: usize) -> Value {
    while args.len() < declared {
        args.push(Value::Placeholder);
    }
    Value::Partial(Rc::new(PartialApp { callee, bound: args }))
}

/// The number of argument slots a callable still expects before it can be invoked:
/// a `Function`'s declared parameter count, a builtin's minimum arity, or a
/// `Partial`'s remaining placeholder count. Used for higher-order builtins'
/// callback-arity detection as well as partial-application bookkeeping.
pub fn declared_arity(v: &Value) -> usize {
    match v {
        Value::Function(f) => f.params.len(),
        Value::BuiltinFunction(b) => b.arity.min(),
        Value::Partial(p) => p.bound.iter().filter(|x| is_placeholder(x)).count(),
        _ => 0,
    }
}

fn bind_params(f: &FunctionValue, args: &[Value], loc: SourceLocation) -> Result<Rc<Environment>, InterpreterError> {
    let child = Environment::child(&f.env);
    for (pat, val) in f.params.iter().zip(args.iter()) {
        match match_pattern(pat, val, &child)? {
            Some(bindings) => {
                for (name, bound) in bindings {
                    child.declare(name, bound, false)?;
                }
            }
            None => {
                return Err(InterpreterError::domain(
                    "argument does not match parameter pattern",
                    loc.line,
                    loc.column,
                ))
            }
        }
    }
    Ok(child)
}

pub fn apply_function(f: &Rc<FunctionValue>, args: Vec<Value>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let env = bind_params(f, &args, loc)?;
    run_block_to_value(&f.body, &env)
}

/// Invokes any callable `Value` (function, builtin or partial application) to
/// completion. This is the entry point higher-order builtins use to call back into
/// user code.
pub fn call(callee: &Value, args: Vec<Value>, env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match invoke(callee.clone(), args, env, loc, false)? {
        Flow::Value(v) => Ok(v),
        Flow::Return(v) => Ok(v),
        Flow::Break(_) => Err(InterpreterError::domain("break used outside of a loop callback", loc.line, loc.column)),
        Flow::TailCall(e, b) => run_block_to_value(&b, &e),
    }
}

/// Calls a callback and reports whether it short-circuited via `break`. `Ok(None)` was returned normally; `Ok(Some(v))`
/// broke out with `v`.
pub fn call_breakable(
    callee: &Value,
    args: Vec<Value>,
    env: &Rc<Environment>,
    loc: SourceLocation,
) -> Result<(Value, bool), InterpreterError> {
    match invoke(callee.clone(), args, env, loc, false)? {
        Flow::Value(v) | Flow::Return(v) => Ok((v, false)),
        Flow::Break(v) => Ok((v, true)),
        Flow::TailCall(e, b) => Ok((run_block_to_value(&b, &e)?, false)),
    }
}

/// Matches `value` against `pattern`, returning the bindings it introduces, or
/// `None` if it doesn't match. Guard conditions and literal patterns are
/// evaluated via the plain (non-flow-propagating) `eval_expr`: an early `return`
/// or `break` embedded inside one is treated as its resulting value rather than
/// unwinding past the match, a deliberate simplification for these rarely-nested
/// positions.
pub fn match_pattern(
    pattern: &Pattern,
    value: &Value,
    env: &Rc<Environment>,
) -> Result<Option<Vec<(String, Value)>>, InterpreterError> {
    match &pattern.kind {
        PatternKind::Identifier(name) => Ok(Some(vec![(name.clone(), value.clone())])),
        PatternKind::Wildcard => Ok(Some(Vec::new())),
        PatternKind::Literal(expr) => {
            let lit = eval_expr(expr, env)?;
            Ok(if lit.equals(value) { Some(Vec::new()) } else { None })
        }
        PatternKind::List { elements, rest } => {
            let Value::List(items) = value else { return Ok(None) };
            if rest.is_none() && items.len() != elements.len() {
                return Ok(None);
            }
            if rest.is_some() && items.len() < elements.len() {
                return Ok(None);
            }
            let mut bindings = Vec::new();
            for (pat, item) in elements.iter().zip(items.iter()) {
                match match_pattern(pat, item, env)? {
                    Some(b) => bindings.extend(b),
                    None => return Ok(None),
                }
            }
            if let Some(rest_name) = rest {
                let tail: im::Vector<Value> = items.iter().skip(elements.len()).cloned().collect();
                bindings.push((rest_name.clone(), Value::List(tail)));
            }
            Ok(Some(bindings))
        }
        PatternKind::Dict { entries } => {
            let Value::Dict(d) = value else { return Ok(None) };
            let mut bindings = Vec::new();
            for (key, pat) in entries {
                let k = ValueKey::new(Value::String(Rc::from(key.as_str()))).expect("strings are always hashable");
                match d.get(&k) {
                    Some(v) => match match_pattern(pat, v, env)? {
                        Some(b) => bindings.extend(b),
                        None => return Ok(None),
                    },
                    None => return Ok(None),
                }
            }
            Ok(Some(bindings))
        }
        PatternKind::Guard { pattern: inner, condition } => match match_pattern(inner, value, env)? {
            Some(bindings) => {
                let child = Environment::child(env);
                for (name, v) in &bindings {
                    child.declare(name.clone(), v.clone(), false)?;
                }
                let cond = eval_expr(condition, &child)?;
                Ok(if cond.is_truthy() { Some(bindings) } else { None })
            }
            None => Ok(None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str) -> Result<Value, InterpreterError> {
        let program = Parser::new(src)?.parse_program()?;
        let env = Environment::root();
        crate::builtins::register(&env);
        let block = Block { statements: program.statements };
        run_block_to_value(&block, &env)
    }

    #[test]
    fn arithmetic_evaluates_left_to_right_precedence() {
        let v = run("1 + 2 * 3").unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(7))));
    }

    #[test]
    fn let_binds_identifier_pattern() {
        let v = run("let x = 5; x + 1").unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(6))));
    }

    #[test]
    fn let_list_destructuring_binds_rest() {
        let v = run("let [a, ..rest] = [1, 2, 3]; rest").unwrap();
        assert!(v.equals(&Value::List(im::vector![Value::Integer(BigInt::from(2)), Value::Integer(BigInt::from(3))])));
    }

    #[test]
    fn redeclaring_a_name_in_the_same_scope_is_a_name_error() {
        let err = run("let x = 1; let x = 2; x").unwrap_err();
        assert!(matches!(err, InterpreterError::Name { .. }));
    }

    #[test]
    fn if_expression_selects_branch() {
        let v = run("if true { 1 } else { 2 }").unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(1))));
    }

    #[test]
    fn match_expression_dispatches_on_first_matching_arm() {
        let v = run(
            "match 5 {
                0 => \"zero\",
                n if n > 3 => \"big\",
                _ => \"small\",
            }",
        )
        .unwrap();
        assert!(v.equals(&Value::String(Rc::from("big"))));
    }

    #[test]
    fn unmatched_value_raises_domain_error() {
        let err = run("match 5 { 0 => 1 }").unwrap_err();
        assert!(matches!(err, InterpreterError::Domain { .. }));
    }

    #[test]
    fn short_circuit_and_does_not_evaluate_right_side() {
        let v = run("false && (1 / 0)").unwrap();
        assert!(!v.is_truthy());
    }

    #[test]
    fn short_circuit_or_does_not_evaluate_right_side() {
        let v = run("true || (1 / 0)").unwrap();
        assert!(v.is_truthy());
    }

    #[test]
    fn partial_application_equivalences_hold() {
        let a = run("let add = |x, y| { x + y }; add(_, 3)(4)").unwrap();
        let b = run("let add = |x, y| { x + y }; add(4, 3)").unwrap();
        let c = run("let add = |x, y| { x + y }; add(4)(3)").unwrap();
        assert!(a.equals(&b));
        assert!(b.equals(&c));
    }

    #[test]
    fn deep_self_recursion_does_not_overflow_the_stack() {
        let v = run(
            "let count = |n, acc| {
                if n == 0 { acc } else { count(n - 1, acc + 1) }
            };
            count(200000, 0)",
        )
        .unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(200_000))));
    }

    #[test]
    fn return_inside_nested_if_unwinds_to_function_boundary() {
        let v = run(
            "let f = |n| {
                if n > 0 {
                    return \"positive\";
                }
                \"non-positive\"
            };
            f(5)",
        )
        .unwrap();
        assert!(v.equals(&Value::String(Rc::from("positive"))));
    }

    #[test]
    fn dict_literal_bareword_key_is_shorthand_for_a_string_key() {
        let v = run("let d = #{a: 1, b: 2}; d[\"a\"]").unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(1))));
    }

    #[test]
    fn list_index_supports_negative_indices() {
        let v = run("[1, 2, 3][-1]").unwrap();
        assert!(v.equals(&Value::Integer(BigInt::from(3))));
    }

    #[test]
    fn out_of_range_integer_index_is_nil_not_an_error() {
        let v = run("[1, 2, 3][10]").unwrap();
        assert!(matches!(v, Value::Nil));
    }

    #[test]
    fn list_sliced_by_a_range_returns_a_new_list() {
        let v = run("[1, 2, 3, 4, 5][1..3]").unwrap();
        assert!(v.equals(&Value::List(im::vector![Value::Integer(BigInt::from(2)), Value::Integer(BigInt::from(3))])));
    }

    #[test]
    fn string_sliced_by_an_inclusive_range_returns_a_new_string() {
        let v = run("\"hello\"[0..=2]").unwrap();
        assert!(v.equals(&Value::String(Rc::from("hel"))));
    }
}
