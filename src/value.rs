// ABOUTME: Runtime value model: the closed union of values the evaluator produces

use crate::ast::{Block, Pattern};
use crate::env::Environment;
use crate::error::InterpreterError;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The closed runtime value union. `List`/`Dict`/`Set` are persistent,
/// structurally-shared collections backed by `im`; mutation only ever produces a
/// new value, except through the explicit transient view (`Transient`).
#[derive(Clone)]
pub enum Value {
    Integer(BigInt),
    Decimal(f64),
    String(Rc<str>),
    Boolean(bool),
    Nil,
    List(im::Vector<Value>),
    Dict(Dict),
    Set(SetValue),
    Range(RangeValue),
    Function(Rc<FunctionValue>),
    BuiltinFunction(Rc<BuiltinFunction>),
    /// A function with some argument slots already bound, others left as `Placeholder`.
    Partial(Rc<PartialApp>),
    Placeholder,
    Sequence(Sequence),
    Section(Rc<SectionValue>),
    /// A mutable, single-owner view over a persistent collection.
    Transient(Rc<RefCell<TransientKind>>),
}

#[derive(Clone)]
pub enum TransientKind {
    List(im::Vector<Value>),
    Dict(Dict),
    Set(SetValue),
}

pub struct FunctionValue {
    pub params: Vec<Pattern>,
    pub body: Block,
    pub env: Rc<Environment>,
}

pub type NativeFn =
    fn(&[Value], &Rc<Environment>, crate::ast::SourceLocation) -> Result<Value, InterpreterError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn min(&self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => *n,
        }
    }
}

pub struct BuiltinFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

pub struct PartialApp {
    pub callee: Value,
    /// Positional slots; unfilled slots hold `Value::Placeholder`.
    pub bound: Vec<Value>,
}

pub struct SectionValue {
    pub body: Block,
    pub env: Rc<Environment>,
}

/// A lazy arithmetic progression of `Integer`s. `end = None` means infinite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeValue {
    pub start: BigInt,
    pub end: Option<BigInt>,
    pub step: BigInt,
    pub inclusive: bool,
}

impl RangeValue {
    pub fn is_infinite(&self) -> bool {
        self.end.is_none()
    }

    /// The number of elements, or `None` if infinite.
    pub fn len(&self) -> Option<usize> {
        let end = self.end.clone()?;
        if self.step.is_zero() {
            return Some(0);
        }
        let span = &end - &self.start;
        let ascending = self.step.is_positive();
        if (ascending && span.is_negative()) || (!ascending && span.is_positive()) {
            return Some(0);
        }
        let (lo, hi) = if ascending {
            (self.start.clone(), end.clone())
        } else {
            (end.clone(), self.start.clone())
        };
        let diff = &hi - &lo;
        let step_abs = self.step.abs();
        let remainder = &diff % &step_abs;
        let count = if self.inclusive {
            &diff / &step_abs + BigInt::from(1)
        } else if remainder.is_zero() {
            diff / &step_abs
        } else {
            diff / &step_abs + BigInt::from(1)
        };
        Some(count.to_usize().unwrap_or(usize::MAX))
    }

    /// The `i`th element (0-indexed), or `None` if past the end.
    pub fn nth(&self, i: usize) -> Option<BigInt> {
        if let Some(len) = self.len() {
            if i >= len {
                return None;
            }
        }
        Some(&self.start + &self.step * BigInt::from(i))
    }

    pub fn contains(&self, n: &BigInt) -> bool {
        if self.step.is_zero() {
            return false;
        }
        let ascending = self.step.is_positive();
        if ascending && n < &self.start {
            return false;
        }
        if !ascending && n > &self.start {
            return false;
        }
        if let Some(end) = &self.end {
            if self.inclusive {
                if ascending && n > end {
                    return false;
                }
                if !ascending && n < end {
                    return false;
                }
            } else if ascending && n >= end {
                return false;
            } else if !ascending && n <= end {
                return false;
            }
        }
        let offset = n - &self.start;
        (&offset % &self.step).is_zero()
    }
}

pub type SequenceFn = Rc<dyn Fn(usize) -> Result<Option<Value>, InterpreterError>>;

/// A general lazy stream: a producer closure plus a memoisation buffer.
#[derive(Clone)]
pub struct Sequence {
    produce: SequenceFn,
    memo: Rc<RefCell<Vec<Value>>>,
}

impl Sequence {
    pub fn new(produce: SequenceFn) -> Self {
        Sequence { produce, memo: Rc::new(RefCell::new(Vec::new())) }
    }

    /// The `i`th element, computing and memoising every element up to it.
    pub fn nth(&self, i: usize) -> Result<Option<Value>, InterpreterError> {
        loop {
            if let Some(v) = self.memo.borrow().get(i) {
                return Ok(Some(v.clone()));
            }
            let next_index = self.memo.borrow().len();
            match (self.produce)(next_index)? {
                Some(v) => self.memo.borrow_mut().push(v),
                None => return Ok(None),
            }
        }
    }
}

/// A key usable in a `Dict`/`Set`: a `Value` restricted to hashable kinds.
#[derive(Clone)]
pub struct ValueKey(pub Value);

impl ValueKey {
    pub fn new(value: Value) -> Result<Self, InterpreterError> {
        if value.is_hashable() {
            Ok(ValueKey(value))
        } else {
            Err(InterpreterError::domain(
                format!("unhashable key of type {}", value.type_name()),
                0,
                0,
            ))
        }
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.equals(&other.0)
    }
}
impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.value_hash(state);
    }
}

impl fmt::Debug for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.inspect())
    }
}

/// Persistent, insertion-ordered mapping. Backed by an `im::HashMap` for
/// O(1) amortised lookup plus an `im::Vector` recording insertion order for iteration.
#[derive(Clone, Default)]
pub struct Dict {
    order: im::Vector<ValueKey>,
    map: im::HashMap<ValueKey, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    pub fn insert(&self, key: ValueKey, value: Value) -> Self {
        let mut map = self.map.clone();
        let mut order = self.order.clone();
        if !map.contains_key(&key) {
            order.push_back(key.clone());
        }
        map.insert(key, value);
        Dict { order, map }
    }

    pub fn remove(&self, key: &ValueKey) -> Self {
        let mut map = self.map.clone();
        map.remove(key);
        let order = self.order.iter().filter(|k| *k != key).cloned().collect();
        Dict { order, map }
    }

    pub fn get(&self, key: &ValueKey) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &ValueKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ValueKey, &Value)> {
        self.order.iter().map(move |k| (k, self.map.get(k).expect("order/map out of sync")))
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(k, v)| other.get(k).is_some_and(|ov| ov.equals(v)))
    }
}

/// Persistent, insertion-ordered set.
#[derive(Clone, Default)]
pub struct SetValue {
    order: im::Vector<ValueKey>,
    set: im::HashSet<ValueKey>,
}

impl SetValue {
    pub fn new() -> Self {
        SetValue::default()
    }

    pub fn insert(&self, key: ValueKey) -> Self {
        let mut set = self.set.clone();
        let mut order = self.order.clone();
        if !set.contains(&key) {
            order.push_back(key.clone());
        }
        set.insert(key);
        SetValue { order, set }
    }

    pub fn remove(&self, key: &ValueKey) -> Self {
        let mut set = self.set.clone();
        set.remove(key);
        let order = self.order.iter().filter(|k| *k != key).cloned().collect();
        SetValue { order, set }
    }

    pub fn contains(&self, key: &ValueKey) -> bool {
        self.set.contains(key)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueKey> {
        self.order.iter()
    }
}

impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Decimal(_) => "Decimal",
            Value::String(_) => "String",
            Value::Boolean(_) => "Boolean",
            Value::Nil => "Nil",
            Value::List(_) => "List",
            Value::Dict(_) => "Dict",
            Value::Set(_) => "Set",
            Value::Range(_) => "Range",
            Value::Function(_) => "Function",
            Value::BuiltinFunction(_) => "BuiltinFunction",
            Value::Partial(_) => "Function",
            Value::Placeholder => "Placeholder",
            Value::Sequence(_) => "Sequence",
            Value::Section(_) => "Section",
            Value::Transient(cell) => match &*cell.borrow() {
                TransientKind::List(_) => "TransientList",
                TransientKind::Dict(_) => "TransientDict",
                TransientKind::Set(_) => "TransientSet",
            },
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => !n.is_zero(),
            Value::Decimal(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Set(s) => !s.is_empty(),
            Value::Range(r) => r.is_infinite() || r.len() != Some(0),
            _ => true,
        }
    }

    pub fn is_hashable(&self) -> bool {
        matches!(
            self,
            Value::Integer(_)
                | Value::Decimal(_)
                | Value::String(_)
                | Value::Boolean(_)
                | Value::Nil
                | Value::List(_)
                | Value::Dict(_)
                | Value::Set(_)
                | Value::Range(_)
        )
    }

    /// Structural equality, defined only over the "Value" tier. Values
    /// outside that tier (functions, sequences, sections, ...) are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            _ => false,
        }
    }

    /// Hash consistent with `equals`.
    pub fn value_hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(n) => n.hash(state),
            Value::Decimal(d) => d.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Nil => {}
            Value::List(items) => {
                for item in items {
                    item.value_hash(state);
                }
            }
            Value::Dict(d) => {
                let mut acc: u64 = 0;
                for (k, v) in d.iter() {
                    let mut h = std::collections::hash_map::DefaultHasher::new();
                    k.hash(&mut h);
                    v.value_hash(&mut h);
                    acc ^= h.finish();
                }
                acc.hash(state);
            }
            Value::Set(s) => {
                let mut acc: u64 = 0;
                for k in s.iter() {
                    let mut h = std::collections::hash_map::DefaultHasher::new();
                    k.hash(&mut h);
                    acc ^= h.finish();
                }
                acc.hash(state);
            }
            Value::Range(r) => {
                r.start.hash(state);
                r.end.hash(state);
                r.step.hash(state);
                r.inclusive.hash(state);
            }
            _ => {}
        }
    }

    /// Canonical textual form: deterministic, round-trippable for
    /// literal-expressible values.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Decimal(d) => format_decimal(*d),
            Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Boolean(b) => b.to_string(),
            Value::Nil => "nil".to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Dict(d) => {
                let parts: Vec<String> =
                    d.iter().map(|(k, v)| format!("{}: {}", k.0.inspect(), v.inspect())).collect();
                format!("#{{{}}}", parts.join(", "))
            }
            Value::Set(s) => {
                let parts: Vec<String> = s.iter().map(|k| k.0.inspect()).collect();
                format!("#{{{}}}", parts.join(", "))
            }
            Value::Range(r) => match (&r.end, r.inclusive) {
                (Some(end), true) => format!("{}..={}", r.start, end),
                (Some(end), false) => format!("{}..{}", r.start, end),
                (None, _) => format!("{}..", r.start),
            },
            Value::Function(_) => "#<function>".to_string(),
            Value::BuiltinFunction(b) => format!("#<builtin:{}>", b.name),
            Value::Partial(_) => "#<function>".to_string(),
            Value::Placeholder => "_".to_string(),
            Value::Sequence(_) => "#<sequence>".to_string(),
            Value::Section(_) => "#<section>".to_string(),
            Value::Transient(cell) => match &*cell.borrow() {
                TransientKind::List(items) => {
                    let parts: Vec<String> = items.iter().map(Value::inspect).collect();
                    format!("#<transient [{}]>", parts.join(", "))
                }
                TransientKind::Dict(_) => "#<transient dict>".to_string(),
                TransientKind::Set(_) => "#<transient set>".to_string(),
            },
        }
    }
}

fn format_decimal(d: f64) -> String {
    if d.fract() == 0.0 && d.is_finite() {
        format!("{d:.1}")
    } else {
        format!("{d}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.inspect()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}
