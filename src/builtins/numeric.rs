//! Shared numeric coercion rules used by arithmetic and comparison builtins.
//!
//! Two `Integer`s combine to an `Integer` except for division, which promotes to
//! `Decimal` unless it divides evenly. Mixing an `Integer` with a
//! `Decimal` always promotes the whole operation to `Decimal`.

use crate::ast::SourceLocation;
use crate::error::InterpreterError;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

pub enum Operand {
    Int(BigInt),
    Dec(f64),
}

pub fn operand(v: &Value, op: &str, loc: SourceLocation) -> Result<Operand, InterpreterError> {
    match v {
        Value::Integer(n) => Ok(Operand::Int(n.clone())),
        Value::Decimal(d) => Ok(Operand::Dec(*d)),
        other => Err(InterpreterError::type_error(op, "Integer or Decimal", other.type_name(), loc.line, loc.column)),
    }
}

fn to_f64(o: &Operand) -> f64 {
    match o {
        Operand::Int(n) => n.to_f64().unwrap_or(f64::NAN),
        Operand::Dec(d) => *d,
    }
}

pub fn add(a: Operand, b: Operand) -> Value {
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => Value::Integer(a + b),
        (a, b) => Value::Decimal(to_f64(&a) + to_f64(&b)),
    }
}

pub fn sub(a: Operand, b: Operand) -> Value {
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => Value::Integer(a - b),
        (a, b) => Value::Decimal(to_f64(&a) - to_f64(&b)),
    }
}

pub fn mul(a: Operand, b: Operand) -> Value {
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => Value::Integer(a * b),
        (a, b) => Value::Decimal(to_f64(&a) * to_f64(&b)),
    }
}

/// Division promotes to `Decimal` unless both operands are `Integer` and the
/// division is exact, in which case it stays an `Integer`.
pub fn div(a: Operand, b: Operand, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => {
            if b.is_zero() {
                return Err(InterpreterError::domain("division by zero", loc.line, loc.column));
            }
            if (&a % &b).is_zero() {
                Ok(Value::Integer(a / b))
            } else {
                Ok(Value::Decimal(a.to_f64().unwrap_or(f64::NAN) / b.to_f64().unwrap_or(f64::NAN)))
            }
        }
        (a, b) => {
            let bf = to_f64(&b);
            if bf == 0.0 {
                return Err(InterpreterError::domain("division by zero", loc.line, loc.column));
            }
            Ok(Value::Decimal(to_f64(&a) / bf))
        }
    }
}

/// Mathematical modulo: the result always takes the sign of the divisor, unlike
/// Rust's `%` which takes the sign of the dividend.
pub fn modulo(a: Operand, b: Operand, loc: SourceLocation) -> Result<Value, InterpreterError> {
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => {
            if b.is_zero() {
                return Err(InterpreterError::domain("division by zero", loc.line, loc.column));
            }
            let r = ((&a % &b) + &b) % &b;
            Ok(Value::Integer(r))
        }
        (a, b) => {
            let (af, bf) = (to_f64(&a), to_f64(&b));
            if bf == 0.0 {
                return Err(InterpreterError::domain("division by zero", loc.line, loc.column));
            }
            let r = ((af % bf) + bf) % bf;
            Ok(Value::Decimal(r))
        }
    }
}

/// Numeric ordering used by `< > <= >=`: an `Integer` is promoted to `f64` when
/// compared against a `Decimal`.
pub fn compare(a: &Value, b: &Value, op: &str, loc: SourceLocation) -> Result<std::cmp::Ordering, InterpreterError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => {
            let x = operand(a, op, loc)?;
            let y = operand(b, op, loc)?;
            to_f64(&x).partial_cmp(&to_f64(&y)).ok_or_else(|| {
                InterpreterError::domain("values are not comparable (NaN)", loc.line, loc.column)
            })
        }
    }
}
