//! One routine per operator family. All of them take evaluated operands; the
//! short-circuiting forms (`and`, `or`, `?:`, `ex`) live in the interpreter.

use std::cmp::Ordering;

use errors::{Error, Result};
use parser::Op;
use value::Value;

/// `Undef` wins over `Null`, and both win over any computation.
fn empty_operand(left: &Value, right: &Value) -> Option<Value> {
    if left.is_undef() || right.is_undef() {
        Some(Value::Undef)
    } else if left.is_null() || right.is_null() {
        Some(Value::Null)
    } else {
        None
    }
}

fn not_applicable(op: Op, arity: &'static str) -> Error {
    Error::bad_type(format!("operator {op}"), arity)
}

/// Logical truth of an operand. `Undef` and `Null` are false.
pub fn truthy(value: Value) -> Result<bool> {
    match value {
        Value::Undef | Value::Null => Ok(false),
        value => value.fetch_bool(),
    }
}

pub fn binary(op: Op, left: Value, right: Value) -> Result<Value> {
    match op {
        Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Fmod | Op::Pow => arithmetic(op, left, right),
        Op::Iadd | Op::Isub | Op::Imul | Op::Idiv | Op::Imod => integer(op, left, right),
        Op::Eq | Op::NotEq | Op::Less | Op::Greater | Op::LessEq | Op::GreaterEq | Op::Cmp => {
            compare(op, left, right)
        }
        Op::Ieq
        | Op::InotEq
        | Op::Iless
        | Op::Igreater
        | Op::IlessEq
        | Op::IgreaterEq
        | Op::Icmp => icompare(op, left, right),
        Op::Band | Op::Bor | Op::Bxor => bitwise(op, left, right),
        Op::Xor => Ok(Value::Bool(truthy(left)? != truthy(right)?)),
        Op::Scat => Ok(concat(left, right)),
        Op::Srep => repeat(left, right),
        _ => Err(not_applicable(op, "binary operator")),
    }
}

/// `+ - *` stay integers when both operands are integers (wrapping on
/// overflow). `/ % **` always compute in floating point.
fn arithmetic(op: Op, left: Value, right: Value) -> Result<Value> {
    if let Some(empty) = empty_operand(&left, &right) {
        return Ok(empty);
    }

    let (left, right) = (left.cast_numeric()?, right.cast_numeric()?);
    Ok(match (op, &left, &right) {
        (Op::Add, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_add(*r)),
        (Op::Sub, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_sub(*r)),
        (Op::Mul, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_mul(*r)),
        _ => {
            let (l, r) = (left.fetch_float()?, right.fetch_float()?);
            Value::Float(match op {
                Op::Add => l + r,
                Op::Sub => l - r,
                Op::Mul => l * r,
                Op::Div => l / r,
                Op::Fmod => l % r,
                _ => l.powf(r),
            })
        }
    })
}

fn integer(op: Op, left: Value, right: Value) -> Result<Value> {
    if let Some(empty) = empty_operand(&left, &right) {
        return Ok(empty);
    }

    let (l, r) = (left.fetch_int()?, right.fetch_int()?);
    Ok(Value::Int(match op {
        Op::Iadd => l.wrapping_add(r),
        Op::Isub => l.wrapping_sub(r),
        Op::Imul => l.wrapping_mul(r),
        _ if r == 0 => return Err(Error::DivideByZero),
        Op::Idiv => l.wrapping_div(r),
        _ => l.wrapping_rem(r),
    }))
}

/// `Null` sorts before everything else and equals only itself.
fn null_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        _ => None,
    }
}

/// Two strings compare by text, everything else as floating point numbers.
/// `None` is the unordered result of comparing NaN.
fn compare(op: Op, left: Value, right: Value) -> Result<Value> {
    if left.is_undef() || right.is_undef() {
        return Ok(Value::Undef);
    }

    let ordering = match (&left, &right) {
        (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        (l, r) => match null_ordering(l, r) {
            Some(ordering) => Some(ordering),
            None => l.fetch_float()?.partial_cmp(&r.fetch_float()?),
        },
    };
    Ok(ordering_result(op, ordering))
}

fn icompare(op: Op, left: Value, right: Value) -> Result<Value> {
    if left.is_undef() || right.is_undef() {
        return Ok(Value::Undef);
    }

    let ordering = match null_ordering(&left, &right) {
        Some(ordering) => ordering,
        None => left.fetch_int()?.cmp(&right.fetch_int()?),
    };
    Ok(ordering_result(op, Some(ordering)))
}

fn ordering_result(op: Op, ordering: Option<Ordering>) -> Value {
    use Ordering::*;

    match op {
        Op::Cmp | Op::Icmp => match ordering {
            Some(ordering) => Value::Int(ordering as i64),
            None => Value::Undef,
        },
        Op::Eq | Op::Ieq => Value::Bool(ordering == Some(Equal)),
        Op::NotEq | Op::InotEq => Value::Bool(ordering != Some(Equal)),
        Op::Less | Op::Iless => Value::Bool(ordering == Some(Less)),
        Op::Greater | Op::Igreater => Value::Bool(ordering == Some(Greater)),
        Op::LessEq | Op::IlessEq => Value::Bool(matches!(ordering, Some(Less | Equal))),
        _ => Value::Bool(matches!(ordering, Some(Greater | Equal))),
    }
}

fn bitwise(op: Op, left: Value, right: Value) -> Result<Value> {
    if let Some(empty) = empty_operand(&left, &right) {
        return Ok(empty);
    }

    let (l, r) = (left.fetch_int()?, right.fetch_int()?);
    Ok(Value::Int(match op {
        Op::Band => l & r,
        Op::Bor => l | r,
        _ => l ^ r,
    }))
}

fn text(value: Value) -> String {
    match value.cast_string() {
        Value::Str(s) => s,
        other => other.to_string(),
    }
}

fn concat(left: Value, right: Value) -> Value {
    let mut s = text(left);
    s.push_str(&text(right));
    Value::Str(s)
}

/// `s x n` repeats `s` n times. Counts below one give an empty string, an
/// `Undef`/`Null` count passes through.
fn repeat(left: Value, right: Value) -> Result<Value> {
    if right.is_empty() {
        return Ok(right);
    }
    let count = usize::try_from(right.fetch_int()?).unwrap_or(0);
    let s = text(left);
    if s.is_empty() {
        return Ok(Value::Str(s));
    }

    let mut repeated = String::new();
    let len = s.len().checked_mul(count).ok_or(Error::OutOfMemory)?;
    repeated.try_reserve(len).map_err(|_| Error::OutOfMemory)?;
    for _ in 0..count {
        repeated.push_str(&s);
    }
    Ok(Value::Str(repeated))
}

pub fn unary(op: Op, operand: Value) -> Result<Value> {
    match op {
        Op::Not => Ok(Value::Bool(!truthy(operand)?)),
        Op::Int => operand.cast_int(),
        Op::Float => operand.cast_float(),
        Op::Bool => operand.cast_bool(),
        Op::Str => Ok(operand.cast_string()),
        // Every other unary operator passes `Undef`/`Null` through
        _ if operand.is_empty() => Ok(operand),
        Op::Pos => operand.cast_numeric(),
        Op::Neg => match operand.cast_numeric()? {
            Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
            other => Ok(Value::Float(-other.fetch_float()?)),
        },
        Op::BitNot => Ok(Value::Int(!operand.fetch_int()?)),
        Op::Psign => Ok(Value::Bool(operand.fetch_float()? > 0.0)),
        Op::Nsign => Ok(Value::Bool(operand.fetch_float()? < 0.0)),
        Op::Db => Ok(Value::Float(10_f64.powf(operand.fetch_float()? / 20.0))),
        Op::Slen => Ok(Value::Int(text(operand).chars().count() as i64)),
        Op::Srev => Ok(Value::Str(text(operand).chars().rev().collect())),
        Op::Supr => Ok(Value::Str(text(operand).to_uppercase())),
        Op::Slwr => Ok(Value::Str(text(operand).to_lowercase())),
        _ => Err(not_applicable(op, "unary operator")),
    }
}
