// tinyclj-core - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic operations: +, -, *, /, quot, rem
//!
//! ## Integer Overflow Behaviour
//!
//! Integers are 32-bit. Every operation is computed in 64 bits and the result
//! is range-checked before narrowing, so the check itself cannot overflow.
//! Results outside `INT_MIN..=INT_MAX` are reported with the operator and
//! both operands; nothing wraps and nothing is promoted.

use tinyclj_parser::{Heap, Int, SemanticError, Value};

use crate::error::{ArithOp, ArithmeticError, Error, Result};

// ============================================================================
// Checked primitives
// ============================================================================

/// Range-check `wide`. Only `+` and `-` report underflow; every
/// out-of-range product or quotient is an overflow.
fn narrow(op: ArithOp, lhs: Int, rhs: Int, wide: i64) -> std::result::Result<Int, ArithmeticError> {
    Int::try_from(wide).map_err(|_| match op {
        ArithOp::Add | ArithOp::Sub if wide < 0 => ArithmeticError::Underflow { op, lhs, rhs },
        _ => ArithmeticError::Overflow { op, lhs, rhs },
    })
}

pub fn checked_add(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    narrow(ArithOp::Add, a, b, i64::from(a) + i64::from(b))
}

pub fn checked_sub(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    narrow(ArithOp::Sub, a, b, i64::from(a) - i64::from(b))
}

pub fn checked_mul(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    narrow(ArithOp::Mul, a, b, i64::from(a) * i64::from(b))
}

/// Truncating division. `INT_MIN / -1` overflows.
pub fn checked_div(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivideByZero);
    }
    narrow(ArithOp::Div, a, b, i64::from(a) / i64::from(b))
}

/// Same as [`checked_div`] but reports a zero divisor the way `quot` does.
pub fn checked_quot(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    narrow(ArithOp::Div, a, b, i64::from(a) / i64::from(b))
}

/// Remainder with the sign of the dividend. Never overflows.
pub fn checked_rem(a: Int, b: Int) -> std::result::Result<Int, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    narrow(ArithOp::Div, a, b, i64::from(a) % i64::from(b))
}

/// Negation; `-INT_MIN` overflows and is reported as `0 - INT_MIN`.
pub fn checked_neg(a: Int) -> std::result::Result<Int, ArithmeticError> {
    checked_sub(0, a)
}

// ============================================================================
// Built-ins over values
// ============================================================================

fn int_arg(heap: &Heap, v: Value) -> Result<Int> {
    heap.as_int(v).ok_or_else(|| {
        Error::Semantic(SemanticError::ExpectedNumber {
            got: heap.type_name(v),
        })
    })
}

fn int_args(heap: &Heap, args: &[Value]) -> Result<Vec<Int>> {
    args.iter().map(|v| int_arg(heap, *v)).collect()
}

fn fold(
    heap: &mut Heap,
    args: &[Value],
    identity: Int,
    op: fn(Int, Int) -> std::result::Result<Int, ArithmeticError>,
) -> Result<Value> {
    let mut acc = identity;
    for n in int_args(heap, args)? {
        acc = op(acc, n)?;
    }
    Ok(heap.make_int(acc)?)
}

/// (+ & xs) - sum, 0 with no arguments
pub fn builtin_add(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    fold(heap, args, 0, checked_add)
}

/// (* & xs) - product, 1 with no arguments
pub fn builtin_mul(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    fold(heap, args, 1, checked_mul)
}

/// (- x & ys) - negation with one argument, otherwise left-to-right difference
pub fn builtin_sub(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let ns = int_args(heap, args)?;
    let result = match ns.as_slice() {
        [] => return Err(Error::arity(0)),
        [x] => checked_neg(*x)?,
        [first, rest @ ..] => rest
            .iter()
            .try_fold(*first, |acc, n| checked_sub(acc, *n))?,
    };
    Ok(heap.make_int(result)?)
}

/// (/ x & ys) - reciprocal with one argument, otherwise left-to-right quotient
pub fn builtin_div(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let ns = int_args(heap, args)?;
    let result = match ns.as_slice() {
        [] => return Err(Error::arity(0)),
        [x] => checked_div(1, *x)?,
        [first, rest @ ..] => rest
            .iter()
            .try_fold(*first, |acc, n| checked_div(acc, *n))?,
    };
    Ok(heap.make_int(result)?)
}

/// (quot num div)
pub fn builtin_quot(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [a, b] = args else {
        return Err(Error::arity(args.len()));
    };
    let result = checked_quot(int_arg(heap, *a)?, int_arg(heap, *b)?)?;
    Ok(heap.make_int(result)?)
}

/// (rem num div)
pub fn builtin_rem(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [a, b] = args else {
        return Err(Error::arity(args.len()));
    };
    let result = checked_rem(int_arg(heap, *a)?, int_arg(heap, *b)?)?;
    Ok(heap.make_int(result)?)
}
