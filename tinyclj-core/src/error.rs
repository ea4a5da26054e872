// tinyclj-core - Error types for the Tiny-CLJ runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for Tiny-CLJ evaluation.
//!
//! Every error renders one fixed catalog message (see
//! [`tinyclj_parser::messages`]). Overflow messages are the only ones that
//! carry the operands.

use std::fmt;

use thiserror::Error;
use tinyclj_parser::messages::*;
use tinyclj_parser::{
    HeapError, Int, ReadError, ReadErrorKind, ResourceError, SemanticError, SyntaxError,
};

/// Result type for Tiny-CLJ evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Binary operator named in an overflow report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        })
    }
}

/// Failure of a checked integer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// Result above `INT_MAX`
    #[error("{}", overflow_message(.op, .lhs, .rhs))]
    Overflow { op: ArithOp, lhs: Int, rhs: Int },
    /// Sum or difference below `INT_MIN`
    #[error("{}", underflow_message(.op, .lhs, .rhs))]
    Underflow { op: ArithOp, lhs: Int, rhs: Int },
    /// `/` with a zero divisor
    #[error("{}", ERR_DIVIDE_BY_ZERO)]
    DivideByZero,
    /// `quot` or `rem` with a zero divisor
    #[error("{}", ERROR_DIVISION_BY_ZERO)]
    DivisionByZero,
}

fn overflow_message(op: &ArithOp, lhs: &Int, rhs: &Int) -> String {
    let template = match op {
        ArithOp::Add => ERR_INTEGER_OVERFLOW_ADDITION,
        ArithOp::Sub => ERR_INTEGER_OVERFLOW_SUBTRACTION,
        ArithOp::Mul => ERR_INTEGER_OVERFLOW_MULTIPLICATION,
        ArithOp::Div => ERR_INTEGER_OVERFLOW_DIVISION,
    };
    format_template(template, &[i64::from(*lhs), i64::from(*rhs)])
}

fn underflow_message(op: &ArithOp, lhs: &Int, rhs: &Int) -> String {
    let template = match op {
        ArithOp::Add => ERR_INTEGER_UNDERFLOW_ADDITION,
        ArithOp::Sub => ERR_INTEGER_UNDERFLOW_SUBTRACTION,
        // products and quotients only have an overflow message
        ArithOp::Mul | ArithOp::Div => return overflow_message(op, lhs, rhs),
    };
    format_template(template, &[i64::from(*lhs), i64::from(*rhs)])
}

/// Errors that can occur while reading or evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed source, with the position where it was detected
    #[error("{kind}")]
    Syntax {
        kind: SyntaxError,
        line: usize,
        column: usize,
    },
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        match e.kind {
            ReadErrorKind::Syntax(kind) => Error::Syntax {
                kind,
                line: e.line,
                column: e.column,
            },
            ReadErrorKind::Resource(r) => Error::Resource(r),
        }
    }
}

impl From<HeapError> for Error {
    fn from(e: HeapError) -> Self {
        match e {
            HeapError::Resource(r) => Error::Resource(r),
            HeapError::Semantic(s) => Error::Semantic(s),
        }
    }
}

impl Error {
    /// The exception type name reported alongside the message.
    pub fn exception_type(&self) -> &'static str {
        match self {
            Error::Arithmetic(_) => EXCEPTION_ARITHMETIC,
            Error::Syntax { .. } => EXCEPTION_PARSE,
            Error::Resource(_) | Error::Semantic(_) => EXCEPTION_RUNTIME,
        }
    }

    /// Create an undefined variable error.
    pub fn undefined(name: impl Into<String>) -> Self {
        Error::Semantic(SemanticError::UndefinedVariable { name: name.into() })
    }

    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        Error::Semantic(SemanticError::type_mismatch(expected, got))
    }

    /// Create an arity error.
    pub fn arity(got: usize) -> Self {
        Error::Semantic(SemanticError::WrongArity { got })
    }
}
