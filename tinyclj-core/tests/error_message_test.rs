// tinyclj-core - Error message catalog tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for error messages.
//!
//! External harnesses compare messages verbatim, so every test here pins the
//! exact catalog text together with the exception type reported for it.

mod common;

use common::*;
use tinyclj_core::{ArithOp, ArithmeticError};
use tinyclj_parser::messages::*;
use tinyclj_parser::{ResourceError, SemanticError};

/// Evaluate in a fresh runtime and return the error.
fn eval_err(src: &str) -> Error {
    let mut rt = new_runtime();
    let err = rt.eval_str(src).unwrap_err();
    assert_eq!(rt.live_objects(), 0, "leak after {src}");
    err
}

/// Assert that evaluation fails with `message` reported as `exception`.
macro_rules! assert_error_is {
    ($input:expr, $message:expr, $exception:expr) => {
        let err = eval_err($input);
        assert_eq!(err.to_string(), $message, "message for '{}'", $input);
        assert_eq!(err.exception_type(), $exception, "exception for '{}'", $input);
    };
}

// =============================================================================
// Catalog text
// =============================================================================

#[test]
fn test_catalog_strings_are_verbatim() {
    assert_eq!(ERR_EXPECTED_NUMBER, "Expected number");
    assert_eq!(ERR_WRONG_ARITY_ZERO, "Wrong number of args: 0");
    assert_eq!(ERR_DIVIDE_BY_ZERO, "Divide by zero");
    assert_eq!(ERROR_EOF_VECTOR, "EOF while reading vector");
    assert_eq!(ERROR_EOF_MAP, "EOF while reading map");
    assert_eq!(ERROR_EOF_LIST, "EOF while reading list");
    assert_eq!(ERROR_UNMATCHED_DELIMITER, "Unmatched delimiter");
    assert_eq!(ERROR_DIVISION_BY_ZERO, "Division by zero");
    assert_eq!(ERROR_INVALID_SYNTAX, "Invalid syntax");
    assert_eq!(ERROR_UNDEFINED_VARIABLE, "Undefined variable");
    assert_eq!(ERROR_TYPE_MISMATCH, "Type mismatch");
    assert_eq!(ERROR_STACK_OVERFLOW, "Stack overflow");
    assert_eq!(ERROR_MEMORY_ALLOCATION, "Memory allocation failed");
    assert_eq!(EXCEPTION_ARITHMETIC, "ArithmeticException");
}

#[test]
fn test_overflow_templates() {
    assert_eq!(
        format_template(ERR_INTEGER_OVERFLOW_ADDITION, &[1, 2]),
        "Integer overflow in addition: 1 + 2 would exceed INT_MAX"
    );
    assert_eq!(
        format_template(ERR_INTEGER_UNDERFLOW_SUBTRACTION, &[-5, 7]),
        "Integer underflow in subtraction: -5 - 7 would exceed INT_MIN"
    );
    assert_eq!(
        format_template(ERR_INTEGER_OVERFLOW_MULTIPLICATION, &[3]),
        "Integer overflow in multiplication: 3 * %d would exceed INT_MAX"
    );
}

// =============================================================================
// Messages as reported by evaluation
// =============================================================================

#[test]
fn test_reader_errors() {
    assert_error_is!("(", ERROR_EOF_LIST, "ParseError");
    assert_error_is!("[", ERROR_EOF_VECTOR, "ParseError");
    assert_error_is!("{", ERROR_EOF_MAP, "ParseError");
    assert_error_is!(")", ERROR_UNMATCHED_DELIMITER, "ParseError");
    assert_error_is!("1.5", ERROR_INVALID_SYNTAX, "ParseError");
}

#[test]
fn test_arithmetic_errors() {
    assert_error_is!("(/ 5 0)", ERR_DIVIDE_BY_ZERO, EXCEPTION_ARITHMETIC);
    assert_error_is!("(quot 5 0)", ERROR_DIVISION_BY_ZERO, EXCEPTION_ARITHMETIC);
    assert_error_is!(
        "(+ 2147483647 1)",
        "Integer overflow in addition: 2147483647 + 1 would exceed INT_MAX",
        EXCEPTION_ARITHMETIC
    );
}

#[test]
fn test_semantic_errors() {
    assert_error_is!("missing", ERROR_UNDEFINED_VARIABLE, "RuntimeException");
    assert_error_is!("(1 2)", ERROR_TYPE_MISMATCH, "RuntimeException");
    assert_error_is!("(+ :a)", ERR_EXPECTED_NUMBER, "RuntimeException");
    assert_error_is!("(-)", ERR_WRONG_ARITY_ZERO, "RuntimeException");
}

#[test]
fn test_resource_errors() {
    let mut rt = Runtime::with_config(RuntimeConfig::new().with_max_eval_depth(2));
    let err = rt.eval_str("(+ 1 (+ 1 (+ 1 1)))").unwrap_err();
    assert_eq!(err.to_string(), ERROR_STACK_OVERFLOW);
    assert_eq!(err.exception_type(), "RuntimeException");

    let mut rt = Runtime::with_config(RuntimeConfig::new().with_max_objects(0));
    let err = rt.eval_str("1").unwrap_err();
    assert_eq!(err.to_string(), ERROR_MEMORY_ALLOCATION);
}

// =============================================================================
// Error detail beyond the message
// =============================================================================

#[test]
fn test_undefined_variable_carries_name() {
    let err = eval_err("(+ 1 unknown-value)");
    assert_eq!(
        err,
        Error::Semantic(SemanticError::UndefinedVariable {
            name: "unknown-value".to_string()
        })
    );
}

#[test]
fn test_type_mismatch_carries_types() {
    assert_eq!(
        eval_err("(\"f\" 1)"),
        Error::Semantic(SemanticError::TypeMismatch {
            expected: "symbol",
            got: "string"
        })
    );
    assert_eq!(
        eval_err("(+ 1 [2])"),
        Error::Semantic(SemanticError::ExpectedNumber { got: "vector" })
    );
}

#[test]
fn test_overflow_carries_operands() {
    assert_eq!(
        eval_err("(* 65536 -65536)"),
        Error::Arithmetic(ArithmeticError::Overflow {
            op: ArithOp::Mul,
            lhs: 65536,
            rhs: -65536
        })
    );
}

#[test]
fn test_stack_overflow_kind() {
    let mut rt = Runtime::with_config(RuntimeConfig::new().with_max_eval_depth(1));
    assert_eq!(
        rt.eval_str("(+ 1 2)").unwrap_err(),
        Error::Resource(ResourceError::StackOverflow)
    );
}
