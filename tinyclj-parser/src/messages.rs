// tinyclj-parser - Error message catalog
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Fixed, user-visible error strings.
//!
//! These are compared verbatim by external test harnesses, so the text must
//! not change. Every error kind in the workspace renders one of these.

pub const ERR_EXPECTED_NUMBER: &str = "Expected number";
pub const ERR_WRONG_ARITY_ZERO: &str = "Wrong number of args: 0";
pub const ERR_DIVIDE_BY_ZERO: &str = "Divide by zero";

pub const ERROR_EOF_VECTOR: &str = "EOF while reading vector";
pub const ERROR_EOF_MAP: &str = "EOF while reading map";
pub const ERROR_EOF_LIST: &str = "EOF while reading list";
pub const ERROR_UNMATCHED_DELIMITER: &str = "Unmatched delimiter";
pub const ERROR_DIVISION_BY_ZERO: &str = "Division by zero";
pub const ERROR_INVALID_SYNTAX: &str = "Invalid syntax";
pub const ERROR_UNDEFINED_VARIABLE: &str = "Undefined variable";
pub const ERROR_TYPE_MISMATCH: &str = "Type mismatch";
pub const ERROR_STACK_OVERFLOW: &str = "Stack overflow";
pub const ERROR_MEMORY_ALLOCATION: &str = "Memory allocation failed";

/// Exception type reported for every arithmetic failure.
pub const EXCEPTION_ARITHMETIC: &str = "ArithmeticException";
/// Exception type reported for reader failures.
pub const EXCEPTION_PARSE: &str = "ParseError";
/// Exception type reported for everything else.
pub const EXCEPTION_RUNTIME: &str = "RuntimeException";

// Overflow templates. `%d` is replaced by the operands, see
// `format_template`.
pub const ERR_INTEGER_OVERFLOW_ADDITION: &str =
    "Integer overflow in addition: %d + %d would exceed INT_MAX";
pub const ERR_INTEGER_UNDERFLOW_ADDITION: &str =
    "Integer underflow in addition: %d + %d would exceed INT_MIN";
pub const ERR_INTEGER_OVERFLOW_SUBTRACTION: &str =
    "Integer overflow in subtraction: %d - %d would exceed INT_MAX";
pub const ERR_INTEGER_UNDERFLOW_SUBTRACTION: &str =
    "Integer underflow in subtraction: %d - %d would exceed INT_MIN";
pub const ERR_INTEGER_OVERFLOW_MULTIPLICATION: &str =
    "Integer overflow in multiplication: %d * %d would exceed INT_MAX";
pub const ERR_INTEGER_OVERFLOW_DIVISION: &str =
    "Integer overflow in division: %d / %d would exceed INT_MAX";

/// Substitute each `%d` in `template` with the next integer from `args`.
///
/// Surplus placeholders are left as they are.
pub fn format_template(template: &str, args: &[i64]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 11);
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%d") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(n) => out.push_str(&n.to_string()),
            None => out.push_str("%d"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
