// tinyclj-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for Tiny-CLJ integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Available Helpers
//!
//! - [`init_logging`] - Install `env_logger` once per test binary
//! - [`eval_str`] - Evaluate code in a fresh runtime, printing the result
//! - [`eval_str_with_runtime`] - Evaluate code in an existing runtime
//! - [`new_runtime`] - Create a runtime with logging installed
//!
//! # Macros
//!
//! - [`assert_eval!`] - Assert that code prints as the expected text
//! - [`assert_eval_err!`] - Assert that code fails with the expected message

#[allow(unused_imports)]
pub use tinyclj_core::{Error, Heap, Runtime, RuntimeConfig, SymbolTable, Value};

/// Install `env_logger` for the test binary. Safe to call repeatedly.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a fresh runtime with default limits.
#[must_use]
#[allow(dead_code)]
pub fn new_runtime() -> Runtime {
    init_logging();
    Runtime::new()
}

/// Evaluate every form of `s` in a fresh runtime.
///
/// # Returns
///
/// The printed result, or the error message.
#[must_use]
#[allow(dead_code)]
pub fn eval_str(s: &str) -> Result<String, String> {
    let mut rt = new_runtime();
    let out = eval_str_with_runtime(s, &mut rt);
    rt.reset();
    out
}

/// Evaluate every form of `s` in the given runtime.
///
/// The result is printed and released, so a runtime with no global bindings
/// holds no live objects afterwards.
#[must_use]
#[allow(dead_code)]
pub fn eval_str_with_runtime(s: &str, rt: &mut Runtime) -> Result<String, String> {
    let v = rt.eval_str(s).map_err(|e| e.to_string())?;
    let printed = rt.pr_str(v);
    rt.release(v);
    Ok(printed)
}

/// Assert that evaluating code prints as the expected text.
#[macro_export]
macro_rules! assert_eval {
    ($input:expr, $expected:expr) => {
        assert_eq!(
            $crate::common::eval_str($input),
            Ok($expected.to_string()),
            "Evaluating: {}",
            $input
        );
    };
}

/// Assert that evaluating code fails with exactly the expected message.
#[macro_export]
macro_rules! assert_eval_err {
    ($input:expr, $expected:expr) => {
        assert_eq!(
            $crate::common::eval_str($input),
            Err($expected.to_string()),
            "Expected error for: {}",
            $input
        );
    };
}
