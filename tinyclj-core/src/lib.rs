// tinyclj-core - Runtime core for the Tiny-CLJ language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # tinyclj-core
//!
//! Runtime core for Tiny-CLJ: checked integer arithmetic, error taxonomy,
//! configuration, a minimal evaluator and the [`Runtime`] context that ties
//! the heap, symbol table and global bindings together.

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod runtime;

pub use builtins::{
    checked_add, checked_div, checked_mul, checked_neg, checked_quot, checked_rem, checked_sub,
};
pub use config::RuntimeConfig;
pub use env::Env;
pub use error::{ArithOp, ArithmeticError, Error, Result};
pub use eval::{Evaluator, eval};
pub use runtime::Runtime;

// Re-export parser types for convenience
pub use tinyclj_parser::{Heap, Symbol, SymbolTable, Value};
