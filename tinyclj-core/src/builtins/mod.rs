// tinyclj-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in functions for Tiny-CLJ.
//!
//! A built-in borrows its evaluated arguments and returns a value owned by
//! the caller.

mod arithmetic;
mod collections;
mod sequences;
mod strings;

use tinyclj_parser::{Heap, SymbolTable, Value};

use crate::error::Result;

pub use arithmetic::{
    builtin_add, builtin_div, builtin_mul, builtin_quot, builtin_rem, builtin_sub, checked_add,
    checked_div, checked_mul, checked_neg, checked_quot, checked_rem, checked_sub,
};
pub use collections::{
    builtin_assoc, builtin_conj, builtin_count, builtin_get, builtin_list, builtin_vector,
};
pub use sequences::{builtin_first, builtin_rest};
pub use strings::builtin_str;

/// Signature of a built-in that only touches the heap.
pub type NativeFn = fn(&mut Heap, &[Value]) -> Result<Value>;

/// Signature of a built-in that also prints symbols and keywords.
pub type PrintingFn = fn(&mut Heap, &SymbolTable, &[Value]) -> Result<Value>;

#[derive(Clone, Copy, Debug)]
pub enum Builtin {
    Native(NativeFn),
    Printing(PrintingFn),
}

impl Builtin {
    pub fn call(self, heap: &mut Heap, symbols: &SymbolTable, args: &[Value]) -> Result<Value> {
        match self {
            Builtin::Native(f) => f(heap, args),
            Builtin::Printing(f) => f(heap, symbols, args),
        }
    }
}

const BUILTINS: &[(&str, Builtin)] = &[
    // Arithmetic
    ("+", Builtin::Native(builtin_add)),
    ("-", Builtin::Native(builtin_sub)),
    ("*", Builtin::Native(builtin_mul)),
    ("/", Builtin::Native(builtin_div)),
    ("quot", Builtin::Native(builtin_quot)),
    ("rem", Builtin::Native(builtin_rem)),
    // Collections
    ("list", Builtin::Native(builtin_list)),
    ("vector", Builtin::Native(builtin_vector)),
    ("count", Builtin::Native(builtin_count)),
    ("conj", Builtin::Native(builtin_conj)),
    ("assoc", Builtin::Native(builtin_assoc)),
    ("get", Builtin::Native(builtin_get)),
    // Sequences
    ("first", Builtin::Native(builtin_first)),
    ("rest", Builtin::Native(builtin_rest)),
    // Strings
    ("str", Builtin::Printing(builtin_str)),
];

/// Find the built-in registered under `name`.
pub fn lookup_builtin(name: &str) -> Option<Builtin> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, f)| *f)
}
