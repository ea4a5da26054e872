// tinyclj-core - String built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! String operations: str

use tinyclj_parser::{Heap, SymbolTable, Value, pr_str};

use crate::error::Result;

/// (str & args) - concatenate; strings contribute their text, nil nothing,
/// everything else its printed form
pub fn builtin_str(heap: &mut Heap, symbols: &SymbolTable, args: &[Value]) -> Result<Value> {
    let mut result = String::new();
    for arg in args {
        match heap.as_str(*arg) {
            Some(s) => result.push_str(s),
            None if arg.is_nil() => {}
            None => result.push_str(&pr_str(heap, symbols, *arg)),
        }
    }
    Ok(heap.make_string(&result)?)
}
