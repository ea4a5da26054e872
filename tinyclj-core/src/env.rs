// tinyclj-core - Global bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Global variable bindings created by `def`.

use std::collections::HashMap;

use tinyclj_parser::{Heap, Symbol, Value};

/// Map from symbol to value.
///
/// The environment owns one reference to every bound value. Because values
/// live in a [`Heap`], every operation that drops a binding takes the heap
/// that owns it.
#[derive(Debug, Default)]
pub struct Env {
    bindings: HashMap<Symbol, Value>,
}

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `sym` to `value`, taking ownership of `value`.
    ///
    /// A previous binding is released.
    pub fn define(&mut self, heap: &mut Heap, sym: Symbol, value: Value) {
        if let Some(old) = self.bindings.insert(sym, value) {
            heap.release(old);
        }
    }

    /// Look up a binding. The value is borrowed, not retained.
    pub fn lookup(&self, sym: Symbol) -> Option<Value> {
        self.bindings.get(&sym).copied()
    }

    pub fn contains(&self, sym: Symbol) -> bool {
        self.bindings.contains_key(&sym)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop every binding, releasing the values.
    pub fn clear(&mut self, heap: &mut Heap) {
        for (_, value) in self.bindings.drain() {
            heap.release(value);
        }
    }
}
