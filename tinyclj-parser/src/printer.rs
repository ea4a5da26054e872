// tinyclj-parser - Printer for Tiny-CLJ values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Readable printing (`pr-str`).
//!
//! Output reads back to an equal value wherever the reader can express it.

use crate::symbol::{Symbol, SymbolTable};
use crate::value::{Heap, Object, Value};

enum Step {
    Form(Value),
    Text(&'static str),
}

/// Render `v` the way `pr-str` does.
///
/// Walks the value with an explicit stack, so arbitrarily deep nesting is
/// safe. Released objects print as `#<freed>`.
pub fn pr_str(heap: &Heap, symbols: &SymbolTable, v: Value) -> String {
    let mut out = String::new();
    let mut work = vec![Step::Form(v)];

    while let Some(step) = work.pop() {
        let v = match step {
            Step::Text(s) => {
                out.push_str(s);
                continue;
            }
            Step::Form(v) => v,
        };

        match v {
            Value::Nil => out.push_str("nil"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Symbol(sym) => write_symbol(&mut out, symbols, sym),
            Value::Keyword(sym) => {
                out.push(':');
                write_symbol(&mut out, symbols, sym);
            }
            Value::Obj(r) => match heap.get(r) {
                None => out.push_str("#<freed>"),
                Some(Object::Int(n)) => out.push_str(&n.to_string()),
                Some(Object::String(s)) => write_escaped(&mut out, s),
                Some(Object::List { .. }) => {
                    let items = heap.list_iter(v).into_iter().flatten().collect();
                    push_seq(&mut work, "(", ")", items);
                }
                Some(Object::Vector(items)) => {
                    push_seq(&mut work, "[", "]", items.iter().copied().collect());
                }
                Some(Object::Map(entries)) => {
                    work.push(Step::Text("}"));
                    for (i, (k, val)) in entries.iter().enumerate().rev() {
                        work.push(Step::Form(*val));
                        work.push(Step::Text(" "));
                        work.push(Step::Form(*k));
                        if i > 0 {
                            work.push(Step::Text(", "));
                        }
                    }
                    work.push(Step::Text("{"));
                }
            },
        }
    }

    out
}

/// Queue `open item item ... close`; the stack pops in reverse.
fn push_seq(work: &mut Vec<Step>, open: &'static str, close: &'static str, items: Vec<Value>) {
    work.push(Step::Text(close));
    for (i, item) in items.into_iter().enumerate().rev() {
        work.push(Step::Form(item));
        if i > 0 {
            work.push(Step::Text(" "));
        }
    }
    work.push(Step::Text(open));
}

fn write_symbol(out: &mut String, symbols: &SymbolTable, sym: Symbol) {
    match symbols.name(sym) {
        Some(name) => {
            if let Some(ns) = symbols.namespace(sym) {
                out.push_str(ns);
                out.push('/');
            }
            out.push_str(name);
        }
        None => out.push_str("#<stale-symbol>"),
    }
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

// ============================================================================
// Tests
// ============================================================================
