// tinyclj-core - Sequence built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Sequence operations: first, rest
//!
//! Lists and vectors are sequences, and `nil` is the empty sequence.

use tinyclj_parser::{Heap, Kind, Value};

use crate::error::{Error, Result};

/// (first coll) - first element, nil when empty
pub fn builtin_first(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [coll] = args else {
        return Err(Error::arity(args.len()));
    };
    let found = match heap.kind(*coll) {
        Kind::Nil => None,
        Kind::List => heap.first(*coll),
        Kind::Vector => heap
            .vector_items(*coll)
            .and_then(|items| items.front().copied()),
        other => return Err(Error::type_error("sequence", other.name())),
    };
    Ok(heap.retain(found.unwrap_or(Value::Nil)))
}

/// (rest coll) - everything after the first element, always a list
pub fn builtin_rest(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [coll] = args else {
        return Err(Error::arity(args.len()));
    };
    match heap.kind(*coll) {
        Kind::Nil => Ok(heap.empty_list()?),
        Kind::List => match heap.list_tail(*coll) {
            // the tail cell is already the rest
            Some(tail @ Value::Obj(_)) => Ok(heap.retain(tail)),
            _ => Ok(heap.empty_list()?),
        },
        Kind::Vector => {
            let items: Vec<Value> = heap
                .vector_items(*coll)
                .map(|items| items.iter().skip(1).copied().collect())
                .unwrap_or_default();
            let items = items.into_iter().map(|v| heap.retain(v)).collect();
            Ok(heap.make_list(items)?)
        }
        other => Err(Error::type_error("sequence", other.name())),
    }
}
