// tinyclj-core - Collection built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection operations: list, vector, count, conj, assoc, get
//!
//! Arguments are borrowed. Anything a new collection keeps is retained first,
//! because the heap constructors take ownership of their elements.

use tinyclj_parser::{Heap, Int, Kind, Value};

use crate::error::{Error, Result};

fn retained(heap: &mut Heap, args: &[Value]) -> Vec<Value> {
    args.iter().map(|v| heap.retain(*v)).collect()
}

// ============================================================================
// Collection Constructors
// ============================================================================

pub fn builtin_list(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let items = retained(heap, args);
    Ok(heap.make_list(items)?)
}

pub fn builtin_vector(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let items = retained(heap, args);
    Ok(heap.make_vector(items)?)
}

// ============================================================================
// Inspection
// ============================================================================

/// (count coll) - number of elements, or characters of a string
pub fn builtin_count(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [coll] = args else {
        return Err(Error::arity(args.len()));
    };
    let n = heap
        .count(*coll)
        .ok_or_else(|| Error::type_error("collection", heap.type_name(*coll)))?;
    Ok(heap.make_int(Int::try_from(n).unwrap_or(Int::MAX))?)
}

/// (get map key) - value for key, nil when absent or not a map
pub fn builtin_get(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [map, key] = args else {
        return Err(Error::arity(args.len()));
    };
    let found = heap.map_get(*map, *key).unwrap_or(Value::Nil);
    Ok(heap.retain(found))
}

// ============================================================================
// Persistent Updates
// ============================================================================

/// (conj coll x & xs) - append to a vector, prepend to a list
pub fn builtin_conj(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [coll, items @ ..] = args else {
        return Err(Error::arity(0));
    };
    let mut acc = heap.retain(*coll);
    for item in items {
        let item = heap.retain(*item);
        acc = match heap.kind(acc) {
            Kind::Vector => {
                let next = heap.vector_conj(acc, item);
                heap.release(acc);
                next?
            }
            // the new cell takes over our reference to `acc`
            Kind::List | Kind::Nil => heap.cons(item, acc)?,
            other => {
                heap.release(item);
                heap.release(acc);
                return Err(Error::type_error("collection", other.name()));
            }
        };
    }
    Ok(acc)
}

/// (assoc map k v & kvs)
pub fn builtin_assoc(heap: &mut Heap, args: &[Value]) -> Result<Value> {
    let [map, kvs @ ..] = args else {
        return Err(Error::arity(0));
    };
    if kvs.is_empty() || kvs.len() % 2 != 0 {
        return Err(Error::arity(args.len()));
    }
    let mut acc = heap.retain(*map);
    for pair in kvs.chunks(2) {
        let k = heap.retain(pair[0]);
        let v = heap.retain(pair[1]);
        let next = heap.map_assoc(acc, k, v);
        heap.release(acc);
        acc = next?;
    }
    Ok(acc)
}
