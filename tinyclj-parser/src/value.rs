// tinyclj-parser - Value types and the reference-counted object heap
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Core value type for Tiny-CLJ.
//!
//! [`Value`] is a small `Copy` handle. `nil`, booleans, symbols and keywords
//! are immediates; everything else lives in a [`Heap`] slot and is reached
//! through an [`ObjRef`].
//!
//! # Ownership
//!
//! Heap objects are reference counted. A value returned by a constructor is
//! owned by the caller with a count of 1. Passing a value *into* a
//! constructor (`cons`, `make_list`, `make_vector`, `make_map`, ...) hands
//! that ownership to the new collection: the caller must not release it
//! again. If the constructor fails, it releases whatever it was given.
//!
//! [`Heap::retain`] adds an owner, [`Heap::release`] drops one. When the last
//! owner goes the object is freed and its children are released in turn,
//! using an explicit work list so deep structures cannot exhaust the call
//! stack.
//!
//! Collections are immutable once built and can only point at objects that
//! already exist, so the object graph is always acyclic.
//!
//! # Stale handles
//!
//! Every slot carries a generation that is bumped when the slot is freed.
//! Releasing, retaining or reading through a handle whose object is gone is a
//! contract violation and panics.

use std::fmt;

use im::Vector;

use crate::error::{HeapError, ResourceError, SemanticError};
use crate::pool::AutoreleasePool;
use crate::symbol::Symbol;

/// Integer type of the runtime: the C `int` of the embedded targets.
pub type Int = i32;

/// Handle to a heap object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    index: u32,
    generation: u32,
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef(#{}@{})", self.index, self.generation)
    }
}

/// A Tiny-CLJ value.
///
/// `==` on `Value` compares handles (identity). Use [`Heap::equal`] for
/// structural equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// The nil value, representing nothing/absence
    Nil,
    /// Boolean true or false
    Bool(bool),
    /// Interned symbol
    Symbol(Symbol),
    /// Interned keyword (stored without the leading colon)
    Keyword(Symbol),
    /// Reference-counted heap object
    Obj(ObjRef),
}

impl Value {
    pub fn is_nil(self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if this value is truthy (not nil and not false)
    pub fn is_truthy(self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Whether this value needs reference counting.
    pub fn is_heap(self) -> bool {
        matches!(self, Value::Obj(_))
    }
}

/// Type tag of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Symbol,
    Keyword,
    Int,
    String,
    List,
    Vector,
    Map,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Symbol => "symbol",
            Kind::Keyword => "keyword",
            Kind::Int => "int",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Vector => "vector",
            Kind::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a heap object.
#[derive(Clone, Debug)]
pub enum Object {
    Int(Int),
    /// Owned copy of the text
    String(Box<str>),
    /// Cons cell. `tail` is another list or `Nil`; `count` is the number of
    /// elements from this cell on, 0 for the empty list.
    List { head: Value, tail: Value, count: usize },
    Vector(Vector<Value>),
    /// Entries in insertion order, keys unique under [`Heap::equal`]
    Map(Vector<(Value, Value)>),
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::Int(_) => Kind::Int,
            Object::String(_) => Kind::String,
            Object::List { .. } => Kind::List,
            Object::Vector(_) => Kind::Vector,
            Object::Map(_) => Kind::Map,
        }
    }

    fn push_children(&self, out: &mut Vec<ObjRef>) {
        fn push(out: &mut Vec<ObjRef>, v: Value) {
            if let Value::Obj(r) = v {
                out.push(r);
            }
        }
        match self {
            Object::Int(_) | Object::String(_) => {}
            Object::List { head, tail, .. } => {
                push(out, *tail);
                push(out, *head);
            }
            Object::Vector(items) => items.iter().for_each(|v| push(out, *v)),
            Object::Map(entries) => entries.iter().for_each(|(k, v)| {
                push(out, *k);
                push(out, *v);
            }),
        }
    }
}

/// Limits applied by the heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapConfig {
    /// Maximum number of live objects; `None` means unbounded.
    pub max_objects: Option<usize>,
}

#[derive(Debug)]
struct Cell {
    rc: usize,
    object: Object,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

/// Arena of reference-counted objects.
#[derive(Debug)]
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    config: HeapConfig,
    pub(crate) pool: AutoreleasePool,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create an unbounded heap.
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Heap {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            config,
            pool: AutoreleasePool::new(),
        }
    }

    pub fn config(&self) -> HeapConfig {
        self.config
    }

    /// Number of objects currently allocated.
    pub fn live_objects(&self) -> usize {
        self.live
    }

    // ========================================================================
    // Slot management
    // ========================================================================

    fn alloc(&mut self, object: Object) -> Result<ObjRef, ResourceError> {
        if let Some(max) = self.config.max_objects
            && self.live >= max
        {
            log::warn!("heap limit of {} objects reached", max);
            return Err(ResourceError::MemoryAllocation);
        }

        let cell = Cell { rc: 1, object };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].cell = Some(cell);
                index
            }
            None => {
                let index =
                    u32::try_from(self.slots.len()).map_err(|_| ResourceError::MemoryAllocation)?;
                self.slots.push(Slot {
                    generation: 0,
                    cell: Some(cell),
                });
                index
            }
        };
        self.live += 1;
        Ok(ObjRef {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Allocate `object`, releasing its children if allocation fails.
    fn alloc_owned(&mut self, object: Object) -> Result<Value, HeapError> {
        let mut children = Vec::new();
        object.push_children(&mut children);
        match self.alloc(object) {
            Ok(r) => Ok(Value::Obj(r)),
            Err(e) => {
                for child in children {
                    self.release(Value::Obj(child));
                }
                Err(e.into())
            }
        }
    }

    fn cell(&self, r: ObjRef) -> Option<&Cell> {
        self.slots
            .get(r.index as usize)
            .filter(|slot| slot.generation == r.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    #[track_caller]
    fn live_cell_mut(&mut self, r: ObjRef) -> &mut Cell {
        match self
            .slots
            .get_mut(r.index as usize)
            .filter(|slot| slot.generation == r.generation)
            .and_then(|slot| slot.cell.as_mut())
        {
            Some(cell) => cell,
            None => panic!("Double free detected: {:?} was already released", r),
        }
    }

    /// Get the payload of a live object.
    pub fn get(&self, r: ObjRef) -> Option<&Object> {
        self.cell(r).map(|c| &c.object)
    }

    #[track_caller]
    fn object(&self, r: ObjRef) -> &Object {
        match self.get(r) {
            Some(object) => object,
            None => panic!("use of released object {:?}", r),
        }
    }

    /// Whether `v` is an immediate or a live heap object.
    pub fn is_live(&self, v: Value) -> bool {
        match v {
            Value::Obj(r) => self.cell(r).is_some(),
            _ => true,
        }
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Add an owner to `v` and return it. Immediates are returned unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `v` refers to a released object.
    #[track_caller]
    pub fn retain(&mut self, v: Value) -> Value {
        if let Value::Obj(r) = v {
            self.live_cell_mut(r).rc += 1;
        }
        v
    }

    /// Drop one owner of `v`, freeing it and releasing its children when the
    /// count reaches zero. Immediates are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `v` refers to an object that was already freed.
    #[track_caller]
    pub fn release(&mut self, v: Value) {
        let Value::Obj(root) = v else {
            return;
        };
        let mut work = vec![root];
        while let Some(r) = work.pop() {
            let cell = self.live_cell_mut(r);
            cell.rc -= 1;
            if cell.rc > 0 {
                continue;
            }
            let slot = &mut self.slots[r.index as usize];
            let Some(cell) = slot.cell.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(r.index);
            self.live -= 1;
            log::trace!("freed {:?} ({})", r, cell.object.kind());
            cell.object.push_children(&mut work);
        }
    }

    /// Current reference count; 0 for immediates and released objects.
    pub fn refcount(&self, v: Value) -> usize {
        match v {
            Value::Obj(r) => self.cell(r).map_or(0, |c| c.rc),
            _ => 0,
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an integer object.
    pub fn make_int(&mut self, n: Int) -> Result<Value, HeapError> {
        self.alloc_owned(Object::Int(n))
    }

    /// Create a string object holding its own copy of `s`.
    pub fn make_string(&mut self, s: &str) -> Result<Value, HeapError> {
        self.alloc_owned(Object::String(s.into()))
    }

    /// Create an empty list: a cell with nil head and nil tail.
    pub fn empty_list(&mut self) -> Result<Value, HeapError> {
        self.alloc_owned(Object::List {
            head: Value::Nil,
            tail: Value::Nil,
            count: 0,
        })
    }

    /// Prepend `head` to `tail`, taking ownership of both.
    ///
    /// `tail` must be a list or `nil`.
    pub fn cons(&mut self, head: Value, tail: Value) -> Result<Value, HeapError> {
        let count = match tail {
            Value::Nil => 0,
            Value::Obj(r) => match self.object(r) {
                Object::List { count, .. } => *count,
                other => {
                    let got = other.kind().name();
                    self.release(head);
                    self.release(tail);
                    return Err(SemanticError::type_mismatch("list", got).into());
                }
            },
            other => {
                let got = self.kind(other).name();
                self.release(head);
                return Err(SemanticError::type_mismatch("list", got).into());
            }
        };
        self.alloc_owned(Object::List {
            head,
            tail,
            count: count + 1,
        })
    }

    /// Create a list from elements, taking ownership of each.
    pub fn make_list(&mut self, elements: Vec<Value>) -> Result<Value, HeapError> {
        if elements.is_empty() {
            return self.empty_list();
        }
        let mut elements = elements;
        let mut tail = Value::Nil;
        while let Some(head) = elements.pop() {
            match self.cons(head, tail) {
                Ok(cell) => tail = cell,
                Err(e) => {
                    for rest in elements {
                        self.release(rest);
                    }
                    return Err(e);
                }
            }
        }
        Ok(tail)
    }

    /// Create a vector from elements, taking ownership of each.
    pub fn make_vector(&mut self, elements: Vec<Value>) -> Result<Value, HeapError> {
        self.alloc_owned(Object::Vector(elements.into_iter().collect()))
    }

    /// Create a map from key-value pairs, taking ownership of each.
    ///
    /// A repeated key keeps its first occurrence and takes the last value;
    /// the superseded key and value are released.
    pub fn make_map(&mut self, pairs: Vec<(Value, Value)>) -> Result<Value, HeapError> {
        let mut entries: Vector<(Value, Value)> = Vector::new();
        for (key, value) in pairs {
            match self.entry_index(&entries, key) {
                Some(i) => {
                    let (kept, old) = entries.set(i, (Value::Nil, Value::Nil));
                    entries.set(i, (kept, value));
                    self.release(key);
                    self.release(old);
                }
                None => entries.push_back((key, value)),
            }
        }
        self.alloc_owned(Object::Map(entries))
    }

    // ========================================================================
    // Persistent updates
    // ========================================================================

    /// Return a new vector with `item` appended.
    ///
    /// `vector` is only borrowed; `item` is moved into the result.
    pub fn vector_conj(&mut self, vector: Value, item: Value) -> Result<Value, HeapError> {
        let items = match self.vector_items(vector) {
            Some(items) => items.clone(),
            None => {
                let got = self.kind(vector).name();
                self.release(item);
                return Err(SemanticError::type_mismatch("vector", got).into());
            }
        };
        for v in items.iter() {
            self.retain(*v);
        }
        let mut items = items;
        items.push_back(item);
        self.alloc_owned(Object::Vector(items))
    }

    /// Return a new map with `key` bound to `value`.
    ///
    /// `map` is only borrowed; `key` and `value` are moved into the result.
    pub fn map_assoc(&mut self, map: Value, key: Value, value: Value) -> Result<Value, HeapError> {
        let entries = match self.map_entries(map) {
            Some(entries) => entries.clone(),
            None => {
                let got = self.kind(map).name();
                self.release(key);
                self.release(value);
                return Err(SemanticError::type_mismatch("map", got).into());
            }
        };
        let replaced = self.entry_index(&entries, key);
        let mut entries = entries;
        for (i, (k, v)) in entries.iter().enumerate() {
            self.retain(*k);
            if Some(i) != replaced {
                self.retain(*v);
            }
        }
        match replaced {
            Some(i) => {
                let (kept, _) = entries[i];
                entries.set(i, (kept, value));
                self.release(key);
            }
            None => entries.push_back((key, value)),
        }
        self.alloc_owned(Object::Map(entries))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Type tag of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` refers to a released object.
    #[track_caller]
    pub fn kind(&self, v: Value) -> Kind {
        match v {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Symbol(_) => Kind::Symbol,
            Value::Keyword(_) => Kind::Keyword,
            Value::Obj(r) => self.object(r).kind(),
        }
    }

    /// Type name of `v`, for error messages.
    pub fn type_name(&self, v: Value) -> &'static str {
        self.kind(v).name()
    }

    pub fn as_int(&self, v: Value) -> Option<Int> {
        match v {
            Value::Obj(r) => match self.get(r)? {
                Object::Int(n) => Some(*n),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self, v: Value) -> Option<&str> {
        match v {
            Value::Obj(r) => match self.get(r)? {
                Object::String(s) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn vector_items(&self, v: Value) -> Option<&Vector<Value>> {
        match v {
            Value::Obj(r) => match self.get(r)? {
                Object::Vector(items) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn map_entries(&self, v: Value) -> Option<&Vector<(Value, Value)>> {
        match v {
            Value::Obj(r) => match self.get(r)? {
                Object::Map(entries) => Some(entries),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_list(&self, v: Value) -> bool {
        matches!(v, Value::Obj(r) if matches!(self.get(r), Some(Object::List { .. })))
    }

    /// Iterate the elements of a list. Returns `None` if `v` is not a list.
    pub fn list_iter(&self, v: Value) -> Option<ListIter<'_>> {
        self.is_list(v).then_some(ListIter {
            heap: self,
            cursor: v,
        })
    }

    /// Collect the elements of a list (borrowed, not retained).
    pub fn list_items(&self, v: Value) -> Option<Vec<Value>> {
        self.list_iter(v).map(Iterator::collect)
    }

    /// First element of a non-empty list.
    pub fn first(&self, v: Value) -> Option<Value> {
        self.list_iter(v)?.next()
    }

    /// Tail of a non-empty list: the next cell, or `Nil` after the last
    /// element (borrowed, not retained).
    pub fn list_tail(&self, v: Value) -> Option<Value> {
        match v {
            Value::Obj(r) => match self.get(r)? {
                Object::List { tail, count, .. } if *count > 0 => Some(*tail),
                _ => None,
            },
            _ => None,
        }
    }

    /// Element count of a collection or length of a string.
    pub fn count(&self, v: Value) -> Option<usize> {
        match v {
            Value::Nil => Some(0),
            Value::Obj(r) => match self.get(r)? {
                Object::String(s) => Some(s.chars().count()),
                Object::List { count, .. } => Some(*count),
                Object::Vector(items) => Some(items.len()),
                Object::Map(entries) => Some(entries.len()),
                Object::Int(_) => None,
            },
            _ => None,
        }
    }

    /// Look `key` up in `map` by structural equality (borrowed, not retained).
    pub fn map_get(&self, map: Value, key: Value) -> Option<Value> {
        let entries = self.map_entries(map)?;
        self.entry_index(entries, key).map(|i| entries[i].1)
    }

    fn entry_index(&self, entries: &Vector<(Value, Value)>, key: Value) -> Option<usize> {
        entries.iter().position(|(k, _)| self.equal(*k, key))
    }

    // ========================================================================
    // Equality
    // ========================================================================

    /// Structural equality.
    ///
    /// Integers, strings and collections compare by content; symbols and
    /// keywords by identity. Lists never equal vectors. Maps compare as
    /// unordered sets of entries.
    pub fn equal(&self, a: Value, b: Value) -> bool {
        let mut work = vec![(a, b)];
        while let Some((a, b)) = work.pop() {
            if a == b {
                continue;
            }
            let (Value::Obj(ra), Value::Obj(rb)) = (a, b) else {
                return false;
            };
            let (Some(oa), Some(ob)) = (self.get(ra), self.get(rb)) else {
                return false;
            };
            match (oa, ob) {
                (Object::Int(x), Object::Int(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Object::String(x), Object::String(y)) => {
                    if x != y {
                        return false;
                    }
                }
                // element-wise: `(conj '() x)` ends in an empty cell, a read
                // list ends in nil
                (Object::List { count: ca, .. }, Object::List { count: cb, .. }) => {
                    if ca != cb {
                        return false;
                    }
                    let xs = ListIter { heap: self, cursor: a };
                    let ys = ListIter { heap: self, cursor: b };
                    work.extend(xs.zip(ys));
                }
                (Object::Vector(xs), Object::Vector(ys)) => {
                    if xs.len() != ys.len() {
                        return false;
                    }
                    work.extend(xs.iter().copied().zip(ys.iter().copied()));
                }
                (Object::Map(xs), Object::Map(ys)) => {
                    if xs.len() != ys.len() {
                        return false;
                    }
                    for (k, v) in xs.iter() {
                        match self.entry_index(ys, *k) {
                            Some(i) => work.push((*v, ys[i].1)),
                            None => return false,
                        }
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Iterator over the elements of a cons list.
pub struct ListIter<'h> {
    heap: &'h Heap,
    cursor: Value,
}

impl Iterator for ListIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let Value::Obj(r) = self.cursor else {
            return None;
        };
        match self.heap.get(r)? {
            Object::List { head, tail, count } if *count > 0 => {
                self.cursor = *tail;
                Some(*head)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    fn ints(heap: &mut Heap, ns: &[Int]) -> Vec<Value> {
        ns.iter().map(|n| heap.make_int(*n).unwrap()).collect()
    }

    #[test]
    fn test_make_int_has_count_one() {
        let mut heap = Heap::new();
        let v = heap.make_int(42).unwrap();
        assert_eq!(heap.refcount(v), 1);
        assert_eq!(heap.as_int(v), Some(42));
        assert_eq!(heap.live_objects(), 1);
        heap.release(v);
        assert_eq!(heap.live_objects(), 0);
        assert_eq!(heap.refcount(v), 0);
    }

    #[test]
    fn test_string_owns_its_buffer() {
        let mut heap = Heap::new();
        let mut source = String::from("hello");
        let v = heap.make_string(&source).unwrap();
        source.push_str(" world");
        assert_eq!(heap.as_str(v), Some("hello"));
        heap.release(v);
    }

    #[test]
    fn test_retain_release_balance() {
        let mut heap = Heap::new();
        let v = heap.make_string("x").unwrap();
        assert_eq!(heap.retain(v), v);
        assert_eq!(heap.refcount(v), 2);
        heap.release(v);
        assert_eq!(heap.refcount(v), 1);
        assert!(heap.is_live(v));
        heap.release(v);
        assert!(!heap.is_live(v));
    }

    #[test]
    fn test_immediates_are_not_counted() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let sym = Value::Symbol(symbols.intern("foo"));
        for v in [Value::Nil, Value::Bool(true), sym] {
            assert_eq!(heap.retain(v), v);
            heap.release(v);
            assert_eq!(heap.refcount(v), 0);
        }
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_empty_list_release() {
        let mut heap = Heap::new();
        let list = heap.empty_list().unwrap();
        assert_eq!(heap.count(list), Some(0));
        assert_eq!(heap.list_items(list), Some(vec![]));
        assert_eq!(heap.live_objects(), 1);
        heap.release(list);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_list_release_frees_children() {
        let mut heap = Heap::new();
        let items = ints(&mut heap, &[1, 2, 3]);
        let list = heap.make_list(items.clone()).unwrap();
        // three ints and three cells
        assert_eq!(heap.live_objects(), 6);
        assert_eq!(heap.count(list), Some(3));
        let read: Vec<_> = heap
            .list_iter(list)
            .unwrap()
            .map(|v| heap.as_int(v).unwrap())
            .collect();
        assert_eq!(read, vec![1, 2, 3]);
        heap.release(list);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_shared_child_survives_parent() {
        let mut heap = Heap::new();
        let shared = heap.make_int(7).unwrap();
        heap.retain(shared);
        let vector = heap.make_vector(vec![shared]).unwrap();
        assert_eq!(heap.refcount(shared), 2);
        heap.release(vector);
        assert_eq!(heap.refcount(shared), 1);
        heap.release(shared);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_deep_list_release_is_iterative() {
        let mut heap = Heap::new();
        let mut list = heap.empty_list().unwrap();
        for _ in 0..200_000 {
            let inner = heap.make_vector(vec![]).unwrap();
            list = heap.cons(inner, list).unwrap();
        }
        heap.release(list);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    #[should_panic(expected = "Double free detected")]
    fn test_double_release_panics() {
        let mut heap = Heap::new();
        let v = heap.make_int(1).unwrap();
        heap.release(v);
        heap.release(v);
    }

    #[test]
    fn test_stale_handle_not_revived_by_slot_reuse() {
        let mut heap = Heap::new();
        let old = heap.make_int(1).unwrap();
        heap.release(old);
        let new = heap.make_int(2).unwrap();
        assert_ne!(old, new);
        assert!(!heap.is_live(old));
        assert_eq!(heap.as_int(old), None);
        assert_eq!(heap.as_int(new), Some(2));
        heap.release(new);
    }

    #[test]
    fn test_cons_rejects_non_list_tail() {
        let mut heap = Heap::new();
        let head = heap.make_int(1).unwrap();
        let tail = heap.make_int(2).unwrap();
        let err = heap.cons(head, tail).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch");
        // both inputs were handed over and released
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_allocation_limit() {
        let mut heap = Heap::with_config(HeapConfig {
            max_objects: Some(2),
        });
        let a = heap.make_int(1).unwrap();
        let b = heap.make_int(2).unwrap();
        let err = heap.make_vector(vec![a, b]).unwrap_err();
        assert_eq!(err, HeapError::Resource(ResourceError::MemoryAllocation));
        assert_eq!(err.to_string(), "Memory allocation failed");
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_make_map_last_value_wins() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let a = Value::Keyword(symbols.intern("a"));
        let one = heap.make_int(1).unwrap();
        let two = heap.make_int(2).unwrap();
        let map = heap.make_map(vec![(a, one), (a, two)]).unwrap();
        assert_eq!(heap.count(map), Some(1));
        assert_eq!(heap.map_get(map, a).and_then(|v| heap.as_int(v)), Some(2));
        assert!(!heap.is_live(one));
        heap.release(map);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_map_get_uses_structural_keys() {
        let mut heap = Heap::new();
        let key = heap.make_string("k").unwrap();
        let value = heap.make_int(9).unwrap();
        let map = heap.make_map(vec![(key, value)]).unwrap();
        let lookup_key = heap.make_string("k").unwrap();
        assert_eq!(heap.map_get(map, lookup_key), Some(value));
        heap.release(lookup_key);
        heap.release(map);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_vector_conj_shares_elements() {
        let mut heap = Heap::new();
        let items = ints(&mut heap, &[1, 2]);
        let v1 = heap.make_vector(items.clone()).unwrap();
        let three = heap.make_int(3).unwrap();
        let v2 = heap.vector_conj(v1, three).unwrap();
        assert_eq!(heap.count(v1), Some(2));
        assert_eq!(heap.count(v2), Some(3));
        assert_eq!(heap.refcount(items[0]), 2);
        heap.release(v1);
        assert_eq!(heap.refcount(items[0]), 1);
        heap.release(v2);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_map_assoc_replaces_value() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let k = Value::Keyword(symbols.intern("k"));
        let one = heap.make_int(1).unwrap();
        let m1 = heap.make_map(vec![(k, one)]).unwrap();
        let two = heap.make_int(2).unwrap();
        let m2 = heap.map_assoc(m1, k, two).unwrap();
        assert_eq!(heap.map_get(m1, k), Some(one));
        assert_eq!(heap.map_get(m2, k), Some(two));
        assert_eq!(heap.refcount(one), 1);
        heap.release(m1);
        heap.release(m2);
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_structural_equality() {
        let mut heap = Heap::new();
        let xs = ints(&mut heap, &[1, 2]);
        let ys = ints(&mut heap, &[1, 2]);
        let a = heap.make_list(xs).unwrap();
        let b = heap.make_list(ys).unwrap();
        assert!(heap.equal(a, b));

        let zs = ints(&mut heap, &[1, 2]);
        let v = heap.make_vector(zs).unwrap();
        assert!(!heap.equal(a, v));

        let e1 = heap.empty_list().unwrap();
        let e2 = heap.empty_list().unwrap();
        assert!(heap.equal(e1, e2));
        assert!(!heap.equal(e1, a));

        for x in [a, b, v, e1, e2] {
            heap.release(x);
        }
        assert_eq!(heap.live_objects(), 0);
    }

    #[test]
    fn test_symbol_equality_is_identity() {
        let heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let a = Value::Symbol(symbols.intern("a"));
        let a2 = Value::Symbol(symbols.intern("a"));
        let b = Value::Symbol(symbols.intern("b"));
        assert!(heap.equal(a, a2));
        assert!(!heap.equal(a, b));
        assert!(!heap.equal(a, Value::Keyword(symbols.intern("a"))));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let ka = Value::Keyword(symbols.intern("a"));
        let kb = Value::Keyword(symbols.intern("b"));
        let vals = ints(&mut heap, &[1, 2, 1, 2]);
        let m1 = heap.make_map(vec![(ka, vals[0]), (kb, vals[1])]).unwrap();
        let m2 = heap.make_map(vec![(kb, vals[3]), (ka, vals[2])]).unwrap();
        assert!(heap.equal(m1, m2));
        heap.release(m1);
        heap.release(m2);
    }
}
