// tinyclj-parser - Symbol table with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers that may be optionally namespaced.
//!
//! # Interning
//!
//! Every symbol name is interned in a [`SymbolTable`], so two symbols with the
//! same namespace and name are the same [`Symbol`] handle. This gives:
//!
//! - **O(1) equality**: comparing symbols compares two small integers
//! - **O(1) hashing**: the hash is the handle itself
//! - **No per-use allocation**: a symbol in a parsed form costs no heap object
//!
//! # Lifetime
//!
//! The table is an explicit context object, not process state. Entries live
//! until [`SymbolTable::clear`], which drops every entry and moves the table to
//! a new generation. Handles from an earlier generation are *stale*: they no
//! longer resolve and can never compare equal to a handle issued afterwards,
//! even when the name is the same.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// An interned symbol handle.
///
/// Only meaningful together with the [`SymbolTable`] that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    index: u32,
    generation: u32,
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol(#{}@{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct SymbolEntry {
    namespace: Option<Rc<str>>,
    name: Rc<str>,
}

/// Key type for the interner: (namespace, name)
type InternerKey = (Option<Rc<str>>, Rc<str>);

/// Interns symbol names to unique identities.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Map from (namespace, name) to entry index
    index: HashMap<InternerKey, u32>,
    entries: Vec<SymbolEntry>,
    /// Interned strings for reuse between namespaces and names
    strings: HashSet<Rc<str>>,
    generation: u32,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn intern_string(&mut self, s: &str) -> Rc<str> {
        if let Some(interned) = self.strings.get(s) {
            Rc::clone(interned)
        } else {
            let interned: Rc<str> = Rc::from(s);
            self.strings.insert(Rc::clone(&interned));
            interned
        }
    }

    /// Return the canonical symbol for `name`, creating it on first sight.
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.intern_entry(None, name)
    }

    /// Return the canonical symbol for `namespace/name`.
    pub fn intern_ns(&mut self, namespace: &str, name: &str) -> Symbol {
        self.intern_entry(Some(namespace), name)
    }

    /// Intern a symbol written as "foo" or "ns/foo".
    pub fn parse(&mut self, s: &str) -> Symbol {
        let (ns, name) = split_qualified(s);
        self.intern_entry(ns, name)
    }

    fn intern_entry(&mut self, namespace: Option<&str>, name: &str) -> Symbol {
        let ns = namespace.map(|s| self.intern_string(s));
        let n = self.intern_string(name);

        let key = (ns.clone(), n.clone());
        if let Some(&index) = self.index.get(&key) {
            return self.handle(index);
        }

        let index = u32::try_from(self.entries.len())
            .expect("symbol table exceeded u32::MAX entries");
        self.entries.push(SymbolEntry {
            namespace: ns,
            name: n,
        });
        self.index.insert(key, index);
        self.handle(index)
    }

    fn handle(&self, index: u32) -> Symbol {
        Symbol {
            index,
            generation: self.generation,
        }
    }

    fn entry(&self, sym: Symbol) -> Option<&SymbolEntry> {
        if sym.generation != self.generation {
            return None;
        }
        self.entries.get(sym.index as usize)
    }

    /// Whether `sym` was issued by the current generation of this table.
    pub fn contains(&self, sym: Symbol) -> bool {
        self.entry(sym).is_some()
    }

    /// Get the name, or `None` for a stale handle.
    pub fn name(&self, sym: Symbol) -> Option<&str> {
        self.entry(sym).map(|e| &*e.name)
    }

    /// Get the namespace. `None` for plain symbols and stale handles.
    pub fn namespace(&self, sym: Symbol) -> Option<&str> {
        self.entry(sym).and_then(|e| e.namespace.as_deref())
    }

    /// Render the symbol as written: "name" or "ns/name".
    pub fn resolve(&self, sym: Symbol) -> Option<String> {
        self.entry(sym).map(|e| match &e.namespace {
            Some(ns) => format!("{}/{}", ns, e.name),
            None => e.name.to_string(),
        })
    }

    /// Look a name written as "foo" or "ns/foo" up without interning it.
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        let (ns, name) = split_qualified(s);
        let key: InternerKey = (ns.map(Rc::from), Rc::from(name));
        self.index.get(&key).map(|&index| self.handle(index))
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and start a new generation.
    ///
    /// Handles issued before the call become stale.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing symbol table: {} entries, generation {}",
            self.entries.len(),
            self.generation
        );
        self.index.clear();
        self.entries.clear();
        self.strings.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Split "ns/name" into its parts. "/" itself, a leading slash and a trailing
/// slash leave the whole text as a plain name.
fn split_qualified(s: &str) -> (Option<&str>, &str) {
    match s.find('/') {
        Some(slash_pos) if s != "/" && slash_pos > 0 && slash_pos + 1 < s.len() => {
            (Some(&s[..slash_pos]), &s[slash_pos + 1..])
        }
        _ => (None, s),
    }
}

// ============================================================================
// Tests
// ============================================================================
