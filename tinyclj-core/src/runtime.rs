// tinyclj-core - Runtime context
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Runtime struct - main entry point for embedding Tiny-CLJ.

use tinyclj_parser::{Heap, Reader, SymbolTable, Value, pr_str};

use crate::config::RuntimeConfig;
use crate::env::Env;
use crate::error::Result;
use crate::eval::Evaluator;

/// A Tiny-CLJ runtime: object heap, symbol table and global bindings.
///
/// Nothing is process-global; two runtimes never share state.
///
/// # Thread Safety
///
/// **`Runtime` is NOT thread-safe.** The heap uses plain reference counts.
/// Create a separate `Runtime` per thread.
///
/// # Example
///
/// ```rust
/// use tinyclj_core::Runtime;
///
/// let mut rt = Runtime::new();
/// let result = rt.eval_str("(def x 40) (+ x 2)").unwrap();
/// assert_eq!(rt.pr_str(result), "42");
/// rt.release(result);
/// ```
pub struct Runtime {
    heap: Heap,
    symbols: SymbolTable,
    env: Env,
    config: RuntimeConfig,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Create a runtime with the default limits.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Runtime {
            heap: Heap::with_config(config.heap_config()),
            symbols: SymbolTable::new(),
            env: Env::new(),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    // ========================================================================
    // Reading and printing
    // ========================================================================

    /// Read the first form of `source`. The form is owned by the caller.
    pub fn read_str(&mut self, source: &str) -> Result<Option<Value>> {
        let config = self.config.reader_config();
        Ok(Reader::with_config(source, &mut self.heap, &mut self.symbols, config).read()?)
    }

    /// Read every form of `source`. The forms are owned by the caller.
    pub fn read_all_str(&mut self, source: &str) -> Result<Vec<Value>> {
        let config = self.config.reader_config();
        Ok(Reader::with_config(source, &mut self.heap, &mut self.symbols, config).read_all()?)
    }

    /// Render a value the way `pr-str` does.
    pub fn pr_str(&self, v: Value) -> String {
        pr_str(&self.heap, &self.symbols, v)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluate one form. The form is borrowed; the result is owned by the
    /// caller.
    pub fn eval(&mut self, form: Value) -> Result<Value> {
        Evaluator::new(&mut self.heap, &mut self.symbols, &mut self.env)
            .with_max_depth(self.config.max_eval_depth)
            .eval(form)
    }

    /// Read and evaluate every form in `source`.
    ///
    /// Forms and intermediate results are autoreleased in a pool that is
    /// drained before returning, on success and on error alike. Returns the
    /// last result, owned by the caller; `nil` for empty input.
    pub fn eval_str(&mut self, source: &str) -> Result<Value> {
        let forms = self.read_all_str(source)?;
        let max_depth = self.config.max_eval_depth;

        let mut scope = self.heap.pool_scope();
        for form in &forms {
            scope.autorelease(*form);
        }

        let mut last = Value::Nil;
        for form in forms {
            let result = Evaluator::new(&mut scope, &mut self.symbols, &mut self.env)
                .with_max_depth(max_depth)
                .eval(form)?;
            last = scope.autorelease(result);
        }
        Ok(scope.retain(last))
    }

    /// Look up a global binding (borrowed, not retained). `name` is written
    /// the same way as for [`define`](Self::define).
    pub fn get(&self, name: &str) -> Option<Value> {
        let sym = self.symbols.lookup(name)?;
        self.env.lookup(sym)
    }

    /// Bind a global, taking ownership of `value`.
    pub fn define(&mut self, name: &str, value: Value) {
        let sym = self.symbols.parse(name);
        self.env.define(&mut self.heap, sym, value);
    }

    // ========================================================================
    // Ownership helpers
    // ========================================================================

    pub fn retain(&mut self, v: Value) -> Value {
        self.heap.retain(v)
    }

    pub fn release(&mut self, v: Value) {
        self.heap.release(v)
    }

    pub fn autorelease(&mut self, v: Value) -> Value {
        self.heap.autorelease(v)
    }

    pub fn live_objects(&self) -> usize {
        self.heap.live_objects()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Drain every autorelease pool, including the base pool.
    pub fn pool_cleanup_all(&mut self) {
        self.heap.pool_cleanup_all();
    }

    /// Reset the symbol table.
    ///
    /// Global bindings are keyed by symbol, so they are released too: no
    /// symbol issued afterwards could reach them.
    pub fn symbol_table_cleanup(&mut self) {
        self.env.clear(&mut self.heap);
        self.symbols.clear();
    }

    /// Return to a freshly created state: bindings released, pools drained,
    /// symbol table cleared.
    pub fn reset(&mut self) {
        log::debug!(
            "resetting runtime: {} binding(s), {} live object(s)",
            self.env.len(),
            self.heap.live_objects()
        );
        self.env.clear(&mut self.heap);
        self.heap.pool_cleanup_all();
        self.symbols.clear();
    }
}
