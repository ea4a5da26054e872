// tinyclj-core - Minimal evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Evaluator for Tiny-CLJ forms.
//!
//! Covers what the runtime core needs to be exercised end to end: self
//! evaluating atoms, global symbols, collection literals, `quote`, `def`,
//! `if` and calls to the built-ins.
//!
//! # Ownership
//!
//! The form passed to [`Evaluator::eval`] is borrowed. The result is owned by
//! the caller, who must release it (or autorelease it).
//!
//! # Depth
//!
//! Compound forms are evaluated on an explicit stack of frames rather than
//! the Rust call stack. Nesting is bounded only by the configured maximum
//! depth, which fails with `"Stack overflow"`.

use tinyclj_parser::{Heap, Kind, ResourceError, Symbol, SymbolTable, Value};

use crate::builtins::{Builtin, lookup_builtin};
use crate::config::DEFAULT_MAX_EVAL_DEPTH;
use crate::env::Env;
use crate::error::{Error, Result};

/// What a frame does with its results once every sub-form is evaluated.
enum Task {
    Vector,
    Map,
    Call(Builtin),
    Def(Symbol),
    /// The test is the only sub-form; its result picks the branch
    If { then: Value, otherwise: Value },
}

/// A compound form whose sub-forms are being evaluated.
struct Frame {
    task: Task,
    /// Sub-forms still to evaluate, borrowed from the enclosing form
    pending: std::vec::IntoIter<Value>,
    /// Owned results, in order
    done: Vec<Value>,
}

impl Frame {
    fn new(task: Task, forms: Vec<Value>) -> Self {
        Frame {
            task,
            done: Vec::with_capacity(forms.len()),
            pending: forms.into_iter(),
        }
    }
}

enum Step {
    /// A finished value, owned
    Value(Value),
    /// Evaluate the frame's sub-forms first
    Push(Frame),
    /// Evaluate this form in place of the one just finished
    Eval(Value),
}

/// Borrowed view of everything evaluation touches.
pub struct Evaluator<'a> {
    pub heap: &'a mut Heap,
    pub symbols: &'a mut SymbolTable,
    pub env: &'a mut Env,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(heap: &'a mut Heap, symbols: &'a mut SymbolTable, env: &'a mut Env) -> Self {
        Evaluator {
            heap,
            symbols,
            env,
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate `form`, returning an owned result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A symbol has no global binding
    /// - A built-in rejects its arguments
    /// - Nesting exceeds the configured maximum depth
    pub fn eval(&mut self, form: Value) -> Result<Value> {
        let mut frames = Vec::new();
        let result = self.run(form, &mut frames);
        if result.is_err() {
            for frame in frames {
                for v in frame.done {
                    self.heap.release(v);
                }
            }
        }
        result
    }

    fn run(&mut self, form: Value, frames: &mut Vec<Frame>) -> Result<Value> {
        let mut step = self.begin(form, frames.len())?;
        loop {
            match step {
                Step::Eval(form) => {
                    step = self.begin(form, frames.len())?;
                    continue;
                }
                Step::Push(frame) => frames.push(frame),
                Step::Value(value) => match frames.last_mut() {
                    Some(top) => top.done.push(value),
                    None => return Ok(value),
                },
            }

            // the innermost frame starts its next sub-form or is complete
            let top = frames.len() - 1;
            step = match frames[top].pending.next() {
                Some(form) => Step::Eval(form),
                None => {
                    let frame = frames.remove(top);
                    self.finish(frame)?
                }
            };
        }
    }

    /// Start evaluating `form` below `depth` open frames.
    fn begin(&mut self, form: Value, depth: usize) -> Result<Step> {
        if depth >= self.max_depth {
            return Err(ResourceError::StackOverflow.into());
        }
        match form {
            Value::Nil | Value::Bool(_) | Value::Keyword(_) => Ok(Step::Value(form)),
            Value::Symbol(sym) => self.resolve(sym).map(Step::Value),
            Value::Obj(_) => match self.heap.kind(form) {
                Kind::List => self.begin_list(form),
                Kind::Vector => {
                    let items = self
                        .heap
                        .vector_items(form)
                        .map(|items| items.iter().copied().collect())
                        .unwrap_or_default();
                    Ok(Step::Push(Frame::new(Task::Vector, items)))
                }
                Kind::Map => {
                    let flat = self
                        .heap
                        .map_entries(form)
                        .map(|entries| entries.iter().flat_map(|(k, v)| [*k, *v]).collect())
                        .unwrap_or_default();
                    Ok(Step::Push(Frame::new(Task::Map, flat)))
                }
                _ => Ok(Step::Value(self.heap.retain(form))),
            },
        }
    }

    fn resolve(&mut self, sym: Symbol) -> Result<Value> {
        match self.env.lookup(sym) {
            Some(v) => Ok(self.heap.retain(v)),
            None => Err(Error::undefined(self.symbol_name(sym))),
        }
    }

    fn symbol_name(&self, sym: Symbol) -> String {
        self.symbols.resolve(sym).unwrap_or_default()
    }

    fn begin_list(&mut self, form: Value) -> Result<Step> {
        let items = self.heap.list_items(form).unwrap_or_default();
        let Some((&head, args)) = items.split_first() else {
            // () evaluates to itself
            return Ok(Step::Value(self.heap.retain(form)));
        };

        let Value::Symbol(sym) = head else {
            return Err(Error::type_error("symbol", self.heap.type_name(head)));
        };

        let name = match (self.symbols.namespace(sym), self.symbols.name(sym)) {
            (None, Some(name)) => name.to_owned(),
            _ => return Err(Error::undefined(self.symbol_name(sym))),
        };

        match name.as_str() {
            "quote" => self.eval_quote(args).map(Step::Value),
            "def" => self.begin_def(args),
            "if" => Self::begin_if(args),
            _ => {
                if let Some(f) = lookup_builtin(&name) {
                    Ok(Step::Push(Frame::new(Task::Call(f), args.to_vec())))
                } else if self.env.contains(sym) {
                    // bound, but there are no callable values
                    let got = self.env.lookup(sym).map_or("nil", |v| self.heap.type_name(v));
                    Err(Error::type_error("function", got))
                } else {
                    Err(Error::undefined(self.symbol_name(sym)))
                }
            }
        }
    }

    /// Build the result of a frame whose sub-forms are all evaluated.
    ///
    /// Consumes the frame's results, on failure too.
    fn finish(&mut self, frame: Frame) -> Result<Step> {
        let Frame { task, done, .. } = frame;
        match task {
            Task::Vector => Ok(Step::Value(self.heap.make_vector(done)?)),
            Task::Map => {
                let mut results = done.into_iter();
                let mut pairs = Vec::with_capacity(results.len() / 2);
                while let (Some(k), Some(v)) = (results.next(), results.next()) {
                    pairs.push((k, v));
                }
                Ok(Step::Value(self.heap.make_map(pairs)?))
            }
            Task::Call(f) => {
                let result = f.call(self.heap, self.symbols, &done);
                for v in done {
                    self.heap.release(v);
                }
                result.map(Step::Value)
            }
            Task::Def(sym) => {
                let value = only(done);
                let bound = self.heap.retain(value);
                self.env.define(self.heap, sym, bound);
                Ok(Step::Value(value))
            }
            Task::If { then, otherwise } => {
                let test = only(done);
                let branch = if test.is_truthy() { then } else { otherwise };
                self.heap.release(test);
                Ok(Step::Eval(branch))
            }
        }
    }

    // ========================================================================
    // Special forms
    // ========================================================================

    /// (quote x)
    fn eval_quote(&mut self, args: &[Value]) -> Result<Value> {
        match args {
            [x] => Ok(self.heap.retain(*x)),
            _ => Err(Error::arity(args.len())),
        }
    }

    /// (def name expr) - bind a global, returning the value
    fn begin_def(&mut self, args: &[Value]) -> Result<Step> {
        let [target, expr] = args else {
            return Err(Error::arity(args.len()));
        };
        let Value::Symbol(sym) = *target else {
            return Err(Error::type_error("symbol", self.heap.type_name(*target)));
        };
        Ok(Step::Push(Frame::new(Task::Def(sym), vec![*expr])))
    }

    /// (if test then else?) - nil and false are falsy; a missing else is nil
    fn begin_if(args: &[Value]) -> Result<Step> {
        let (test, then, otherwise) = match args {
            [test, then] => (*test, *then, Value::Nil),
            [test, then, otherwise] => (*test, *then, *otherwise),
            _ => return Err(Error::arity(args.len())),
        };
        Ok(Step::Push(Frame::new(Task::If { then, otherwise }, vec![test])))
    }
}

/// The single result of a frame with one sub-form.
fn only(done: Vec<Value>) -> Value {
    done.into_iter().next().unwrap_or(Value::Nil)
}

/// Evaluate `form` with the default depth limit (convenience function).
pub fn eval(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    env: &mut Env,
    form: Value,
) -> Result<Value> {
    Evaluator::new(heap, symbols, env).eval(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyclj_parser::read_str;

    struct Ctx {
        heap: Heap,
        symbols: SymbolTable,
        env: Env,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                heap: Heap::new(),
                symbols: SymbolTable::new(),
                env: Env::new(),
            }
        }

        fn eval(&mut self, src: &str) -> Result<Value> {
            let form = read_str(src, &mut self.heap, &mut self.symbols)?.unwrap_or(Value::Nil);
            let result = eval(&mut self.heap, &mut self.symbols, &mut self.env, form);
            self.heap.release(form);
            result
        }

        fn eval_int(&mut self, src: &str) -> Option<i32> {
            let v = self.eval(src).ok()?;
            let n = self.heap.as_int(v);
            self.heap.release(v);
            n
        }
    }

    #[test]
    fn test_self_evaluating() {
        let mut ctx = Ctx::new();
        assert_eq!(ctx.eval("nil").unwrap(), Value::Nil);
        assert_eq!(ctx.eval("true").unwrap(), Value::Bool(true));
        assert_eq!(ctx.eval_int("7"), Some(7));
        let kw = ctx.eval(":k").unwrap();
        assert_eq!(kw, Value::Keyword(ctx.symbols.intern("k")));
    }

    #[test]
    fn test_arithmetic_calls() {
        let mut ctx = Ctx::new();
        assert_eq!(ctx.eval_int("(+ 1 2 3)"), Some(6));
        assert_eq!(ctx.eval_int("(- 10 (* 2 3))"), Some(4));
        assert_eq!(ctx.eval_int("(quot 7 2)"), Some(3));
        assert_eq!(ctx.eval_int("(rem 7 2)"), Some(1));
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_def_and_lookup() {
        let mut ctx = Ctx::new();
        assert_eq!(ctx.eval_int("(def x 40)"), Some(40));
        assert_eq!(ctx.eval_int("(+ x 2)"), Some(42));
        let err = ctx.eval("(x 1)").unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch");
    }

    #[test]
    fn test_undefined_symbol() {
        let mut ctx = Ctx::new();
        let err = ctx.eval("undefined-thing").unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable");
        let err = ctx.eval("(nope 1 2)").unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable");
    }

    #[test]
    fn test_non_symbol_head() {
        let mut ctx = Ctx::new();
        let err = ctx.eval("(1 2)").unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch");
    }

    #[test]
    fn test_quote_returns_form() {
        let mut ctx = Ctx::new();
        let v = ctx.eval("'(a b)").unwrap();
        assert_eq!(ctx.heap.count(v), Some(2));
        ctx.heap.release(v);
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_failed_call_releases_arguments() {
        let mut ctx = Ctx::new();
        let err = ctx.eval("(+ 1 [2 3] \"x\")").unwrap_err();
        assert_eq!(err.to_string(), "Expected number");
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = Ctx::new();
        let form = read_str("(+ 1 (+ 1 (+ 1 1)))", &mut ctx.heap, &mut ctx.symbols)
            .unwrap()
            .unwrap();
        let err = Evaluator::new(&mut ctx.heap, &mut ctx.symbols, &mut ctx.env)
            .with_max_depth(3)
            .eval(form)
            .unwrap_err();
        assert_eq!(err.to_string(), "Stack overflow");
        ctx.heap.release(form);
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_if_picks_branch() {
        let mut ctx = Ctx::new();
        assert_eq!(ctx.eval_int("(if true 1 2)"), Some(1));
        assert_eq!(ctx.eval_int("(if nil 1 2)"), Some(2));
        assert_eq!(ctx.eval_int("(if false 1 2)"), Some(2));
        assert_eq!(ctx.eval_int("(if 0 1 2)"), Some(1));
        assert_eq!(ctx.eval("(if false 1)").unwrap(), Value::Nil);
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_if_evaluates_only_taken_branch() {
        let mut ctx = Ctx::new();
        assert_eq!(ctx.eval_int("(if true 1 (/ 1 0))"), Some(1));
        assert_eq!(ctx.eval_int("(if [] (+ 1 1) undefined)"), Some(2));
        let err = ctx.eval("(if)").unwrap_err();
        assert_eq!(err.to_string(), "Wrong number of args: 0");
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_deep_nesting_does_not_use_call_stack() {
        let mut ctx = Ctx::new();
        let mut form = ctx.heap.make_vector(vec![]).unwrap();
        for _ in 0..100_000 {
            form = ctx.heap.make_vector(vec![form]).unwrap();
        }
        let result = Evaluator::new(&mut ctx.heap, &mut ctx.symbols, &mut ctx.env)
            .with_max_depth(200_000)
            .eval(form)
            .unwrap();
        assert!(ctx.heap.equal(form, result));
        ctx.heap.release(result);
        ctx.heap.release(form);
        assert_eq!(ctx.heap.live_objects(), 0);
    }

    #[test]
    fn test_error_releases_partial_results() {
        let mut ctx = Ctx::new();
        let err = ctx.eval("[1 [2 {:a 3 :b (+ 4 :x)}] 5]").unwrap_err();
        assert_eq!(err.to_string(), "Expected number");
        assert_eq!(ctx.heap.live_objects(), 0);
    }
}
