// tinyclj-parser - Reader for Tiny-CLJ
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Reader for Tiny-CLJ source code.
//!
//! Converts tokens into heap values. Nesting is tracked on an explicit stack
//! of frames rather than the call stack, so the depth limit is a plain
//! configuration value and a failure can release everything built so far.
//!
//! Every value returned by the reader is owned by the caller.

use crate::error::{Delimiter, HeapError, ReadError, ReadErrorKind, ResourceError, SyntaxError};
use crate::lexer::{Lexer, Token};
use crate::symbol::SymbolTable;
use crate::value::{Heap, Value};

/// Default nesting limit for collections and quotes.
pub const DEFAULT_MAX_READ_DEPTH: usize = 1024;

/// Reader limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum number of simultaneously open collections and quotes.
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            max_depth: DEFAULT_MAX_READ_DEPTH,
        }
    }
}

/// What a frame on the nesting stack is collecting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Collection(Delimiter),
    /// Waiting for the single form after `'`
    Quote,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    items: Vec<Value>,
}

/// Where the reader is in its input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReaderState {
    /// Between tokens
    Scanning,
    /// Building a value from an atom token
    InAtom,
    /// Input exhausted
    Done,
    /// A read failed; every later read reports the same error
    Failed(ReadError),
}

/// The reader turns source text into heap values, one form per call.
pub struct Reader<'a, 'h> {
    lexer: Lexer<'a>,
    heap: &'h mut Heap,
    symbols: &'h mut SymbolTable,
    config: ReaderConfig,
    stack: Vec<Frame>,
    state: ReaderState,
}

impl<'a, 'h> Reader<'a, 'h> {
    /// Create a new reader for the given source code.
    pub fn new(source: &'a str, heap: &'h mut Heap, symbols: &'h mut SymbolTable) -> Self {
        Self::with_config(source, heap, symbols, ReaderConfig::default())
    }

    pub fn with_config(
        source: &'a str,
        heap: &'h mut Heap,
        symbols: &'h mut SymbolTable,
        config: ReaderConfig,
    ) -> Self {
        Reader {
            lexer: Lexer::new(source),
            heap,
            symbols,
            config,
            stack: Vec::new(),
            state: ReaderState::Scanning,
        }
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    /// Read a single form from the source.
    /// Returns None if at end of input.
    pub fn read(&mut self) -> Result<Option<Value>, ReadError> {
        match &self.state {
            ReaderState::Done => return Ok(None),
            ReaderState::Failed(e) => return Err(e.clone()),
            ReaderState::Scanning | ReaderState::InAtom => {}
        }

        loop {
            self.state = ReaderState::Scanning;
            let token = match self.lexer.next_token() {
                Ok(token) => token,
                Err(e) => {
                    log::debug!("{}", e);
                    return Err(self.fail_at(SyntaxError::InvalidSyntax, e.line, e.column));
                }
            };

            let value = match token {
                Token::LParen => {
                    self.open(FrameKind::Collection(Delimiter::List))?;
                    continue;
                }
                Token::LBracket => {
                    self.open(FrameKind::Collection(Delimiter::Vector))?;
                    continue;
                }
                Token::LBrace => {
                    self.open(FrameKind::Collection(Delimiter::Map))?;
                    continue;
                }
                Token::Quote => {
                    self.open(FrameKind::Quote)?;
                    continue;
                }
                Token::RParen => self.close(Delimiter::List)?,
                Token::RBracket => self.close(Delimiter::Vector)?,
                Token::RBrace => self.close(Delimiter::Map)?,
                Token::Eof => return self.end_of_input(),
                atom => {
                    self.state = ReaderState::InAtom;
                    self.atom(atom)?
                }
            };

            if let Some(form) = self.deliver(value)? {
                self.state = ReaderState::Scanning;
                return Ok(Some(form));
            }
        }
    }

    /// Read all forms from the source.
    ///
    /// On failure the forms already read are released.
    pub fn read_all(&mut self) -> Result<Vec<Value>, ReadError> {
        let mut forms = Vec::new();
        loop {
            match self.read() {
                Ok(Some(form)) => forms.push(form),
                Ok(None) => return Ok(forms),
                Err(e) => {
                    for form in forms {
                        self.heap.release(form);
                    }
                    return Err(e);
                }
            }
        }
    }

    // ========================================================================
    // Internal reading methods
    // ========================================================================

    fn fail_at(&mut self, kind: impl Into<ReadErrorKind>, line: usize, column: usize) -> ReadError {
        for frame in self.stack.drain(..) {
            for item in frame.items {
                self.heap.release(item);
            }
        }
        let err = ReadError::new(kind, line, column);
        self.state = ReaderState::Failed(err.clone());
        err
    }

    fn fail(&mut self, kind: impl Into<ReadErrorKind>) -> ReadError {
        let (line, column) = self.lexer.token_position();
        self.fail_at(kind, line, column)
    }

    fn heap_failure(&mut self, e: HeapError) -> ReadError {
        match e {
            HeapError::Resource(r) => self.fail(r),
            HeapError::Semantic(_) => self.fail(SyntaxError::InvalidSyntax),
        }
    }

    fn open(&mut self, kind: FrameKind) -> Result<(), ReadError> {
        if self.stack.len() >= self.config.max_depth {
            return Err(self.fail(ResourceError::StackOverflow));
        }
        self.stack.push(Frame {
            kind,
            items: Vec::new(),
        });
        Ok(())
    }

    fn close(&mut self, delimiter: Delimiter) -> Result<Value, ReadError> {
        match self.stack.last().map(|f| f.kind) {
            Some(FrameKind::Collection(open)) if open == delimiter => {}
            // `'` directly followed by a closer
            Some(FrameKind::Quote) => return Err(self.fail(SyntaxError::InvalidSyntax)),
            _ => return Err(self.fail(SyntaxError::UnmatchedDelimiter)),
        }
        let Some(frame) = self.stack.pop() else {
            return Err(self.fail(SyntaxError::UnmatchedDelimiter));
        };

        let built = match delimiter {
            Delimiter::List => self.heap.make_list(frame.items),
            Delimiter::Vector => self.heap.make_vector(frame.items),
            Delimiter::Map => {
                if frame.items.len() % 2 != 0 {
                    for item in frame.items {
                        self.heap.release(item);
                    }
                    return Err(self.fail(SyntaxError::InvalidSyntax));
                }
                let mut items = frame.items.into_iter();
                let mut pairs = Vec::with_capacity(items.len() / 2);
                while let (Some(k), Some(v)) = (items.next(), items.next()) {
                    pairs.push((k, v));
                }
                self.heap.make_map(pairs)
            }
        };
        built.map_err(|e| self.heap_failure(e))
    }

    fn end_of_input(&mut self) -> Result<Option<Value>, ReadError> {
        let innermost = self.stack.iter().rev().find_map(|f| match f.kind {
            FrameKind::Collection(d) => Some(d),
            FrameKind::Quote => None,
        });
        match innermost {
            Some(d) => Err(self.fail(SyntaxError::UnexpectedEof(d))),
            // only quotes are open: `'` at end of input
            None if !self.stack.is_empty() => Err(self.fail(SyntaxError::InvalidSyntax)),
            None => {
                self.state = ReaderState::Done;
                Ok(None)
            }
        }
    }

    fn atom(&mut self, token: Token) -> Result<Value, ReadError> {
        let built = match token {
            Token::Nil => Ok(Value::Nil),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Int(n) => self.heap.make_int(n),
            Token::String(s) => self.heap.make_string(&s),
            Token::Symbol(s) => Ok(Value::Symbol(self.symbols.parse(&s))),
            Token::Keyword(s) => Ok(Value::Keyword(self.symbols.parse(&s))),
            _ => return Err(self.fail(SyntaxError::InvalidSyntax)),
        };
        built.map_err(|e| self.heap_failure(e))
    }

    /// Hand a finished value to the innermost frame. Returns the value if it
    /// completes a top-level form.
    fn deliver(&mut self, value: Value) -> Result<Option<Value>, ReadError> {
        let mut value = value;
        while let Some(FrameKind::Quote) = self.stack.last().map(|f| f.kind) {
            self.stack.pop();
            let quote = Value::Symbol(self.symbols.intern("quote"));
            value = self
                .heap
                .make_list(vec![quote, value])
                .map_err(|e| self.heap_failure(e))?;
        }
        match self.stack.last_mut() {
            Some(frame) => {
                frame.items.push(value);
                Ok(None)
            }
            None => Ok(Some(value)),
        }
    }
}

/// Read the first form of `source` (convenience function).
pub fn read_str(
    source: &str,
    heap: &mut Heap,
    symbols: &mut SymbolTable,
) -> Result<Option<Value>, ReadError> {
    Reader::new(source, heap, symbols).read()
}

/// Read every form of `source` (convenience function).
pub fn read_all_str(
    source: &str,
    heap: &mut Heap,
    symbols: &mut SymbolTable,
) -> Result<Vec<Value>, ReadError> {
    Reader::new(source, heap, symbols).read_all()
}

// ============================================================================
// Tests
// ============================================================================
