// tinyclj-parser - Values, reader and printer for Tiny-CLJ
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # tinyclj-parser
//!
//! Object model, symbol table, reader and printer for Tiny-CLJ.
//! Produces reference-counted heap values from source code strings.

pub mod error;
pub mod lexer;
pub mod messages;
pub mod pool;
pub mod printer;
pub mod reader;
pub mod symbol;
pub mod value;

pub use error::{
    Delimiter, HeapError, ReadError, ReadErrorKind, ResourceError, SemanticError, SyntaxError,
};
pub use im::Vector;
pub use lexer::Lexer;
pub use pool::{PoolId, PoolScope};
pub use printer::pr_str;
pub use reader::{Reader, ReaderConfig, ReaderState, read_all_str, read_str};
pub use symbol::{Symbol, SymbolTable};
pub use value::{Heap, HeapConfig, Int, Kind, ListIter, ObjRef, Object, Value};
