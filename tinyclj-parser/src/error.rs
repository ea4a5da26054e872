// tinyclj-parser - Error kinds shared by the heap and the reader
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error kinds raised below the evaluator.
//!
//! Each kind renders exactly one catalog string from [`crate::messages`].
//! Positions and names travel alongside the kind but never change the text.

use std::fmt;

use thiserror::Error;

use crate::messages::*;

/// The kind of collection whose closing delimiter was never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    List,
    Vector,
    Map,
}

impl Delimiter {
    fn eof_message(self) -> &'static str {
        match self {
            Delimiter::List => ERROR_EOF_LIST,
            Delimiter::Vector => ERROR_EOF_VECTOR,
            Delimiter::Map => ERROR_EOF_MAP,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::List => write!(f, "list"),
            Delimiter::Vector => write!(f, "vector"),
            Delimiter::Map => write!(f, "map"),
        }
    }
}

/// Malformed source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("{}", ERROR_INVALID_SYNTAX)]
    InvalidSyntax,
    #[error("{}", ERROR_UNMATCHED_DELIMITER)]
    UnmatchedDelimiter,
    #[error("{}", .0.eof_message())]
    UnexpectedEof(Delimiter),
}

/// A resource limit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{}", ERROR_MEMORY_ALLOCATION)]
    MemoryAllocation,
    #[error("{}", ERROR_STACK_OVERFLOW)]
    StackOverflow,
}

/// A well-formed operation applied to the wrong thing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{}", ERROR_UNDEFINED_VARIABLE)]
    UndefinedVariable { name: String },
    #[error("{}", ERROR_TYPE_MISMATCH)]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    #[error("{}", ERR_EXPECTED_NUMBER)]
    ExpectedNumber { got: &'static str },
    #[error("Wrong number of args: {got}")]
    WrongArity { got: usize },
}

impl SemanticError {
    pub fn type_mismatch(expected: &'static str, got: &'static str) -> Self {
        SemanticError::TypeMismatch { expected, got }
    }
}

/// Failure of a heap operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// What went wrong while reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadErrorKind {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Reader failure with the position where it was detected.
///
/// `Display` shows only the catalog message; the position is available
/// through the public fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub line: usize,
    pub column: usize,
}

impl ReadError {
    pub fn new(kind: impl Into<ReadErrorKind>, line: usize, column: usize) -> Self {
        ReadError {
            kind: kind.into(),
            line,
            column,
        }
    }

    /// The syntax error, if this is one.
    pub fn syntax(&self) -> Option<SyntaxError> {
        match &self.kind {
            ReadErrorKind::Syntax(e) => Some(*e),
            ReadErrorKind::Resource(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_messages() {
        assert_eq!(SyntaxError::InvalidSyntax.to_string(), "Invalid syntax");
        assert_eq!(
            SyntaxError::UnmatchedDelimiter.to_string(),
            "Unmatched delimiter"
        );
        assert_eq!(
            SyntaxError::UnexpectedEof(Delimiter::List).to_string(),
            "EOF while reading list"
        );
        assert_eq!(
            SyntaxError::UnexpectedEof(Delimiter::Vector).to_string(),
            "EOF while reading vector"
        );
        assert_eq!(
            SyntaxError::UnexpectedEof(Delimiter::Map).to_string(),
            "EOF while reading map"
        );
    }

    #[test]
    fn test_semantic_messages_ignore_context() {
        let err = SemanticError::UndefinedVariable {
            name: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "Undefined variable");
        assert_eq!(
            SemanticError::type_mismatch("list", "int").to_string(),
            "Type mismatch"
        );
        assert_eq!(
            SemanticError::WrongArity { got: 0 }.to_string(),
            ERR_WRONG_ARITY_ZERO
        );
    }

    #[test]
    fn test_read_error_display_is_message_only() {
        let err = ReadError::new(SyntaxError::UnmatchedDelimiter, 3, 7);
        assert_eq!(err.to_string(), "Unmatched delimiter");
        assert_eq!((err.line, err.column), (3, 7));
        assert_eq!(err.syntax(), Some(SyntaxError::UnmatchedDelimiter));

        let err = ReadError::new(ResourceError::StackOverflow, 1, 1);
        assert_eq!(err.to_string(), "Stack overflow");
        assert_eq!(err.syntax(), None);
    }
}
