// tinyclj-parser - Lexer for Tiny-CLJ
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for Tiny-CLJ source code.
//!
//! Converts a source string into a stream of tokens.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::value::Int;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }

    Quote, // '

    // Literals
    Nil,
    True,
    False,
    Int(Int),
    String(String),
    Symbol(String),
    Keyword(String),

    // Special
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Quote => write!(f, "'"),
            Token::Nil => write!(f, "nil"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Int(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "{:?}", s),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::Keyword(s) => write!(f, ":{}", s),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Lexer error with position information.
///
/// The message is diagnostic detail only; the reader reports every lexer
/// error as invalid syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexerError {}

/// The lexer converts source code into tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    /// Position of the first character of the last token
    token_line: usize,
    token_column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments();
        self.token_line = self.line;
        self.token_column = self.column;

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' | ')' | '[' | ']' | '{' | '}' | '\'' => {
                self.advance();
                Ok(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    _ => Token::Quote,
                })
            }

            '"' => self.read_string(),

            ':' => self.read_keyword(),

            // Number or symbol starting with - or +
            '-' | '+' => self.read_number_or_symbol(),

            '0'..='9' => self.read_number(),

            _ if is_symbol_start(c) => self.read_symbol(),

            _ => Err(self.error(format!("Unexpected character: '{}'", c))),
        }
    }

    /// Collect all tokens into a vector.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Line and column where the most recent token started.
    pub fn token_position(&self) -> (usize, usize) {
        (self.token_line, self.token_column)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' => {
                    self.advance();
                }
                Some(';') => {
                    // Skip to end of line
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume opening "
        let mut s = String::new();

        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some(c) => return Err(self.error(format!("Unknown escape sequence: \\{}", c))),
                    None => return Err(self.error("Unterminated string escape".to_string())),
                },
                Some(c) => s.push(c),
                None => return Err(self.error("Unterminated string".to_string())),
            }
        }

        Ok(Token::String(s))
    }

    fn read_keyword(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume :

        let name = self.collect_symbol_chars(String::new());
        if name.is_empty() {
            return Err(self.error("Expected keyword name after :".to_string()));
        }

        Ok(Token::Keyword(name))
    }

    fn read_symbol(&mut self) -> Result<Token, LexerError> {
        let name = self.collect_symbol_chars(String::new());

        // Check for reserved words
        match name.as_str() {
            "nil" => Ok(Token::Nil),
            "true" => Ok(Token::True),
            "false" => Ok(Token::False),
            _ => Ok(Token::Symbol(name)),
        }
    }

    fn collect_symbol_chars(&mut self, mut name: String) -> String {
        while let Some(c) = self.peek() {
            if is_symbol_char(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn read_number_or_symbol(&mut self) -> Result<Token, LexerError> {
        let Some(sign) = self.advance() else {
            return Ok(Token::Eof);
        };

        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let mut s = String::new();
                s.push(sign);
                self.collect_number_chars(&mut s);
                self.parse_int(&s)
            }
            // A symbol like +foo or ->>, or just + or -
            _ => Ok(Token::Symbol(self.collect_symbol_chars(sign.to_string()))),
        }
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let mut s = String::new();
        self.collect_number_chars(&mut s);
        self.parse_int(&s)
    }

    // Anything that could continue a numeric literal is swallowed so that
    // "1.5" or "12abc" fail as a whole instead of splitting into two tokens.
    fn collect_number_chars(&mut self, s: &mut String) {
        while let Some(c) = self.peek() {
            if is_symbol_char(c) {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn parse_int(&self, s: &str) -> Result<Token, LexerError> {
        if !s
            .trim_start_matches(['-', '+'])
            .chars()
            .all(|c| c.is_ascii_digit())
        {
            return Err(self.error(format!("Invalid number: {}", s)));
        }
        s.parse::<Int>()
            .map(Token::Int)
            .map_err(|_| self.error(format!("Integer out of range: {}", s)))
    }
}

/// Check if a character can start a symbol.
fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(
            c,
            '!' | '$' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | '<' | '=' | '>' | '?' | '_'
        )
}

/// Check if a character can appear in a symbol.
fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == '\'' || c == '#' || c == ':'
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(s: &str) -> Result<Vec<Token>, LexerError> {
        Lexer::new(s).tokenize()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            tokenize("()[]{}").unwrap(),
            vec![
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::LBrace,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(
            tokenize("'x").unwrap(),
            vec![Token::Quote, Token::Symbol("x".to_string())]
        );
    }

    #[test]
    fn test_nil_and_booleans() {
        assert_eq!(
            tokenize("nil true false").unwrap(),
            vec![Token::Nil, Token::True, Token::False,]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(
            tokenize("0 1 42 -1 +5").unwrap(),
            vec![
                Token::Int(0),
                Token::Int(1),
                Token::Int(42),
                Token::Int(-1),
                Token::Int(5),
            ]
        );
    }

    #[test]
    fn test_integer_limits() {
        assert_eq!(
            tokenize("2147483647 -2147483648").unwrap(),
            vec![Token::Int(i32::MAX), Token::Int(i32::MIN)]
        );
        assert!(tokenize("2147483648").is_err());
        assert!(tokenize("-2147483649").is_err());
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(tokenize("1.5").is_err());
        assert!(tokenize("12abc").is_err());
        assert!(tokenize("0x10").is_err());
        assert!(tokenize("1/2").is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize(r#""hello" "a\nb" "q\"t" "back\\slash""#).unwrap(),
            vec![
                Token::String("hello".to_string()),
                Token::String("a\nb".to_string()),
                Token::String("q\"t".to_string()),
                Token::String("back\\slash".to_string()),
            ]
        );
    }

    #[test]
    fn test_bad_strings() {
        assert!(tokenize(r#""unterminated"#).is_err());
        assert!(tokenize(r#""bad \q escape""#).is_err());
        assert!(tokenize(r#""trailing \"#).is_err());
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            tokenize("foo + - ->> ns/name foo? x'").unwrap(),
            vec![
                Token::Symbol("foo".to_string()),
                Token::Symbol("+".to_string()),
                Token::Symbol("-".to_string()),
                Token::Symbol("->>".to_string()),
                Token::Symbol("ns/name".to_string()),
                Token::Symbol("foo?".to_string()),
                Token::Symbol("x'".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize(":a :ns/b").unwrap(),
            vec![
                Token::Keyword("a".to_string()),
                Token::Keyword("ns/b".to_string()),
            ]
        );
        assert!(tokenize(":").is_err());
    }

    #[test]
    fn test_whitespace_commas_comments() {
        assert_eq!(
            tokenize("1, 2 ; the rest\n 3").unwrap(),
            vec![Token::Int(1), Token::Int(2), Token::Int(3)]
        );
    }

    #[test]
    fn test_illegal_characters() {
        for src in ["@x", "`x", "~x", "#{}", "\\a", "^m"] {
            assert!(tokenize(src).is_err(), "expected error for {src}");
        }
    }

    #[test]
    fn test_token_position() {
        let mut lexer = Lexer::new("a\n  (b");
        assert_eq!(lexer.next_token().unwrap(), Token::Symbol("a".to_string()));
        assert_eq!(lexer.token_position(), (1, 1));
        assert_eq!(lexer.next_token().unwrap(), Token::LParen);
        assert_eq!(lexer.token_position(), (2, 3));
    }
}
