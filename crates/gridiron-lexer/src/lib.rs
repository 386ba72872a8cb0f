//! GridIron Lexer
//!
//! Tokenizes HTML templates into a flat stream of tokens.
//! Every token records the byte range it was scanned from, so the
//! template can be rebuilt exactly from the token spans. Scanning never
//! fails; markup left open at end of input comes back as text, along with
//! a [`LexerError`] describing it.
//! Tag names may carry a `NAMESPACE::Type` qualifier for framework tags.
//!
//! # Example
//!
//! ```
//! use gridiron_lexer::{Scanner, TokenKind};
//!
//! let (tokens, errors) = Scanner::tokenize("<p>hi</p>");
//! assert!(errors.is_empty());
//! assert_eq!(tokens.len(), 4); // StartTag, Text, EndTag, EOF
//! assert_eq!(tokens[3].kind, TokenKind::Eof);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{is_raw_text_element, is_void_element, Span, Token, TokenKind};

/// Markup the scanner recovered from, with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    /// Byte offset of the construct in the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl LexerError {
    pub fn new(message: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }
}
