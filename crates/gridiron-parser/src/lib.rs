//! GridIron Parser
//!
//! Builds an arena-backed tree of nodes from the lexer's token stream.
//! The tree keeps every byte of the template: element nodes carry their
//! raw opening and closing tag text, and text, comment and declaration
//! nodes carry their literal source, so re-serializing an unmodified tree
//! reproduces the input exactly. Malformed markup never stops a parse:
//! it is kept as text and reported alongside the tree.

pub mod node;
pub mod parser;
pub mod tree;

pub use node::{Node, NodeKind};
pub use parser::Parser;
pub use tree::{NodeId, Traverse, Tree};

/// Malformed markup kept in the tree as text, with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset of the node the markup ended up in.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl From<gridiron_lexer::LexerError> for ParseError {
    fn from(e: gridiron_lexer::LexerError) -> Self {
        ParseError {
            message: e.message,
            offset: e.offset,
            line: e.line,
            column: e.column,
        }
    }
}
