//! Tree builder for HTML templates.
//!
//! Consumes the flat token stream from `gridiron-lexer` and nests it into a
//! `Tree`. Nesting is forgiving the way template authors expect:
//! an end tag closes the nearest open element of the same name, implicitly
//! closing anything opened inside it, and an end tag that matches nothing
//! is kept as literal text.

use crate::node::Node;
use crate::tree::{NodeId, Tree};
use crate::ParseError;
use gridiron_lexer::{is_void_element, Token, TokenKind};

/// Template tree builder.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    tree: Tree,
    open: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for tokens scanned from `source`.
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            tree: Tree::new(source.len()),
            open: Vec::new(),
        }
    }

    /// Parse a template buffer into a tree.
    ///
    /// Also returns the malformed constructs the tree had to keep as text.
    pub fn parse(source: &str) -> (Tree, Vec<ParseError>) {
        let (tokens, errors) = gridiron_lexer::Scanner::tokenize(source);
        let tree = Parser::new(source, tokens).build();
        (tree, errors.into_iter().map(ParseError::from).collect())
    }

    /// Nest every token into the tree.
    fn build(mut self) -> Tree {
        let tokens = std::mem::take(&mut self.tokens);

        for token in tokens {
            let raw = token.raw(self.source);
            let offset = token.span.start;

            match token.kind {
                TokenKind::Text(_) => {
                    self.append(Node::text_run(raw, offset));
                }
                TokenKind::Comment(_) => {
                    self.append(Node::comment(raw, offset));
                }
                TokenKind::Doctype(_) => {
                    self.append(Node::doctype(raw, offset));
                }
                TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let leaf = self_closing || is_void_element(&name);
                    let id = self.append(Node::element(name, attributes, raw, offset));
                    if !leaf {
                        self.open.push(id);
                    }
                }
                TokenKind::EndTag { name } => {
                    self.close_element(&name, raw, token.span.start, token.span.end);
                }
                TokenKind::Eof => break,
            }
        }

        // Anything still open runs to the end of the buffer.
        let end = self.source.len();
        while let Some(id) = self.open.pop() {
            if let Some(node) = self.tree.get_mut(id) {
                node.close("", end);
            }
        }

        self.tree
    }

    /// Close the nearest open element named `name`.
    fn close_element(&mut self, name: &str, raw: &str, start: usize, end: usize) {
        let matching = self.open.iter().rposition(|&id| {
            self.tree
                .get(id)
                .is_some_and(|n| n.tag_name().eq_ignore_ascii_case(name))
        });

        let Some(index) = matching else {
            // Stray end tag: keep it verbatim so the round trip stays lossless.
            self.append(Node::text_run(raw, start));
            return;
        };

        // Elements opened inside the matched one end where this end tag begins.
        for &inner in &self.open[index + 1..] {
            if let Some(node) = self.tree.get_mut(inner) {
                node.close("", start);
            }
        }

        let id = self.open[index];
        if let Some(node) = self.tree.get_mut(id) {
            node.close(raw, end);
        }
        self.open.truncate(index);
    }

    fn append(&mut self, node: Node) -> NodeId {
        let parent = self.open.last().copied().unwrap_or(NodeId::ROOT);
        self.tree.append(parent, node)
    }
}
