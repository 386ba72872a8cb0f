/// A byte range in source text, plus the line and column it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Token classification for HTML templates.
///
/// Data-carrying variants hold the decoded pieces of the construct.
/// The exact source text is always recoverable through the token span.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A run of literal text (including whitespace).
    Text(String),

    /// `<name key="value" ...>` or `<name ... />`.
    /// Attributes keep document order; a bare attribute has an empty value.
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },

    /// `</name>`
    EndTag { name: String },

    /// `<!-- ... -->`, carrying the text between the markers.
    Comment(String),

    /// `<!DOCTYPE ...>` and other `<!...>` / `<?...>` declarations.
    Doctype(String),

    // End of input
    Eof,
}

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The exact source text this token was scanned from.
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// HTML5 void elements (self-closing, no children).
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Check if a tag name is an HTML5 void element (ASCII case-insensitive).
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Check if a tag name is a raw-text element (ASCII case-insensitive).
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}
