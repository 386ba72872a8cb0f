//! Parsed template nodes.
//!
//! A node is one element, text run, comment or declaration from the
//! template. Element nodes keep their ordered attributes; lookups are a
//! linear scan with ASCII case-insensitive key matching, which is cheap
//! for the handful of attributes a tag carries.

/// What a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic root spanning the whole template.
    Document,
    /// A start tag and everything up to its end tag.
    Element,
    /// Literal text, including stray end tags that closed nothing.
    Text,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>` and similar declarations.
    Doctype,
}

/// One node of the template tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    tag_name: String,
    attributes: Vec<(String, String)>,
    text: String,
    closing_text: String,
    offset: usize,
    length: usize,
}

impl Node {
    /// The document root covering `length` bytes of source.
    pub fn document(length: usize) -> Self {
        Self::literal(NodeKind::Document, String::new(), 0, length)
    }

    /// An element whose opening tag `text` starts at `offset`.
    /// Its length grows to cover the closing tag once the element is closed.
    ///
    /// A key repeated under a different case is dropped; the first one wins.
    pub fn element(
        tag_name: impl Into<String>,
        attributes: Vec<(String, String)>,
        text: impl Into<String>,
        offset: usize,
    ) -> Self {
        let text = text.into();
        let length = text.len();
        let mut unique: Vec<(String, String)> = Vec::with_capacity(attributes.len());
        for (key, value) in attributes {
            if !unique.iter().any(|(k, _)| k.eq_ignore_ascii_case(&key)) {
                unique.push((key, value));
            }
        }
        let attributes = unique;
        Self {
            kind: NodeKind::Element,
            tag_name: tag_name.into(),
            attributes,
            text,
            closing_text: String::new(),
            offset,
            length,
        }
    }

    /// A literal text run.
    pub fn text_run(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let length = text.len();
        Self::literal(NodeKind::Text, text, offset, length)
    }

    /// A comment, `raw` including the `<!--` / `-->` markers.
    pub fn comment(raw: impl Into<String>, offset: usize) -> Self {
        let raw = raw.into();
        let length = raw.len();
        Self::literal(NodeKind::Comment, raw, offset, length)
    }

    /// A declaration such as `<!DOCTYPE html>`.
    pub fn doctype(raw: impl Into<String>, offset: usize) -> Self {
        let raw = raw.into();
        let length = raw.len();
        Self::literal(NodeKind::Doctype, raw, offset, length)
    }

    fn literal(kind: NodeKind, text: String, offset: usize, length: usize) -> Self {
        Self {
            kind,
            tag_name: String::new(),
            attributes: Vec::new(),
            text,
            closing_text: String::new(),
            offset,
            length,
        }
    }

    /// Record the closing tag text and the byte offset the element ends at.
    pub(crate) fn close(&mut self, closing_text: impl Into<String>, end: usize) {
        self.closing_text = closing_text.into();
        self.length = end.saturating_sub(self.offset);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_tag(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_comment(&self) -> bool {
        self.kind == NodeKind::Comment
    }

    /// Tag name as written in the template; empty for non-tag nodes.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Raw opening tag text for elements, literal source for everything else.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw closing tag text; empty when the element was closed implicitly.
    pub fn closing_text(&self) -> &str {
        &self.closing_text
    }

    /// Byte offset of the node in the template buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of template bytes the node spans, children and closing tag included.
    pub fn length(&self) -> usize {
        self.length
    }

    // --- Attributes ---

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Value of `key`, matched case-insensitively.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.attributes[i].1.as_str())
    }

    /// Add a new attribute. Returns `false` if the key already exists
    /// or the node is not a tag.
    pub fn new_attribute(&mut self, key: &str, value: &str) -> bool {
        if !self.is_tag() || key.is_empty() || self.has_attribute(key) {
            return false;
        }
        self.attributes.push((key.to_string(), value.to_string()));
        true
    }

    /// Set `key` to `value`, inserting the attribute when absent.
    pub fn update_attribute(&mut self, key: &str, value: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.attributes[i].1 = value.to_string();
                true
            }
            None => self.new_attribute(key, value),
        }
    }

    /// Remove `key`. Returns `false` if it was not present.
    pub fn delete_attribute(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.attributes.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replace the node's literal text (the opening tag for elements).
    pub fn update_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}
