use crate::token::{is_raw_text_element, Span, Token, TokenKind};
use crate::LexerError;

/// HTML template scanner.
///
/// Tokenizes a template into text runs, tags, comments and declarations.
/// Positions are byte offsets into the source so the page renderer can
/// splice output back around untouched markup.
///
/// - `&str` source with a byte cursor, stepping one `char` at a time
/// - Line/column tracking on every advance
/// - Lenient text handling: a `<` that opens nothing is literal text
/// - Raw-text handling for `<script>` and `<style>` bodies
/// - Never fails: markup left open at end of input is kept as text (or as
///   a comment running to the end) and reported in the error list
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    errors: Vec<LexerError>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source.
    ///
    /// Returns the tokens together with every construct the scanner had to
    /// recover from. The tokens cover the source losslessly either way.
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexerError>) {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens();
        (scanner.tokens, scanner.errors)
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }

        self.emit(TokenKind::Eof);
    }

    /// Scan the next token.
    fn scan_token(&mut self) {
        if self.peek() != '<' {
            self.scan_text();
            return;
        }

        let (start, line, column) = self.mark();
        let scanned = match self.peek_next() {
            '!' if self.rest().starts_with("<!--") => {
                self.scan_comment();
                Ok(())
            }
            '!' | '?' => self.scan_declaration(),
            '/' if self.peek_at(2).is_ascii_alphabetic() => self.scan_end_tag(),
            c if c.is_ascii_alphabetic() => self.scan_start_tag(),
            _ => {
                self.scan_text();
                Ok(())
            }
        };

        if let Err(error) = scanned {
            // Scan errors only happen at end of input: keep the rest as text.
            let text = self.source[start..self.pos].to_string();
            self.push(TokenKind::Text(text), start, line, column);
            self.errors.push(error);
        }
    }

    // --- Scanners ---

    /// Scan a run of literal text up to the next markup construct.
    fn scan_text(&mut self) {
        let (start, line, column) = self.mark();

        // Always consume the first character so a lone `<` becomes text.
        self.advance();
        while !self.is_at_end() && !self.at_markup_start() {
            self.advance();
        }

        let text = self.source[start..self.pos].to_string();
        self.push(TokenKind::Text(text), start, line, column);
    }

    /// Scan `<!-- ... -->`. An unterminated comment runs to end of input.
    fn scan_comment(&mut self) {
        let (start, line, column) = self.mark();
        self.advance_by(4); // consume `<!--`

        let body_start = self.pos;
        while !self.is_at_end() && !self.rest().starts_with("-->") {
            self.advance();
        }

        let content = self.source[body_start..self.pos].to_string();
        if self.is_at_end() {
            let error = LexerError::new("Unterminated comment", start, line, column);
            self.errors.push(error);
        } else {
            self.advance_by(3); // consume `-->`
        }

        self.push(TokenKind::Comment(content), start, line, column);
    }

    /// Scan `<!DOCTYPE ...>`, `<![CDATA[...]>`-style and `<?...>` declarations.
    fn scan_declaration(&mut self) -> Result<(), LexerError> {
        let (start, line, column) = self.mark();
        self.advance_by(2); // consume `<!` or `<?`

        let body_start = self.pos;
        while !self.is_at_end() && self.peek() != '>' {
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexerError::new("Unterminated declaration", start, line, column));
        }

        let content = self.source[body_start..self.pos].trim().to_string();
        self.advance(); // consume `>`

        self.push(TokenKind::Doctype(content), start, line, column);
        Ok(())
    }

    /// Scan a start tag with its attributes.
    fn scan_start_tag(&mut self) -> Result<(), LexerError> {
        let (start, line, column) = self.mark();
        self.advance(); // consume `<`

        let name = self.scan_tag_name();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                let message = format!("Unterminated tag '<{name}'");
                return Err(LexerError::new(message, start, line, column));
            }

            match self.peek() {
                '>' => {
                    self.advance();
                    break;
                }
                '/' if self.peek_next() == '>' => {
                    self.advance_by(2);
                    self_closing = true;
                    break;
                }
                '/' => self.advance(),
                _ => {
                    if let Some((key, value)) = self.scan_attribute((start, line, column))? {
                        // First occurrence of a key wins, compared without case.
                        if !attributes.iter().any(|(k, _)| k.eq_ignore_ascii_case(&key)) {
                            attributes.push((key, value));
                        }
                    }
                }
            }
        }

        let raw_text = !self_closing && is_raw_text_element(&name);
        self.push(
            TokenKind::StartTag {
                name: name.clone(),
                attributes,
                self_closing,
            },
            start,
            line,
            column,
        );

        if raw_text {
            self.scan_raw_text(&name);
        }
        Ok(())
    }

    /// Scan one `key`, `key=value`, `key="value"` or `key='value'` attribute.
    /// Returns `None` when a stray character was skipped instead.
    fn scan_attribute(
        &mut self,
        tag: (usize, usize, usize),
    ) -> Result<Option<(String, String)>, LexerError> {
        let key_start = self.pos;
        while !self.is_at_end() && is_attribute_name_char(self.peek()) {
            self.advance();
        }

        if self.pos == key_start {
            // Stray quote or `=`; skip it so scanning makes progress.
            self.advance();
            return Ok(None);
        }

        let key = self.source[key_start..self.pos].to_string();

        self.skip_whitespace();
        if self.is_at_end() || self.peek() != '=' {
            return Ok(Some((key, String::new())));
        }
        self.advance(); // consume `=`
        self.skip_whitespace();

        let value = match self.peek() {
            '"' | '\'' => self.scan_quoted_value(tag)?,
            _ => {
                let value_start = self.pos;
                while !self.is_at_end() && !self.peek().is_whitespace() && self.peek() != '>' {
                    self.advance();
                }
                self.source[value_start..self.pos].to_string()
            }
        };

        Ok(Some((key, value)))
    }

    /// Scan a quoted attribute value. Entities are left undecoded.
    /// Errors point at the start of the enclosing tag.
    fn scan_quoted_value(&mut self, tag: (usize, usize, usize)) -> Result<String, LexerError> {
        let quote = self.peek();
        self.advance(); // consume opening quote

        let value_start = self.pos;
        while !self.is_at_end() && self.peek() != quote {
            self.advance();
        }

        if self.is_at_end() {
            let (start, line, column) = tag;
            return Err(LexerError::new("Unterminated attribute value", start, line, column));
        }

        let value = self.source[value_start..self.pos].to_string();
        self.advance(); // consume closing quote
        Ok(value)
    }

    /// Scan the body of a raw-text element up to (not including) its end tag.
    /// An unclosed raw-text element swallows the rest of the input as text.
    fn scan_raw_text(&mut self, name: &str) {
        let (start, line, column) = self.mark();
        let close = format!("</{name}");

        while !self.is_at_end() && !self.rest_starts_with_ignore_case(&close) {
            self.advance();
        }

        if self.pos > start {
            let text = self.source[start..self.pos].to_string();
            self.push(TokenKind::Text(text), start, line, column);
        }
    }

    /// Scan `</name ...>`.
    fn scan_end_tag(&mut self) -> Result<(), LexerError> {
        let (start, line, column) = self.mark();
        self.advance_by(2); // consume `</`

        let name = self.scan_tag_name();
        while !self.is_at_end() && self.peek() != '>' {
            self.advance();
        }

        if self.is_at_end() {
            let message = format!("Unterminated end tag '</{name}'");
            return Err(LexerError::new(message, start, line, column));
        }
        self.advance(); // consume `>`

        self.push(TokenKind::EndTag { name }, start, line, column);
        Ok(())
    }

    /// Scan a tag name. Accepts `::` so `gi::Label` stays one name.
    fn scan_tag_name(&mut self) -> String {
        let start = self.pos;
        while !self.is_at_end() && is_tag_name_char(self.peek()) {
            self.advance();
        }
        self.source[start..self.pos].to_string()
    }

    // --- Helpers ---

    /// Whether the cursor sits on a `<` that opens a tag, end tag, comment or declaration.
    fn at_markup_start(&self) -> bool {
        if self.peek() != '<' {
            return false;
        }
        match self.peek_next() {
            '!' | '?' => true,
            '/' => self.peek_at(2).is_ascii_alphabetic(),
            c => c.is_ascii_alphabetic(),
        }
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.column)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let span = Span::new(start, self.pos, line, column);
        self.tokens.push(Token::new(kind, span));
    }

    fn emit(&mut self, kind: TokenKind) {
        let span = Span::new(self.pos, self.pos, self.line, self.column);
        self.tokens.push(Token::new(kind, span));
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn rest_starts_with_ignore_case(&self, prefix: &str) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.rest().chars().nth(offset).unwrap_or('\0')
    }

    fn advance(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn is_tag_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn is_attribute_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return token kinds (ignoring spans).
    fn kinds(source: &str) -> Vec<TokenKind> {
        tokens(source).into_iter().map(|t| t.kind).collect()
    }

    /// Helper: tokenize well-formed source.
    fn tokens(source: &str) -> Vec<Token> {
        let (tokens, errors) = Scanner::tokenize(source);
        assert_eq!(errors, Vec::new(), "unexpected recovery in {source:?}");
        tokens
    }

    /// Helper: tokenize malformed source, checking the tokens still cover it.
    fn recovered(source: &str) -> (Vec<TokenKind>, Vec<LexerError>) {
        let (tokens, errors) = Scanner::tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| t.raw(source)).collect();
        assert_eq!(rebuilt, source);
        (tokens.into_iter().map(|t| t.kind).collect(), errors)
    }

    fn start_tag(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> TokenKind {
        TokenKind::StartTag {
            name: name.into(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    // =========================================================================
    // Structure: empty, text, EOF
    // =========================================================================

    #[test]
    fn test_empty_source() {
        let toks = tokens("");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            kinds("hello world"),
            vec![TokenKind::Text("hello world".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(
            kinds("a < b"),
            vec![TokenKind::Text("a < b".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_angle_bracket_before_digit_is_text() {
        assert_eq!(
            kinds("1<2<p>"),
            vec![
                TokenKind::Text("1<2".into()),
                start_tag("p", &[], false),
                TokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Tags
    // =========================================================================

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds("<p>hi</p>"),
            vec![
                start_tag("p", &[], false),
                TokenKind::Text("hi".into()),
                TokenKind::EndTag { name: "p".into() },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_framework_tag_name_keeps_namespace() {
        assert_eq!(
            kinds("<gi::Label id=\"x\"></gi::Label>"),
            vec![
                start_tag("gi::Label", &[("id", "x")], false),
                TokenKind::EndTag {
                    name: "gi::Label".into()
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_self_closing_tag() {
        assert_eq!(
            kinds("<br/>"),
            vec![start_tag("br", &[], true), TokenKind::Eof]
        );
    }

    #[test]
    fn test_self_closing_with_space() {
        assert_eq!(
            kinds("<gi::Value key=\"a\" />"),
            vec![start_tag("gi::Value", &[("key", "a")], true), TokenKind::Eof]
        );
    }

    #[test]
    fn test_end_tag_with_whitespace() {
        assert_eq!(
            kinds("</div >"),
            vec![TokenKind::EndTag { name: "div".into() }, TokenKind::Eof]
        );
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    #[test]
    fn test_attribute_quoting_styles() {
        assert_eq!(
            kinds("<a href=\"/x\" title='t' data-n=5 hidden>"),
            vec![
                start_tag(
                    "a",
                    &[("href", "/x"), ("title", "t"), ("data-n", "5"), ("hidden", "")],
                    false
                ),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_attribute_order_preserved() {
        let toks = kinds("<img src=\"a.png\" alt=\"A\" width=\"3\">");
        match &toks[0] {
            TokenKind::StartTag { attributes, .. } => {
                let keys: Vec<&str> = attributes.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["src", "alt", "width"]);
            }
            other => panic!("Expected StartTag, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_spaces_around_equals() {
        assert_eq!(
            kinds("<p id = \"x\">"),
            vec![start_tag("p", &[("id", "x")], false), TokenKind::Eof]
        );
    }

    #[test]
    fn test_attribute_value_with_angle_bracket() {
        assert_eq!(
            kinds("<p title=\"a>b\">"),
            vec![start_tag("p", &[("title", "a>b")], false), TokenKind::Eof]
        );
    }

    #[test]
    fn test_stray_quote_skipped() {
        assert_eq!(
            kinds("<p \"x>"),
            vec![start_tag("p", &[("x", "")], false), TokenKind::Eof]
        );
    }

    // =========================================================================
    // Comments, declarations, raw text
    // =========================================================================

    #[test]
    fn test_comment() {
        assert_eq!(
            kinds("<!-- note <b> -->"),
            vec![TokenKind::Comment(" note <b> ".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_doctype() {
        assert_eq!(
            kinds("<!DOCTYPE html>"),
            vec![TokenKind::Doctype("DOCTYPE html".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_script_body_is_raw_text() {
        assert_eq!(
            kinds("<script>if (a<b) {}</script>"),
            vec![
                start_tag("script", &[], false),
                TokenKind::Text("if (a<b) {}".into()),
                TokenKind::EndTag {
                    name: "script".into()
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_style_end_tag_case_insensitive() {
        assert_eq!(
            kinds("<style>p{}</STYLE>"),
            vec![
                start_tag("style", &[], false),
                TokenKind::Text("p{}".into()),
                TokenKind::EndTag {
                    name: "STYLE".into()
                },
                TokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Spans
    // =========================================================================

    #[test]
    fn test_spans_cover_source_losslessly() {
        let source = "<!DOCTYPE html>\n<p class=\"a\">x &amp; y</p><!--c--><br>é";
        let toks = tokens(source);
        let rebuilt: String = toks.iter().map(|t| t.raw(source)).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_span_line_and_column() {
        let toks = tokens("a\n  <p>");
        assert_eq!(toks[1].span.line, 2);
        assert_eq!(toks[1].span.column, 3);
        assert_eq!(toks[1].span.start, 4);
        assert_eq!(toks[1].span.end, 7);
    }

    #[test]
    fn test_multibyte_text_offsets() {
        let source = "ü<p>";
        let toks = tokens(source);
        assert_eq!(toks[0].raw(source), "ü");
        assert_eq!(toks[1].span.start, 2);
    }

    #[test]
    fn test_repeated_attribute_keeps_first() {
        assert_eq!(
            kinds("<p id=\"a\" ID=\"b\" class=x>"),
            vec![start_tag("p", &[("id", "a"), ("class", "x")], false), TokenKind::Eof]
        );
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    #[test]
    fn test_unterminated_tag_becomes_text() {
        let (kinds, errors) = recovered("<p>x</p><div class=\"a\"");
        assert_eq!(kinds[3], TokenKind::Text("<div class=\"a\"".into()));
        assert_eq!(kinds.len(), 5);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unterminated tag"));
        assert_eq!(errors[0].offset, 8);
        assert_eq!(errors[0].column, 9);
    }

    #[test]
    fn test_unterminated_attribute_value() {
        let (kinds, errors) = recovered("<div class=\"a>");
        assert_eq!(kinds, vec![TokenKind::Text("<div class=\"a>".into()), TokenKind::Eof]);
        assert!(errors[0].message.contains("attribute value"));
        assert_eq!(errors[0].offset, 0);
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let (kinds, errors) = recovered("x\n<!-- open");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text("x\n".into()),
                TokenKind::Comment(" open".into()),
                TokenKind::Eof,
            ]
        );
        assert!(errors[0].message.contains("Unterminated comment"));
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[0].offset, 2);
    }

    #[test]
    fn test_unterminated_end_tag_and_declaration() {
        let (kinds, errors) = recovered("<p></p");
        assert_eq!(kinds[1], TokenKind::Text("</p".into()));
        assert!(errors[0].message.contains("end tag"));

        let (kinds, errors) = recovered("<!DOCTYPE html");
        assert_eq!(kinds[0], TokenKind::Text("<!DOCTYPE html".into()));
        assert!(errors[0].message.contains("declaration"));
    }
}
