//! Framework tag recognition.
//!
//! A framework tag is written `<NAMESPACE::TYPE ...>`: the namespace says
//! the tag belongs to the framework, the type names the control class that
//! renders it. Everything else in a template is plain HTML.

/// Namespace and control type split out of a framework tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkTag {
    pub namespace: String,
    pub control_type: String,
}

impl FrameworkTag {
    /// True when the tag carries `namespace` and names a control type.
    pub fn is_custom_control(&self, namespace: &str) -> bool {
        self.namespace == namespace && !self.control_type.is_empty()
    }
}

/// Parse raw opening-tag text such as `<gi::Label id="x">`.
///
/// Returns `None` for malformed tags: no leading `<`, no closing `>`, or a
/// name without `::`.
pub fn parse_tag(raw: &str) -> Option<FrameworkTag> {
    let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
    let inner = inner.trim_start();
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(inner.len());
    parse_tag_name(&inner[..end])
}

/// Parse a bare tag name such as `gi::Label`.
///
/// The type may be empty (`gi::`), so callers can tell a framework tag with
/// no type apart from plain HTML.
pub fn parse_tag_name(name: &str) -> Option<FrameworkTag> {
    let (namespace, control_type) = name.split_once("::")?;
    if namespace.is_empty() || !namespace.chars().all(is_name_char) {
        return None;
    }
    if !control_type.chars().all(|c| is_name_char(c) || c == '.') {
        return None;
    }
    Some(FrameworkTag {
        namespace: namespace.to_string(),
        control_type: control_type.to_string(),
    })
}

/// True when `raw` is a framework tag in `namespace` with a non-empty type.
pub fn is_custom_control(raw: &str, namespace: &str) -> bool {
    parse_tag(raw).is_some_and(|tag| tag.is_custom_control(namespace))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Escape text for safe inclusion in markup.
pub fn xml_encode(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(namespace: &str, control_type: &str) -> FrameworkTag {
        FrameworkTag {
            namespace: namespace.to_string(),
            control_type: control_type.to_string(),
        }
    }

    // =========================================================================
    // parse_tag
    // =========================================================================

    #[test]
    fn test_parse_tag_with_attributes() {
        assert_eq!(
            parse_tag("<gi::Label id=\"x\" auto=\"true\">"),
            Some(tag("gi", "Label"))
        );
    }

    #[test]
    fn test_parse_tag_bare_and_self_closing() {
        assert_eq!(parse_tag("<gi::Value>"), Some(tag("gi", "Value")));
        assert_eq!(parse_tag("<gi::Value/>"), Some(tag("gi", "Value")));
        assert_eq!(parse_tag("< gi::Value key=\"a\" />"), Some(tag("gi", "Value")));
    }

    #[test]
    fn test_parse_tag_malformed() {
        assert_eq!(parse_tag("<div class=\"a\">"), None);
        assert_eq!(parse_tag("gi::Label>"), None);
        assert_eq!(parse_tag("<gi::Label id=\"x\""), None);
        assert_eq!(parse_tag("<::Label>"), None);
        assert_eq!(parse_tag(""), None);
    }

    #[test]
    fn test_parse_tag_empty_type() {
        assert_eq!(parse_tag("<gi:: id=\"x\">"), Some(tag("gi", "")));
    }

    #[test]
    fn test_parse_tag_name() {
        assert_eq!(parse_tag_name("ui::Label"), Some(tag("ui", "Label")));
        assert_eq!(parse_tag_name("svg:path"), None);
        assert_eq!(parse_tag_name("div"), None);
    }

    // =========================================================================
    // is_custom_control
    // =========================================================================

    #[test]
    fn test_is_custom_control() {
        assert!(is_custom_control("<gi::Label id=\"x\">", "gi"));
        assert!(!is_custom_control("<ui::Label id=\"x\">", "gi"));
        assert!(!is_custom_control("<gi::>", "gi"));
        assert!(!is_custom_control("<p>", "gi"));
    }

    // =========================================================================
    // xml_encode
    // =========================================================================

    #[test]
    fn test_xml_encode() {
        assert_eq!(
            xml_encode("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
        assert_eq!(xml_encode("plain text"), "plain text");
    }
}
