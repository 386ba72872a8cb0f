//! Page diagnostics.
//!
//! Problems found while parsing a template or matching framework tags to
//! controls never abort a page. Malformed markup is kept as text, an
//! unmatched tag renders as an error marker, and a diagnostic is recorded
//! here (and logged) so tools can report it.

use std::fmt;

use gridiron_parser::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("Framework tag has no control type")]
    MissingType,

    #[error("'{control_type}' tag has no id attribute")]
    MissingId { control_type: String },

    #[error("Duplicate id '{id}': already used by a {existing} control")]
    DuplicateAutonomousId { id: String, existing: String },

    #[error("Unknown control type '{control_type}' for autonomous tag '{id}'")]
    UnknownControlType { control_type: String, id: String },

    #[error("Control type '{control_type}' cannot be created from markup (tag '{id}')")]
    AutonomyDenied { control_type: String, id: String },

    #[error("No control declared for tag '{id}'")]
    Unresolved { id: String },

    #[error("Control '{id}' is already bound to another tag")]
    AlreadyBound { id: String },

    #[error("Tag '{id}' expects a {expected} control but found a {found}")]
    TypeMismatch {
        id: String,
        expected: String,
        found: String,
    },

    #[error("Malformed markup kept as text: {message}")]
    MalformedMarkup { message: String },
}

impl DiagnosticKind {
    /// True when the tag renders as an error marker.
    ///
    /// A type mismatch still binds and malformed markup passes through
    /// unchanged, so both are only warnings.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            DiagnosticKind::TypeMismatch { .. } | DiagnosticKind::MalformedMarkup { .. }
        )
    }
}

/// A problem with one template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub node: NodeId,
    /// Byte offset of the node in the template.
    pub offset: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    /// 1-based line and column of the tag within `source`.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let before = source.get(..self.offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.is_error() { "error" } else { "warning" };
        write!(f, "{level} at byte {}: {}", self.offset, self.kind)
    }
}
