//! Output model of the splitter.

use serde::{Deserialize, Serialize};
use sqlsplit_common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    /// An executable SQL statement.
    Statement,
    /// A dialect-specific client directive (`GO`, `\connect`, a lone `/`)
    /// passed through opaquely for the host to interpret.
    ControlCommand,
}

/// One element of a split script: a span over the source document plus the
/// trimmed text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptElement {
    span: Span,
    text: String,
    kind: ElementKind,
}

impl ScriptElement {
    pub fn new(span: Span, text: String, kind: ElementKind) -> Self {
        ScriptElement { span, text, kind }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Byte offset of the element start in the source document.
    pub fn start_offset(&self) -> usize {
        self.span.start.index
    }

    /// Byte offset just past the element end in the source document.
    pub fn end_offset(&self) -> usize {
        self.span.stop.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_control_command(&self) -> bool {
        self.kind == ElementKind::ControlCommand
    }
}
