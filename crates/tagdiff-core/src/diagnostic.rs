use crate::source_map::Range;

pub const W_TAG_UNCLOSED: &str = "W_TAG_UNCLOSED";
pub const W_TAG_STRAY: &str = "W_TAG_STRAY";
pub const W_NODE_SPAN_INVALID: &str = "W_NODE_SPAN_INVALID";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
    /// Which input the diagnostic belongs to once both sides are merged.
    pub side: Option<Side>,
}

impl Diagnostic {
    pub fn new(
        range: Range,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            code,
            message: message.into(),
            side: None,
        }
    }

    pub fn warning(range: Range, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Warning, code, message)
    }

    pub fn error(range: Range, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Error, code, message)
    }

    pub fn on_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticSeverity {
    /// Input a provider could not make sense of. `HtmlParser` never reports
    /// these; custom `MarkupProvider`s may, usually alongside a `None` document.
    Error,
    Warning,
}

/// The two inputs of a diff: `Left` is the old text, `Right` the new one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "old",
            Side::Right => "new",
        }
    }
}
