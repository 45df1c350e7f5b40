//! Markup tree model consumed by the tokenizer.
//!
//! Any HTML or XML parser can feed the pipeline by implementing
//! [`MarkupProvider`] and building [`Node`] values: a text node needs two
//! offsets, an element four (`span.start`, `open_tag.end`, `close_tag.start`,
//! `span.end`).

use crate::diagnostic::Diagnostic;
use crate::source_map::SourceMap;
use crate::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub span: Span,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Text,
    Element(Element),
    /// An opaque unit that is never split: comments, doctypes, CDATA,
    /// processing instructions, stray closing tags, raw-text bodies.
    Raw,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub open_tag: Span,
    /// Empty (at `span.end`) for void, self-closing and implicitly closed elements.
    pub close_tag: Span,
}

impl Node {
    pub fn text(span: Span) -> Self {
        Self {
            span,
            kind: NodeKind::Text,
            children: Vec::new(),
        }
    }

    pub fn raw(span: Span) -> Self {
        Self {
            span,
            kind: NodeKind::Raw,
            children: Vec::new(),
        }
    }

    pub fn element(
        name: impl Into<String>,
        span: Span,
        open_tag: Span,
        close_tag: Span,
        children: Vec<Node>,
    ) -> Self {
        Self {
            span,
            kind: NodeKind::Element(Element {
                name: name.into(),
                open_tag,
                close_tag,
            }),
            children,
        }
    }
}

pub struct ParseResult {
    /// `None` means the input has no structure at all (e.g. it is empty).
    pub document: Option<Document>,
    pub diagnostics: Vec<Diagnostic>,
    pub source_map: SourceMap,
}

/// Turns raw text into a markup tree with byte-offset spans.
pub trait MarkupProvider {
    fn parse(&self, source: &str) -> ParseResult;
}
