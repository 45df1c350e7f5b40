use std::fmt;
use std::str::FromStr;

use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::diagnostic::{Diagnostic, W_NODE_SPAN_INVALID};
use crate::markup::{Node, NodeKind, ParseResult};
use crate::source_map::SourceMap;
use crate::span::Span;

/// Sentence terminators used when no custom set is configured.
pub const DEFAULT_SENTENCE_TERMINATORS: &[char] = &[
    '.', '!', '?', ';', '…', '。', '！', '？', '；', '\n',
];

/// Character references longer than this are treated as plain text.
const MAX_ENTITY_LEN: usize = 32;

/// How text content is cut into diffable units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Granularity {
    /// One token per user-perceived character (grapheme cluster).
    #[default]
    ByWord,
    /// One token per line, including its `\n`.
    ByLine,
    /// One token per sentence, including its terminator run.
    BySentence,
}

impl Granularity {
    pub fn name(self) -> &'static str {
        match self {
            Granularity::ByWord => "word",
            Granularity::ByLine => "line",
            Granularity::BySentence => "sentence",
        }
    }

    /// Splits the text of one text node, starting at byte `offset` in the source.
    fn split_text<'a>(
        self,
        text: &'a str,
        offset: usize,
        options: &TokenizeOptions,
        out: &mut Vec<Token<'a>>,
    ) {
        match self {
            Granularity::ByWord => split_graphemes(text, offset, out),
            Granularity::ByLine => {
                let mut start = 0;
                for line in text.split_inclusive('\n') {
                    out.push(Token::text(line, offset + start));
                    start += line.len();
                }
            }
            Granularity::BySentence => split_sentences(text, offset, &options.terminators, out),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "word" | "char" | "character" => Ok(Granularity::ByWord),
            "line" => Ok(Granularity::ByLine),
            "sentence" => Ok(Granularity::BySentence),
            other => Err(format!(
                "unknown granularity `{}` (expected word, line or sentence)",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub terminators: Vec<char>,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            terminators: DEFAULT_SENTENCE_TERMINATORS.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Text,
    /// A character reference such as `&amp;` or `&#x4E2D;`.
    Entity,
    OpenTag,
    CloseTag,
    Raw,
}

impl TokenKind {
    /// Tag-like units that must stay outside markers to keep nesting intact.
    pub fn is_markup(self) -> bool {
        matches!(self, TokenKind::OpenTag | TokenKind::CloseTag | TokenKind::Raw)
    }
}

/// An atomic diffable unit borrowed from the source text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    pub fn empty() -> Self {
        Self {
            text: "",
            span: Span::default(),
            kind: TokenKind::Text,
        }
    }

    fn text(text: &'a str, start: usize) -> Self {
        Self::with_kind(text, start, TokenKind::Text)
    }

    fn with_kind(text: &'a str, start: usize, kind: TokenKind) -> Self {
        Self {
            text,
            span: Span {
                start,
                end: start + text.len(),
            },
            kind,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tokenized<'a> {
    /// Never empty: input without structure yields a single empty token.
    pub tokens: Vec<Token<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks the parsed tree depth-first and cuts it into tokens.
pub fn tokenize<'a>(
    source: &'a str,
    parsed: &ParseResult,
    granularity: Granularity,
    options: &TokenizeOptions,
) -> Tokenized<'a> {
    let mut walker = Walker {
        source,
        source_map: &parsed.source_map,
        granularity,
        options,
        tokens: Vec::new(),
        diagnostics: Vec::new(),
    };
    if let Some(document) = &parsed.document {
        walker.visit_all(&document.children);
    }
    let Walker {
        mut tokens,
        diagnostics,
        ..
    } = walker;
    if tokens.is_empty() {
        tokens.push(Token::empty());
    }
    Tokenized {
        tokens,
        diagnostics,
    }
}

struct Walker<'a, 'o> {
    source: &'a str,
    source_map: &'o SourceMap,
    granularity: Granularity,
    options: &'o TokenizeOptions,
    tokens: Vec<Token<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Walker<'a, '_> {
    fn visit_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Text => {
                if let Some(text) = self.slice(node.span, "text") {
                    self.granularity
                        .split_text(text, node.span.start, self.options, &mut self.tokens);
                }
            }
            NodeKind::Raw => self.push_whole(node.span, TokenKind::Raw, "raw"),
            NodeKind::Element(element) => {
                self.push_whole(element.open_tag, TokenKind::OpenTag, "opening tag");
                self.visit_all(&node.children);
                self.push_whole(element.close_tag, TokenKind::CloseTag, "closing tag");
            }
        }
    }

    fn push_whole(&mut self, span: Span, kind: TokenKind, what: &str) {
        if let Some(text) = self.slice(span, what)
            && !text.is_empty()
        {
            self.tokens.push(Token::with_kind(text, span.start, kind));
        }
    }

    fn slice(&mut self, span: Span, what: &str) -> Option<&'a str> {
        match span.slice(self.source) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(
                    start = span.start,
                    end = span.end,
                    node = what,
                    error = %err,
                    "skipping node with invalid span"
                );
                let range = self
                    .source_map
                    .range(Span::empty_at(span.start.min(self.source.len())));
                self.diagnostics.push(Diagnostic::warning(
                    range,
                    W_NODE_SPAN_INVALID,
                    format!("skipped {}: {}", what, err),
                ));
                None
            }
        }
    }
}

fn split_graphemes<'a>(text: &'a str, offset: usize, out: &mut Vec<Token<'a>>) {
    let mut resume = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        if idx < resume {
            // A combining mark after `;` joins the reference's last cluster.
            let end = idx + grapheme.len();
            if end > resume {
                out.push(Token::text(&text[resume..end], offset + resume));
            }
            continue;
        }
        if grapheme.starts_with('&')
            && let Some(len) = entity_len(&text[idx..])
        {
            out.push(Token::with_kind(
                &text[idx..idx + len],
                offset + idx,
                TokenKind::Entity,
            ));
            resume = idx + len;
            continue;
        }
        out.push(Token::text(grapheme, offset + idx));
    }
}

fn split_sentences<'a>(text: &'a str, offset: usize, terminators: &[char], out: &mut Vec<Token<'a>>) {
    let mut start = 0;
    let mut in_terminator_run = false;
    for (idx, ch) in text.char_indices() {
        let is_terminator = terminators.contains(&ch);
        if in_terminator_run && !is_terminator {
            out.push(Token::text(&text[start..idx], offset + start));
            start = idx;
        }
        in_terminator_run = is_terminator;
    }
    if start < text.len() {
        out.push(Token::text(&text[start..], offset + start));
    }
}

/// Length of the character reference at the start of `text`, if any.
fn entity_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }
    let mut i = 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
        let hex = matches!(bytes.get(i), Some(b'x' | b'X'));
        if hex {
            i += 1;
        }
        let digits_start = i;
        while i < bytes.len()
            && (if hex {
                bytes[i].is_ascii_hexdigit()
            } else {
                bytes[i].is_ascii_digit()
            })
        {
            i += 1;
        }
        if i == digits_start {
            return None;
        }
    } else {
        let name_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        if i == name_start {
            return None;
        }
    }
    if bytes.get(i) != Some(&b';') || i + 1 > MAX_ENTITY_LEN {
        return None;
    }
    Some(i + 1)
}
