//! Lenient HTML tree builder.
//!
//! It only needs to find where tags begin and end, so attribute values are
//! never decoded and nesting is repaired rather than rejected. Every byte of
//! the input ends up in exactly one text node, tag span or raw node.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::diagnostic::{Diagnostic, W_TAG_STRAY, W_TAG_UNCLOSED};
use crate::markup::{Document, MarkupProvider, Node, ParseResult};
use crate::source_map::SourceMap;
use crate::span::Span;

static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

static RAW_TEXT_ELEMENTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["script", "style", "textarea", "title"].into_iter().collect());

/// The built-in [`MarkupProvider`]. Never fails on non-empty input.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupProvider for HtmlParser {
    fn parse(&self, source: &str) -> ParseResult {
        let source_map = SourceMap::new(source);
        if source.is_empty() {
            return ParseResult {
                document: None,
                diagnostics: Vec::new(),
                source_map,
            };
        }
        let mut builder = TreeBuilder::new(source, &source_map);
        builder.run();
        let TreeBuilder {
            root, diagnostics, ..
        } = builder;
        ParseResult {
            document: Some(Document {
                span: Span {
                    start: 0,
                    end: source.len(),
                },
                children: root,
            }),
            diagnostics,
            source_map,
        }
    }
}

struct OpenElement {
    name: String,
    open_tag: Span,
    children: Vec<Node>,
}

struct TreeBuilder<'a> {
    source: &'a str,
    source_map: &'a SourceMap,
    root: Vec<Node>,
    stack: Vec<OpenElement>,
    diagnostics: Vec<Diagnostic>,
    misses: SearchMisses,
}

/// Offsets from which a forward search for `"`, `'` or `>` found nothing.
/// Scanning only moves forward, so any later search starting at or past a
/// recorded offset fails without touching the input again.
#[derive(Debug, Default)]
struct SearchMisses {
    from: [Option<usize>; 3],
}

impl SearchMisses {
    /// Finds `byte` in `source[from..]`, returning its absolute offset.
    fn find(&mut self, source: &[u8], from: usize, byte: u8) -> Option<usize> {
        let slot = match byte {
            b'"' => 0,
            b'\'' => 1,
            _ => 2,
        };
        if self.from[slot].is_some_and(|miss| miss <= from) {
            return None;
        }
        let found = source
            .get(from..)
            .and_then(|rest| rest.iter().position(|&b| b == byte))
            .map(|idx| from + idx);
        if found.is_none() {
            self.from[slot] = Some(self.from[slot].map_or(from, |miss| miss.min(from)));
        }
        found
    }
}

#[derive(Debug, PartialEq)]
enum Markup<'a> {
    /// Comment, doctype, CDATA section or processing instruction.
    Opaque { end: usize },
    OpenTag {
        name: &'a str,
        end: usize,
        self_closing: bool,
    },
    CloseTag { name: &'a str, end: usize },
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, source_map: &'a SourceMap) -> Self {
        Self {
            source,
            source_map,
            root: Vec::new(),
            stack: Vec::new(),
            diagnostics: Vec::new(),
            misses: SearchMisses::default(),
        }
    }

    fn run(&mut self) {
        let bytes = self.source.as_bytes();
        let mut text_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'<' {
                i += 1;
                continue;
            }
            let Some(markup) = scan_markup(self.source, i, &mut self.misses) else {
                i += 1;
                continue;
            };
            self.push_text(text_start, i);
            i = match markup {
                Markup::Opaque { end } => {
                    self.push_node(Node::raw(Span { start: i, end }));
                    end
                }
                Markup::OpenTag {
                    name,
                    end,
                    self_closing,
                } => self.open_element(name, Span { start: i, end }, self_closing),
                Markup::CloseTag { name, end } => {
                    self.close_element(name, Span { start: i, end });
                    end
                }
            };
            text_start = i;
        }
        self.push_text(text_start, bytes.len());
        while !self.stack.is_empty() {
            self.finish_unclosed(self.source.len());
        }
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if start < end {
            self.push_node(Node::text(Span { start, end }));
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Returns the offset where scanning resumes.
    fn open_element(&mut self, name: &str, open_tag: Span, self_closing: bool) -> usize {
        let name = name.to_ascii_lowercase();
        if self_closing || VOID_ELEMENTS.contains(name.as_str()) {
            let close_tag = Span::empty_at(open_tag.end);
            self.push_node(Node::element(name, open_tag, open_tag, close_tag, Vec::new()));
            return open_tag.end;
        }

        if RAW_TEXT_ELEMENTS.contains(name.as_str()) {
            let body_start = open_tag.end;
            let close = find_raw_text_close(self.source, body_start, &name);
            let body_end = close.map(|(start, _)| start).unwrap_or(self.source.len());
            let mut children = Vec::new();
            if body_start < body_end {
                children.push(Node::raw(Span {
                    start: body_start,
                    end: body_end,
                }));
            }
            return match close {
                Some((start, end)) => {
                    let close_tag = Span { start, end };
                    let span = Span {
                        start: open_tag.start,
                        end,
                    };
                    self.push_node(Node::element(name, span, open_tag, close_tag, children));
                    end
                }
                None => {
                    self.stack.push(OpenElement {
                        name,
                        open_tag,
                        children,
                    });
                    self.finish_unclosed(body_end);
                    body_end
                }
            };
        }

        self.stack.push(OpenElement {
            name,
            open_tag,
            children: Vec::new(),
        });
        open_tag.end
    }

    fn close_element(&mut self, name: &str, close_tag: Span) {
        let matching = self
            .stack
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name));
        let Some(index) = matching else {
            self.diagnostics.push(Diagnostic::warning(
                self.source_map.range(close_tag),
                W_TAG_STRAY,
                format!("closing tag </{}> has no matching opening tag", name),
            ));
            self.push_node(Node::raw(close_tag));
            return;
        };
        while self.stack.len() > index + 1 {
            self.finish_unclosed(close_tag.start);
        }
        if let Some(open) = self.stack.pop() {
            let span = Span {
                start: open.open_tag.start,
                end: close_tag.end,
            };
            let node = Node::element(open.name, span, open.open_tag, close_tag, open.children);
            self.push_node(node);
        }
    }

    fn finish_unclosed(&mut self, end: usize) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        self.diagnostics.push(Diagnostic::warning(
            self.source_map.range(open.open_tag),
            W_TAG_UNCLOSED,
            format!("element <{}> is never closed", open.name),
        ));
        let span = Span {
            start: open.open_tag.start,
            end,
        };
        let node = Node::element(
            open.name,
            span,
            open.open_tag,
            Span::empty_at(end),
            open.children,
        );
        self.push_node(node);
    }
}

fn scan_markup<'a>(source: &'a str, start: usize, misses: &mut SearchMisses) -> Option<Markup<'a>> {
    let bytes = source.as_bytes();
    let rest = &bytes[start..];
    if rest.starts_with(b"<!--") {
        let end = find_from(rest, 4, b"-->").map_or(source.len(), |idx| start + idx + 3);
        return Some(Markup::Opaque { end });
    }
    if rest.starts_with(b"<![CDATA[") {
        let end = find_from(rest, 9, b"]]>").map_or(source.len(), |idx| start + idx + 3);
        return Some(Markup::Opaque { end });
    }
    if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
        let gt = misses.find(bytes, start + 2, b'>')?;
        return Some(Markup::Opaque { end: gt + 1 });
    }
    if rest.starts_with(b"</") {
        let (name_end, close) = scan_close_tag(rest)?;
        return Some(Markup::CloseTag {
            name: &source[start + 2..start + name_end],
            end: start + close + 1,
        });
    }
    let (name_end, close, self_closing) = scan_open_tag(bytes, start, misses)?;
    Some(Markup::OpenTag {
        name: &source[start + 1..start + name_end],
        end: start + close + 1,
        self_closing,
    })
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|idx| from + idx)
}

/// Scans a tag name starting at `idx`; returns the index just past it.
fn scan_tag_name(bytes: &[u8], idx: usize) -> Option<usize> {
    if !bytes.get(idx)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = idx + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    Some(i)
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Returns `(name_end, index_of_gt)` for `</name ws* >`.
fn scan_close_tag(bytes: &[u8]) -> Option<(usize, usize)> {
    let name_end = scan_tag_name(bytes, 2)?;
    let i = skip_whitespace(bytes, name_end);
    (bytes.get(i) == Some(&b'>')).then_some((name_end, i))
}

/// Returns `(name_end, index_of_gt, self_closing)` for an opening tag,
/// relative to `start`.
fn scan_open_tag(
    source: &[u8],
    start: usize,
    misses: &mut SearchMisses,
) -> Option<(usize, usize, bool)> {
    let bytes = &source[start..];
    let name_end = scan_tag_name(bytes, 1)?;
    let mut i = name_end;
    loop {
        let had_space = i < bytes.len() && bytes[i].is_ascii_whitespace();
        i = skip_whitespace(bytes, i);
        match bytes.get(i)? {
            b'>' => return Some((name_end, i, false)),
            b'/' if bytes.get(i + 1) == Some(&b'>') => return Some((name_end, i + 1, true)),
            _ => {}
        }
        if !had_space || !is_attr_name_start(bytes[i]) {
            return None;
        }
        i += 1;
        while i < bytes.len() && is_attr_name_continue(bytes[i]) {
            i += 1;
        }
        let after_name = i;
        let eq = skip_whitespace(bytes, i);
        if bytes.get(eq) != Some(&b'=') {
            i = after_name;
            continue;
        }
        i = skip_whitespace(bytes, eq + 1);
        let quote = *bytes.get(i)?;
        if quote == b'"' || quote == b'\'' {
            let close = misses.find(source, start + i + 1, quote)?;
            i = close - start + 1;
        } else {
            let value_start = i;
            while i < bytes.len() {
                let b = bytes[i];
                if b.is_ascii_whitespace() || b == b'>' {
                    break;
                }
                if b == b'/' && bytes.get(i + 1) == Some(&b'>') {
                    break;
                }
                if matches!(b, b'"' | b'\'' | b'=' | b'<' | b'`') {
                    return None;
                }
                i += 1;
            }
            if i == value_start {
                return None;
            }
        }
        // Attributes must be separated by whitespace or end the tag.
        match bytes.get(i)? {
            b if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
            _ => return None,
        }
    }
}

fn is_attr_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b':'
}

fn is_attr_name_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b':' | b'-')
}

/// Finds `</name ws* >` for a raw-text element; returns the closing tag span.
fn find_raw_text_close(source: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut i = from;
    while let Some(idx) = find_from(bytes, i, b"</") {
        let name_start = idx + 2;
        let name_end = name_start + name.len();
        if bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            && scan_tag_name(bytes, name_start) == Some(name_end)
            && let Some((_, close)) = scan_close_tag(&bytes[idx..])
        {
            return Some((idx, idx + close + 1));
        }
        i = idx + 2;
    }
    None
}
