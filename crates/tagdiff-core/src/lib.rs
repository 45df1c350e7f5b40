mod annotate;
mod diagnostic;
mod diff;
mod error;
mod html;
mod markup;
mod myers;
mod options;
mod pipeline;
mod sanitize;
mod sequence;
mod source_map;
mod span;
mod tokenizer;

pub use annotate::{
    AnnotateOptions, CLASS_ADDED, CLASS_MODIFIED, CLASS_REMOVED, ChangeStyle, MarkerPair,
    MarkerSet, WrapMode, annotate,
};
pub use diagnostic::{
    Diagnostic, DiagnosticSeverity, Side, W_NODE_SPAN_INVALID, W_TAG_STRAY, W_TAG_UNCLOSED,
};
pub use diff::{DiffStats, EditKind, EditOp, EditScript, diff_tokens};
pub use error::DiffError;
pub use html::HtmlParser;
pub use markup::{Document, Element, MarkupProvider, Node, NodeKind, ParseResult};
pub use options::DiffOptions;
pub use pipeline::{MarkupDiff, TextDiffResult, compute_markup_diff, diff_markup, diff_markup_with};
pub use sanitize::sanitize_annotated;
pub use sequence::{TokenSequence, reassemble};
pub use source_map::{Position, Range, SourceMap};
pub use span::{Span, SpanError};
pub use tokenizer::{
    DEFAULT_SENTENCE_TERMINATORS, Granularity, Token, TokenKind, TokenizeOptions, Tokenized,
    tokenize,
};
