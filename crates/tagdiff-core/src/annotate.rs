use std::ops::Range;

use crate::diagnostic::Side;
use crate::diff::{EditKind, EditOp, EditScript};
use crate::sequence::TokenSequence;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerPair {
    pub begin: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// `<span class="{class}">` … `</span>`.
    pub fn span_class(class: &str) -> Self {
        Self::new(format!("<span class=\"{}\">", class), "</span>")
    }

    pub fn wrap(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.begin.len() + text.len() + self.end.len());
        out.push_str(&self.begin);
        out.push_str(text);
        out.push_str(&self.end);
        out
    }
}

pub const CLASS_ADDED: &str = "diff_add";
pub const CLASS_REMOVED: &str = "diff_del";
pub const CLASS_MODIFIED: &str = "diff_modify";

/// The three marker vocabularies, one per change kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerSet {
    pub insert: MarkerPair,
    pub delete: MarkerPair,
    pub replace: MarkerPair,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            insert: MarkerPair::span_class(CLASS_ADDED),
            delete: MarkerPair::span_class(CLASS_REMOVED),
            replace: MarkerPair::span_class(CLASS_MODIFIED),
        }
    }
}

impl MarkerSet {
    fn pairs(&self) -> [(&'static str, &MarkerPair); 3] {
        [
            ("insert", &self.insert),
            ("delete", &self.delete),
            ("replace", &self.replace),
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (key, pair) in self.pairs() {
            if pair.begin.is_empty() || pair.end.is_empty() {
                return Err(format!("{} marker needs a non-empty begin and end", key));
            }
        }
        Ok(())
    }
}

/// How a replacement is shown.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ChangeStyle {
    /// Both sides marked as modified.
    #[default]
    Modified,
    /// Old side marked as removed, new side marked as added.
    Split,
}

/// What a marker may enclose.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WrapMode {
    /// One marker around the whole changed run, tags included.
    #[default]
    Whole,
    /// Tags stay outside markers; each tag-free stretch is wrapped on its own.
    TextOnly,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnnotateOptions {
    pub markers: MarkerSet,
    pub change_style: ChangeStyle,
    pub wrap_mode: WrapMode,
}

/// Rewrites one side of a diff in place, wrapping each changed run.
///
/// Deletes and replacements act on the old ranges when `side` is `Left`;
/// inserts and replacements act on the new ranges when `side` is `Right`.
/// Runs whose tokens hold no text are left alone.
pub fn annotate(
    sequence: &mut TokenSequence<'_>,
    script: &EditScript,
    side: Side,
    options: &AnnotateOptions,
) {
    for op in script.ops() {
        let Some((range, marker)) = target(op, side, options) else {
            continue;
        };
        if range.end > sequence.len() || sequence.text_len(range.clone()) == 0 {
            continue;
        }
        match options.wrap_mode {
            WrapMode::Whole => wrap_run(sequence, range, marker),
            WrapMode::TextOnly => wrap_text_runs(sequence, range, marker),
        }
    }
}

fn target<'o>(
    op: &EditOp,
    side: Side,
    options: &'o AnnotateOptions,
) -> Option<(Range<usize>, &'o MarkerPair)> {
    let markers = &options.markers;
    match (op.kind, side) {
        (EditKind::Equal, _) | (EditKind::Insert, Side::Left) | (EditKind::Delete, Side::Right) => {
            None
        }
        (EditKind::Delete, Side::Left) => Some((op.old_range(), &markers.delete)),
        (EditKind::Insert, Side::Right) => Some((op.new_range(), &markers.insert)),
        (EditKind::Replace, Side::Left) => Some((
            op.old_range(),
            match options.change_style {
                ChangeStyle::Split => &markers.delete,
                ChangeStyle::Modified => &markers.replace,
            },
        )),
        (EditKind::Replace, Side::Right) => Some((
            op.new_range(),
            match options.change_style {
                ChangeStyle::Split => &markers.insert,
                ChangeStyle::Modified => &markers.replace,
            },
        )),
    }
}

fn wrap_run(sequence: &mut TokenSequence<'_>, range: Range<usize>, marker: &MarkerPair) {
    let marked = marker.wrap(&sequence.concat(range.clone()));
    sequence.fold(range, marked);
}

fn wrap_text_runs(sequence: &mut TokenSequence<'_>, range: Range<usize>, marker: &MarkerPair) {
    let mut start = range.start;
    while start < range.end {
        let is_markup = |index: usize, seq: &TokenSequence<'_>| {
            seq.token(index).is_some_and(|token| token.kind.is_markup())
        };
        if is_markup(start, sequence) {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < range.end && !is_markup(end, sequence) {
            end += 1;
        }
        if sequence.text_len(start..end) > 0 {
            wrap_run(sequence, start..end, marker);
        }
        start = end;
    }
}
