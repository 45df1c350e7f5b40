use std::time::Instant;

use tracing::{Level, debug};

use crate::annotate::annotate;
use crate::diagnostic::{Diagnostic, Side};
use crate::diff::{DiffStats, EditScript, diff_tokens};
use crate::error::DiffError;
use crate::html::HtmlParser;
use crate::markup::MarkupProvider;
use crate::options::DiffOptions;
use crate::sequence::{TokenSequence, reassemble};
use crate::tokenizer::{Granularity, Tokenized, tokenize};

/// The annotated old and new texts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextDiffResult {
    pub old_text: String,
    pub new_text: String,
}

/// Everything a diff invocation produces.
#[derive(Clone, Debug)]
pub struct MarkupDiff {
    pub old_text: String,
    pub new_text: String,
    pub script: EditScript,
    pub stats: DiffStats,
    pub old_tokens: usize,
    pub new_tokens: usize,
    /// Parser and tokenizer warnings for both inputs, tagged with their side.
    pub diagnostics: Vec<Diagnostic>,
}

impl MarkupDiff {
    pub fn into_texts(self) -> TextDiffResult {
        TextDiffResult {
            old_text: self.old_text,
            new_text: self.new_text,
        }
    }
}

/// Diffs two markup strings with default options at the given granularity.
pub fn compute_markup_diff(
    old: &str,
    new: &str,
    granularity: Granularity,
) -> Result<TextDiffResult, DiffError> {
    diff_markup(old, new, &DiffOptions::new(granularity)).map(MarkupDiff::into_texts)
}

/// Diffs two markup strings using the built-in HTML parser.
pub fn diff_markup(old: &str, new: &str, options: &DiffOptions) -> Result<MarkupDiff, DiffError> {
    diff_markup_with(&HtmlParser, old, new, options)
}

/// Diffs two markup strings using a caller-supplied parser.
pub fn diff_markup_with<P>(
    provider: &P,
    old: &str,
    new: &str,
    options: &DiffOptions,
) -> Result<MarkupDiff, DiffError>
where
    P: MarkupProvider + ?Sized,
{
    options.validate()?;
    let start = Instant::now();
    let span = tracing::span!(
        Level::DEBUG,
        "tagdiff.diff",
        granularity = %options.granularity,
        old_len = old.len(),
        new_len = new.len()
    );
    let _guard = span.enter();

    let mut diagnostics = Vec::new();
    let old_tokens = tokenize_side(provider, old, options, Side::Left, &mut diagnostics);
    let new_tokens = tokenize_side(provider, new, options, Side::Right, &mut diagnostics);

    let script = diff_tokens(&old_tokens, &new_tokens)?;
    let stats = script.stats();
    let (old_count, new_count) = (old_tokens.len(), new_tokens.len());

    let mut left = TokenSequence::new(old_tokens);
    let mut right = TokenSequence::new(new_tokens);
    annotate(&mut left, &script, Side::Left, &options.annotate);
    annotate(&mut right, &script, Side::Right, &options.annotate);

    debug!(
        old_tokens = old_count,
        new_tokens = new_count,
        ops = script.ops().len(),
        inserted = stats.inserted,
        deleted = stats.deleted,
        replaced_old = stats.replaced_old,
        replaced_new = stats.replaced_new,
        diagnostics = diagnostics.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "diff_complete"
    );

    Ok(MarkupDiff {
        old_text: reassemble(&left),
        new_text: reassemble(&right),
        script,
        stats,
        old_tokens: old_count,
        new_tokens: new_count,
        diagnostics,
    })
}

fn tokenize_side<'a, P>(
    provider: &P,
    source: &'a str,
    options: &DiffOptions,
    side: Side,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<crate::tokenizer::Token<'a>>
where
    P: MarkupProvider + ?Sized,
{
    let parsed = provider.parse(source);
    let Tokenized {
        tokens,
        diagnostics: token_diagnostics,
    } = tokenize(source, &parsed, options.granularity, &options.tokenize);
    diagnostics.extend(
        parsed
            .diagnostics
            .into_iter()
            .chain(token_diagnostics)
            .map(|diag| diag.on_side(side)),
    );
    tokens
}
