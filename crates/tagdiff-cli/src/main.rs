use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tagdiff_core::{
    ChangeStyle, Diagnostic, DiagnosticSeverity, DiffError, DiffOptions, EditOp, Granularity,
    MarkupDiff, WrapMode, diff_markup, sanitize_annotated,
};
use tagdiff_renderer::{PageLabels, Renderer, Theme};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TAGDIFF_LOG";

/// Shows what changed between two versions of an HTML fragment.
#[derive(Parser, Debug)]
#[command(name = "tagdiff-cli", version, about)]
struct Cli {
    /// Size of the units being compared
    #[arg(long, value_enum, default_value_t = GranularityArg::Word)]
    granularity: GranularityArg,

    /// How replaced text is marked
    #[arg(long, value_enum, default_value_t = StyleArg::Modified)]
    style: StyleArg,

    /// Whether markers may enclose tags
    #[arg(long, value_enum, default_value_t = WrapArg::Whole)]
    wrap: WrapArg,

    /// Clean both outputs with the HTML allow-list
    #[arg(long)]
    sanitized: bool,

    /// Print the two annotated fragments instead of a full page
    #[arg(long)]
    raw: bool,

    #[arg(long, value_enum, default_value_t = ThemeArg::Auto)]
    theme: ThemeArg,

    #[arg(long, value_enum, default_value_t = FormatArg::Html)]
    format: FormatArg,

    /// Report parser warnings on stderr
    #[arg(long, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Old version (`-` reads stdin)
    old: PathBuf,

    /// New version (`-` reads stdin)
    new: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GranularityArg {
    Word,
    Line,
    Sentence,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Modified,
    Split,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WrapArg {
    Whole,
    TextOnly,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Html,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("only one input can be read from stdin")]
    StdinTwice,
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(&cli) {
        eprintln!("tagdiff-cli: {}", err);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.old.as_os_str() == "-" && cli.new.as_os_str() == "-" {
        return Err(CliError::StdinTwice);
    }
    let old = read_input(&cli.old)?;
    let new = read_input(&cli.new)?;
    let options = options_from(cli);
    debug!(
        granularity = %options.granularity,
        old = %cli.old.display(),
        new = %cli.new.display(),
        "running diff"
    );

    let mut diff = diff_markup(&old, &new, &options)?;
    if cli.sanitized {
        diff.old_text = sanitize_annotated(&diff.old_text);
        diff.new_text = sanitize_annotated(&diff.new_text);
    }

    if let Some(mode) = cli.diagnostics {
        emit_diagnostics(&diff.diagnostics, mode)?;
    }

    match cli.format {
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&Report::from(&diff))?),
        FormatArg::Html if cli.raw => {
            println!("{}", diff.old_text);
            println!("{}", diff.new_text);
        }
        FormatArg::Html => {
            let renderer = Renderer::new(theme_from(cli.theme));
            let labels = PageLabels {
                title: format!("{} → {}", cli.old.display(), cli.new.display()),
                old: cli.old.display().to_string(),
                new: cli.new.display().to_string(),
                summary: Some(summary(&diff, options.granularity)),
            };
            print!("{}", renderer.embed_diff(&diff.old_text, &diff.new_text, &labels));
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| CliError::Read {
                path: "stdin".to_string(),
                source,
            })?;
        return Ok(buffer);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn options_from(cli: &Cli) -> DiffOptions {
    let granularity = match cli.granularity {
        GranularityArg::Word => Granularity::ByWord,
        GranularityArg::Line => Granularity::ByLine,
        GranularityArg::Sentence => Granularity::BySentence,
    };
    let style = match cli.style {
        StyleArg::Split => ChangeStyle::Split,
        StyleArg::Modified => ChangeStyle::Modified,
    };
    let wrap = match cli.wrap {
        WrapArg::Whole => WrapMode::Whole,
        WrapArg::TextOnly => WrapMode::TextOnly,
    };
    DiffOptions::new(granularity)
        .with_change_style(style)
        .with_wrap_mode(wrap)
}

fn theme_from(theme: ThemeArg) -> Theme {
    match theme {
        ThemeArg::Auto => Theme::Auto,
        ThemeArg::Light => Theme::Light,
        ThemeArg::Dark => Theme::Dark,
    }
}

fn summary(diff: &MarkupDiff, granularity: Granularity) -> String {
    let stats = diff.stats;
    if !stats.has_changes() {
        return "No changes".to_string();
    }
    format!(
        "{} inserted, {} deleted, {} replaced by {} ({} tokens)",
        stats.inserted, stats.deleted, stats.replaced_old, stats.replaced_new, granularity
    )
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) -> Result<(), CliError> {
    match mode {
        DiagnosticsMode::Json => {
            let reports: Vec<DiagnosticReport> = diagnostics.iter().map(Into::into).collect();
            eprintln!("{}", serde_json::to_string_pretty(&reports)?);
        }
        DiagnosticsMode::Pretty => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic_to_pretty(diagnostic));
            }
        }
    }
    Ok(())
}

fn diagnostic_to_pretty(diagnostic: &Diagnostic) -> String {
    let side = diagnostic.side.map(|side| side.label()).unwrap_or("input");
    format!(
        "{}:{}:{} {} {} {}",
        side,
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        severity_label(diagnostic.severity),
        diagnostic.code,
        diagnostic.message
    )
}

fn severity_label(severity: DiagnosticSeverity) -> &'static str {
    match severity {
        DiagnosticSeverity::Error => "error",
        DiagnosticSeverity::Warning => "warning",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    old_html: &'a str,
    new_html: &'a str,
    stats: StatsReport,
    ops: Vec<OpReport>,
    diagnostics: Vec<DiagnosticReport<'a>>,
}

impl<'a> From<&'a MarkupDiff> for Report<'a> {
    fn from(diff: &'a MarkupDiff) -> Self {
        Self {
            old_html: &diff.old_text,
            new_html: &diff.new_text,
            stats: StatsReport {
                old_tokens: diff.old_tokens,
                new_tokens: diff.new_tokens,
                equal: diff.stats.equal,
                inserted: diff.stats.inserted,
                deleted: diff.stats.deleted,
                replaced_old: diff.stats.replaced_old,
                replaced_new: diff.stats.replaced_new,
            },
            ops: diff.script.ops().iter().map(OpReport::from).collect(),
            diagnostics: diff.diagnostics.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    old_tokens: usize,
    new_tokens: usize,
    equal: usize,
    inserted: usize,
    deleted: usize,
    replaced_old: usize,
    replaced_new: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OpReport {
    kind: &'static str,
    old_index: usize,
    old_len: usize,
    new_index: usize,
    new_len: usize,
}

impl From<&EditOp> for OpReport {
    fn from(op: &EditOp) -> Self {
        Self {
            kind: op.kind.name(),
            old_index: op.old_index,
            old_len: op.old_len,
            new_index: op.new_index,
            new_len: op.new_len,
        }
    }
}

#[derive(Serialize)]
struct DiagnosticReport<'a> {
    code: &'static str,
    severity: &'static str,
    side: Option<&'static str>,
    message: &'a str,
    range: RangeReport,
}

#[derive(Serialize)]
struct RangeReport {
    start: PositionReport,
    end: PositionReport,
}

#[derive(Serialize)]
struct PositionReport {
    line: usize,
    character: usize,
}

impl<'a> From<&'a Diagnostic> for DiagnosticReport<'a> {
    fn from(diag: &'a Diagnostic) -> Self {
        Self {
            code: diag.code,
            severity: severity_label(diag.severity),
            side: diag.side.map(|side| side.label()),
            message: &diag.message,
            range: RangeReport {
                start: PositionReport {
                    line: diag.range.start.line,
                    character: diag.range.start.character,
                },
                end: PositionReport {
                    line: diag.range.end.line,
                    character: diag.range.end.character,
                },
            },
        }
    }
}
