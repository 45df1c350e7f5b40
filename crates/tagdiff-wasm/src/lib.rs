use serde::{Deserialize, Serialize};
use tagdiff_core::{
    ChangeStyle, DiagnosticSeverity, DiffOptions, Granularity, MarkerPair, MarkerSet, MarkupDiff,
    WrapMode,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffHtmlOptions {
    granularity: Option<String>,
    change_style: Option<String>,
    wrap_mode: Option<String>,
    /// Sentence terminators, one per character.
    terminators: Option<String>,
    markers: Option<JsMarkers>,
    sanitized: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct JsMarkers {
    insert: Option<JsMarkerPair>,
    delete: Option<JsMarkerPair>,
    replace: Option<JsMarkerPair>,
}

#[derive(Debug, Deserialize)]
struct JsMarkerPair {
    begin: String,
    end: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffHtmlResult {
    old_html: String,
    new_html: String,
    stats: JsStats,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsStats {
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
struct JsDiagnostic {
    code: String,
    message: String,
    severity: String,
    side: Option<String>,
    range: JsRange,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

#[wasm_bindgen]
pub fn diff_html(old: &str, new: &str) -> Result<JsValue, JsValue> {
    diff_html_with_options(old, new, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn diff_html_with_options(old: &str, new: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let parsed = options_from_js(options)?;
    let result = run_diff(old, new, parsed).map_err(|err| JsValue::from_str(&err))?;
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<DiffHtmlOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(DiffHtmlOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn run_diff(old: &str, new: &str, parsed: DiffHtmlOptions) -> Result<DiffHtmlResult, String> {
    let sanitized = parsed.sanitized.unwrap_or(false);
    let options = diff_options(parsed)?;
    let mut diff = tagdiff_core::diff_markup(old, new, &options).map_err(|err| err.to_string())?;
    if sanitized {
        diff.old_text = tagdiff_core::sanitize_annotated(&diff.old_text);
        diff.new_text = tagdiff_core::sanitize_annotated(&diff.new_text);
    }
    Ok(result_from(diff))
}

fn diff_options(parsed: DiffHtmlOptions) -> Result<DiffOptions, String> {
    let mut out = DiffOptions::default();
    if let Some(granularity) = parsed.granularity {
        out = out.with_granularity(granularity.parse::<Granularity>()?);
    }
    if let Some(style) = parsed.change_style {
        let style = match style.as_str() {
            "split" => ChangeStyle::Split,
            "modified" => ChangeStyle::Modified,
            other => return Err(format!("unknown changeStyle `{}`", other)),
        };
        out = out.with_change_style(style);
    }
    if let Some(wrap) = parsed.wrap_mode {
        let wrap = match wrap.as_str() {
            "whole" => WrapMode::Whole,
            "textOnly" | "text-only" => WrapMode::TextOnly,
            other => return Err(format!("unknown wrapMode `{}`", other)),
        };
        out = out.with_wrap_mode(wrap);
    }
    if let Some(terminators) = parsed.terminators {
        out = out.with_terminators(terminators.chars());
    }
    if let Some(markers) = parsed.markers {
        let mut set = MarkerSet::default();
        let pairs = [
            (markers.insert, &mut set.insert),
            (markers.delete, &mut set.delete),
            (markers.replace, &mut set.replace),
        ];
        for (pair, slot) in pairs {
            if let Some(pair) = pair {
                *slot = MarkerPair::new(pair.begin, pair.end);
            }
        }
        out = out.with_markers(set);
    }
    Ok(out)
}

fn result_from(diff: MarkupDiff) -> DiffHtmlResult {
    let stats = JsStats {
        old_tokens: diff.old_tokens,
        new_tokens: diff.new_tokens,
        equal: diff.stats.equal,
        inserted: diff.stats.inserted,
        deleted: diff.stats.deleted,
        replaced_old: diff.stats.replaced_old,
        replaced_new: diff.stats.replaced_new,
    };
    let diagnostics = diff
        .diagnostics
        .into_iter()
        .map(|diag| JsDiagnostic {
            code: diag.code.to_string(),
            message: diag.message,
            severity: match diag.severity {
                DiagnosticSeverity::Error => "error".to_string(),
                DiagnosticSeverity::Warning => "warning".to_string(),
            },
            side: diag.side.map(|side| side.label().to_string()),
            range: JsRange {
                start_line: diag.range.start.line,
                start_col: diag.range.start.character,
                end_line: diag.range.end.line,
                end_col: diag.range.end.character,
            },
        })
        .collect();
    DiffHtmlResult {
        old_html: diff.old_text,
        new_html: diff.new_text,
        stats,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_core_defaults() {
        let options = diff_options(DiffHtmlOptions::default()).expect("options");
        assert_eq!(options, DiffOptions::default());
    }

    #[test]
    fn options_map_onto_core_options() {
        let parsed = DiffHtmlOptions {
            granularity: Some("line".to_string()),
            change_style: Some("split".to_string()),
            wrap_mode: Some("textOnly".to_string()),
            markers: Some(JsMarkers {
                insert: Some(JsMarkerPair {
                    begin: "{+".to_string(),
                    end: "+}".to_string(),
                }),
                ..JsMarkers::default()
            }),
            ..DiffHtmlOptions::default()
        };
        let options = diff_options(parsed).expect("options");
        assert_eq!(options.granularity, Granularity::ByLine);
        assert_eq!(options.annotate.change_style, ChangeStyle::Split);
        assert_eq!(options.annotate.wrap_mode, WrapMode::TextOnly);
        assert_eq!(options.annotate.markers.insert, MarkerPair::new("{+", "+}"));
        assert_eq!(
            options.annotate.markers.delete,
            MarkerSet::default().delete
        );
    }

    #[test]
    fn unknown_values_are_reported() {
        let parsed = DiffHtmlOptions {
            change_style: Some("sideways".to_string()),
            ..DiffHtmlOptions::default()
        };
        assert!(diff_options(parsed).is_err());
    }

    #[test]
    fn run_diff_reports_stats_and_sides() {
        let result =
            run_diff("<p>x<b></p>", "<p>y<b></p>", DiffHtmlOptions::default()).expect("diff");
        assert_eq!(result.old_html, "<p><span class=\"diff_modify\">x</span><b></p>");
        assert_eq!(result.new_html, "<p><span class=\"diff_modify\">y</span><b></p>");
        assert_eq!(result.stats.replaced_old, 1);
        let sides: Vec<_> = result
            .diagnostics
            .iter()
            .map(|diag| diag.side.as_deref())
            .collect();
        assert_eq!(sides, vec![Some("old"), Some("new")]);
    }

    #[test]
    fn empty_terminators_fail_in_sentence_mode() {
        let parsed = DiffHtmlOptions {
            granularity: Some("sentence".to_string()),
            terminators: Some(String::new()),
            ..DiffHtmlOptions::default()
        };
        assert!(run_diff("a", "b", parsed).is_err());
    }
}
