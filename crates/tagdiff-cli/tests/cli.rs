use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_tagdiff-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_tagdiff_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("tagdiff-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "tagdiff_cli_{}_{}_{}.html",
        name,
        now.as_secs(),
        now.subsec_nanos()
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(bin_path())
        .args(args)
        .env_remove("TAGDIFF_LOG")
        .output()
        .expect("run")
}

#[test]
fn render_wraps_both_sides_in_a_page() {
    let old = temp_file("page_old", "<p>A</p>");
    let new = temp_file("page_new", "<p>B</p>");
    let output = run(&[old.to_str().expect("path"), new.to_str().expect("path")]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<!DOCTYPE html>"), "expected HTML wrapper");
    assert!(stdout.contains("<style>"), "expected inline CSS");
    assert!(stdout.contains("<p><span class=\"diff_modify\">A</span></p>"));
    assert!(stdout.contains("<p><span class=\"diff_modify\">B</span></p>"));
}

#[test]
fn split_style_marks_old_as_deleted_and_new_as_added() {
    let old = temp_file("split_old", "<p>A</p>");
    let new = temp_file("split_new", "<p>B</p>");
    let output = run(&[
        "--raw",
        "--style",
        "split",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "<p><span class=\"diff_del\">A</span></p>",
            "<p><span class=\"diff_add\">B</span></p>",
        ]
    );
}

#[test]
fn raw_prints_both_fragments() {
    let old = temp_file("raw_old", "<a></a>");
    let new = temp_file("raw_new", "<a>x</a>");
    let output = run(&["--raw", old.to_str().expect("path"), new.to_str().expect("path")]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("<!DOCTYPE html>"), "expected raw HTML");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["<a></a>", "<a><span class=\"diff_add\">x</span></a>"]
    );
}

#[test]
fn json_report_carries_stats_and_ops() {
    let old = temp_file("json_old", "one\ntwo\n");
    let new = temp_file("json_new", "one\n2\n");
    let output = run(&[
        "--format",
        "json",
        "--granularity",
        "line",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(
        report["oldHtml"],
        "one\n<span class=\"diff_modify\">two\n</span>"
    );
    assert_eq!(report["stats"]["replacedOld"], 1);
    assert_eq!(report["ops"][1]["kind"], "replace");
}

#[test]
fn diagnostics_json_reports_warnings_on_stderr() {
    let old = temp_file("diag_old", "<p><b>x</p>");
    let new = temp_file("diag_new", "<p>x</p>");
    let output = run(&[
        "--diagnostics",
        "json",
        "--raw",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "warnings keep a success exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let diagnostics: serde_json::Value = serde_json::from_str(stderr.trim()).expect("JSON");
    assert_eq!(diagnostics[0]["code"], "W_TAG_UNCLOSED");
    assert_eq!(diagnostics[0]["side"], "old");
}

#[test]
fn diagnostics_pretty_prefixes_the_side() {
    let old = temp_file("pretty_old", "x");
    let new = temp_file("pretty_new", "</q>x");
    let output = run(&[
        "--diagnostics",
        "pretty",
        "--raw",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("new:1:1 warning W_TAG_STRAY"),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn sanitized_output_drops_scripts() {
    let old = temp_file("sani_old", "<p>a</p>");
    let new = temp_file("sani_new", "<p>a<script>alert(1)</script></p>");
    let output = run(&[
        "--sanitized",
        "--raw",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("<script>"), "expected scripts removed");
}

#[test]
fn reads_one_side_from_stdin() {
    let new = temp_file("stdin_new", "b");
    let mut child = Command::new(bin_path())
        .args(["--raw", "-", new.to_str().expect("path")])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"a")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<span class=\"diff_modify\">a</span>\n"));
}

#[test]
fn missing_file_fails_with_exit_code_one() {
    let new = temp_file("missing_new", "b");
    let output = run(&["/definitely/not/here.html", new.to_str().expect("path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "unexpected stderr: {}", stderr);
}

#[test]
fn unknown_granularity_is_a_usage_error() {
    let old = temp_file("usage_old", "a");
    let new = temp_file("usage_new", "b");
    let output = run(&[
        "--granularity",
        "paragraph",
        old.to_str().expect("path"),
        new.to_str().expect("path"),
    ]);
    assert_eq!(output.status.code(), Some(2));
}
