use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

const BASE_CSS: &str = include_str!("../assets/tagdiff.css");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

/// Text shown around the two panes. Labels are escaped before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    pub title: String,
    pub old: String,
    pub new: String,
    /// One line above the panes, e.g. change counts.
    pub summary: Option<String>,
}

impl Default for PageLabels {
    fn default() -> Self {
        Self {
            title: "Changes".to_string(),
            old: "Old".to_string(),
            new: "New".to_string(),
            summary: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, true));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent_root_block(&dark_vars));
                out.push_str("}\n");
            }
            Theme::Light => out.push_str(&root_block(&light_vars, true)),
            Theme::Dark => out.push_str(&root_block(&dark_vars, true)),
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, false));
        }

        out.push_str(BASE_CSS);
        out
    }

    /// Builds a standalone page with the two annotated fragments side by side.
    ///
    /// The fragments are inserted as-is; sanitize them first if they come
    /// from untrusted input.
    pub fn embed_diff(&self, old_html: &str, new_html: &str, labels: &PageLabels) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        out.push_str(&format!("  <title>{}</title>\n", escape_html(&labels.title)));
        out.push_str("  <style>\n");
        out.push_str(&self.stylesheet());
        out.push_str("\n  </style>\n");
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str("<main class=\"tagdiff-page\">\n");
        if let Some(summary) = &labels.summary {
            out.push_str(&format!(
                "<p class=\"tagdiff-summary\">{}</p>\n",
                escape_html(summary)
            ));
        }
        push_pane(&mut out, "old", &labels.old, old_html);
        push_pane(&mut out, "new", &labels.new, new_html);
        out.push_str("</main>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("tagdiff.css"), self.stylesheet())?;
        Ok(())
    }
}

fn push_pane(out: &mut String, side: &str, label: &str, body: &str) {
    out.push_str(&format!(
        "<section class=\"tagdiff-pane\" data-side=\"{}\">\n",
        side
    ));
    out.push_str(&format!("<header>{}</header>\n", escape_html(label)));
    out.push_str("<div class=\"tagdiff-body\">\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</div>\n");
    out.push_str("</section>\n");
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--tagdiff-bg".to_string(), "#fbfbf8".to_string()),
        ("--tagdiff-fg".to_string(), "#1f2328".to_string()),
        ("--tagdiff-muted".to_string(), "#5f6b76".to_string()),
        ("--tagdiff-border".to_string(), "#d8dee4".to_string()),
        ("--tagdiff-add-bg".to_string(), "#dafbe1".to_string()),
        ("--tagdiff-add-fg".to_string(), "#116329".to_string()),
        ("--tagdiff-del-bg".to_string(), "#ffebe9".to_string()),
        ("--tagdiff-del-fg".to_string(), "#82071e".to_string()),
        ("--tagdiff-modify-bg".to_string(), "#fff8c5".to_string()),
        ("--tagdiff-modify-fg".to_string(), "#7d4e00".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--tagdiff-bg".to_string(), "#0e1116".to_string()),
        ("--tagdiff-fg".to_string(), "#e6edf3".to_string()),
        ("--tagdiff-muted".to_string(), "#9aa4af".to_string()),
        ("--tagdiff-border".to_string(), "#2a313b".to_string()),
        ("--tagdiff-add-bg".to_string(), "#12361f".to_string()),
        ("--tagdiff-add-fg".to_string(), "#7ee2a8".to_string()),
        ("--tagdiff-del-bg".to_string(), "#42161b".to_string()),
        ("--tagdiff-del-fg".to_string(), "#ffa198".to_string()),
        ("--tagdiff-modify-bg".to_string(), "#3b2e05".to_string()),
        ("--tagdiff-modify-fg".to_string(), "#f2cc60".to_string()),
    ]);

    (light, dark)
}

fn format_vars(vars: &BTreeMap<String, String>, indent: &str) -> String {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str(indent);
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out
}

fn root_block(vars: &BTreeMap<String, String>, include_color_scheme: bool) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if include_color_scheme {
        out.push_str("  color-scheme: light dark;\n");
    }
    out.push_str(&format_vars(vars, "  "));
    out.push_str("}\n");
    out
}

fn indent_root_block(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("  :root {\n");
    out.push_str("    color-scheme: light dark;\n");
    out.push_str(&format_vars(vars, "    "));
    out.push_str("  }\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
