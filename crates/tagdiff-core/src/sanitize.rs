use ammonia::Builder;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "code", "dd", "del", "div", "dl", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "mark", "ol", "p",
    "pre", "s", "small", "span", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "u", "ul",
];

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = [
        ("a", &["href"][..]),
        ("img", &["alt", "src", "width", "height"][..]),
        ("ol", &["start"][..]),
        ("td", &["colspan", "rowspan"][..]),
        ("th", &["colspan", "rowspan", "scope"][..]),
    ]
    .into_iter()
    .map(|(tag, attrs)| (tag, attrs.iter().copied().collect()))
    .collect();

    let mut builder = Builder::new();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .generic_attributes(["class", "id", "title"].into_iter().collect())
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(["data-"].into_iter().collect());
    builder
});

/// Cleans annotated HTML with an allow-list that keeps common document
/// markup and the `class` attributes carried by diff markers.
pub fn sanitize_annotated(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}
