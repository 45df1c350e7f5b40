use tagdiff_core::{
    ChangeStyle, DiffOptions, EditKind, Granularity, MarkerPair, MarkerSet, WrapMode,
    compute_markup_diff, diff_markup,
};

const GRANULARITIES: [Granularity; 3] = [
    Granularity::ByWord,
    Granularity::ByLine,
    Granularity::BySentence,
];

fn has_marker(text: &str) -> bool {
    text.contains("diff_add") || text.contains("diff_del") || text.contains("diff_modify")
}

#[test]
fn changed_paragraph_text_is_marked_inside_untouched_tags() -> Result<(), Box<dyn std::error::Error>>
{
    let result = compute_markup_diff("<p>A</p>", "<p>B</p>", Granularity::ByWord)?;
    assert_eq!(result.old_text, "<p><span class=\"diff_modify\">A</span></p>");
    assert_eq!(result.new_text, "<p><span class=\"diff_modify\">B</span></p>");
    Ok(())
}

#[test]
fn split_style_marks_replaced_text_as_deleted_and_inserted()
-> Result<(), Box<dyn std::error::Error>> {
    let options = DiffOptions::default().with_change_style(ChangeStyle::Split);
    let diff = diff_markup("<p>A</p>", "<p>B</p>", &options)?;
    assert_eq!(diff.old_text, "<p><span class=\"diff_del\">A</span></p>");
    assert_eq!(diff.new_text, "<p><span class=\"diff_add\">B</span></p>");
    Ok(())
}

#[test]
fn empty_old_side_marks_everything_new_as_inserted() -> Result<(), Box<dyn std::error::Error>> {
    for granularity in GRANULARITIES {
        let result = compute_markup_diff("", "<p>hi</p>", granularity)?;
        assert_eq!(result.old_text, "", "granularity {}", granularity);
        assert_eq!(
            result.new_text, "<span class=\"diff_add\"><p>hi</p></span>",
            "granularity {}",
            granularity
        );
    }
    Ok(())
}

#[test]
fn empty_new_side_marks_everything_old_as_deleted() -> Result<(), Box<dyn std::error::Error>> {
    let result = compute_markup_diff("<p>hi</p>", "", Granularity::ByWord)?;
    assert_eq!(result.old_text, "<span class=\"diff_del\"><p>hi</p></span>");
    assert_eq!(result.new_text, "");
    Ok(())
}

#[test]
fn plain_identical_text_has_no_markers() -> Result<(), Box<dyn std::error::Error>> {
    for granularity in GRANULARITIES {
        let result = compute_markup_diff("no markup here", "no markup here", granularity)?;
        assert_eq!(result.old_text, "no markup here");
        assert_eq!(result.new_text, "no markup here");
    }
    Ok(())
}

#[test]
fn insertion_into_empty_element_marks_only_the_content() -> Result<(), Box<dyn std::error::Error>>
{
    let diff = diff_markup("<a></a>", "<a>x</a>", &DiffOptions::default())?;
    assert_eq!(diff.old_text, "<a></a>");
    assert_eq!(diff.new_text, "<a><span class=\"diff_add\">x</span></a>");
    assert_eq!(diff.new_text.matches("<a>").count(), 1);
    assert_eq!(diff.new_text.matches("</a>").count(), 1);
    let kinds: Vec<_> = diff.script.ops().iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![EditKind::Equal, EditKind::Insert, EditKind::Equal]);
    Ok(())
}

#[test]
fn both_empty_inputs_produce_empty_outputs() -> Result<(), Box<dyn std::error::Error>> {
    let diff = diff_markup("", "", &DiffOptions::default())?;
    assert_eq!(diff.old_text, "");
    assert_eq!(diff.new_text, "");
    assert!(!diff.stats.has_changes());
    Ok(())
}

#[test]
fn identical_markup_is_reproduced_for_every_granularity() -> Result<(), Box<dyn std::error::Error>>
{
    let source = "<h1 id=\"t\">Title</h1>\n<p>First. Second!<br>\nthird &amp; 中文。</p><!-- note -->";
    for granularity in GRANULARITIES {
        let result = compute_markup_diff(source, source, granularity)?;
        assert_eq!(result.old_text, source);
        assert_eq!(result.new_text, source);
        assert!(!has_marker(&result.old_text));
    }
    Ok(())
}

#[test]
fn line_granularity_marks_whole_lines() -> Result<(), Box<dyn std::error::Error>> {
    let result = compute_markup_diff("a\nb\nc", "a\nB\nc", Granularity::ByLine)?;
    assert_eq!(result.old_text, "a\n<span class=\"diff_modify\">b\n</span>c");
    assert_eq!(result.new_text, "a\n<span class=\"diff_modify\">B\n</span>c");
    Ok(())
}

#[test]
fn sentence_granularity_marks_whole_sentences() -> Result<(), Box<dyn std::error::Error>> {
    let result = compute_markup_diff(
        "<p>One. Two. Three.</p>",
        "<p>One. Deux. Three.</p>",
        Granularity::BySentence,
    )?;
    assert_eq!(
        result.old_text,
        "<p>One.<span class=\"diff_modify\"> Two.</span> Three.</p>"
    );
    assert_eq!(
        result.new_text,
        "<p>One.<span class=\"diff_modify\"> Deux.</span> Three.</p>"
    );
    Ok(())
}

#[test]
fn modified_style_uses_the_modify_marker_on_both_sides() -> Result<(), Box<dyn std::error::Error>>
{
    let diff = diff_markup("<p>我们不担心</p>", "<p>我们不火烧</p>", &DiffOptions::default())?;
    assert_eq!(
        diff.old_text,
        "<p>我们不<span class=\"diff_modify\">担心</span></p>"
    );
    assert_eq!(
        diff.new_text,
        "<p>我们不<span class=\"diff_modify\">火烧</span></p>"
    );
    assert_eq!(diff.stats.replaced_old, 2);
    assert_eq!(diff.stats.replaced_new, 2);
    Ok(())
}

#[test]
fn custom_markers_are_used_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let markers = MarkerSet {
        insert: MarkerPair::new("{+", "+}"),
        delete: MarkerPair::new("[-", "-]"),
        replace: MarkerPair::new("(~", "~)"),
    };
    let options = DiffOptions::default().with_markers(markers);
    let diff = diff_markup("ab<b>c</b>", "a<b>c</b>d", &options)?;
    assert_eq!(diff.old_text, "a[-b-]<b>c</b>");
    assert_eq!(diff.new_text, "a<b>c</b>{+d+}");
    Ok(())
}

#[test]
fn text_only_wrapping_keeps_new_elements_outside_markers() -> Result<(), Box<dyn std::error::Error>>
{
    let options = DiffOptions::default().with_wrap_mode(WrapMode::TextOnly);
    let diff = diff_markup("<p>a</p>", "<p>a<em>b</em></p>", &options)?;
    assert_eq!(diff.old_text, "<p>a</p>");
    assert_eq!(
        diff.new_text,
        "<p>a<em><span class=\"diff_add\">b</span></em></p>"
    );
    Ok(())
}

#[test]
fn changed_attributes_mark_the_whole_tag() -> Result<(), Box<dyn std::error::Error>> {
    let diff = diff_markup(
        "<p class=\"a\">x</p>",
        "<p class=\"b\">x</p>",
        &DiffOptions::default(),
    )?;
    assert_eq!(
        diff.old_text,
        "<span class=\"diff_modify\"><p class=\"a\"></span>x</p>"
    );
    assert_eq!(diff.stats.replaced_old, 1);
    Ok(())
}

#[test]
fn entities_change_as_a_unit() -> Result<(), Box<dyn std::error::Error>> {
    let result = compute_markup_diff("a&amp;b", "a&lt;b", Granularity::ByWord)?;
    assert_eq!(result.old_text, "a<span class=\"diff_modify\">&amp;</span>b");
    assert_eq!(result.new_text, "a<span class=\"diff_modify\">&lt;</span>b");
    Ok(())
}

#[test]
fn marks_after_an_entity_are_deleted_with_it() -> Result<(), Box<dyn std::error::Error>> {
    let result = compute_markup_diff("&amp;\u{301}", "", Granularity::ByWord)?;
    assert_eq!(result.old_text, "<span class=\"diff_del\">&amp;\u{301}</span>");
    assert_eq!(result.new_text, "");
    Ok(())
}

#[test]
fn malformed_markup_degrades_with_diagnostics() -> Result<(), Box<dyn std::error::Error>> {
    let diff = diff_markup("<p><b>x</p></i>", "<p><b>y</p></i>", &DiffOptions::default())?;
    assert_eq!(
        diff.old_text,
        "<p><b><span class=\"diff_modify\">x</span></p></i>"
    );
    let codes: Vec<_> = diff.diagnostics.iter().map(|diag| diag.code).collect();
    assert!(codes.contains(&tagdiff_core::W_TAG_UNCLOSED));
    assert!(codes.contains(&tagdiff_core::W_TAG_STRAY));
    Ok(())
}
