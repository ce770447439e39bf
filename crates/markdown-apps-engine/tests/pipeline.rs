use std::borrow::Cow;
use std::rc::Rc;

use markdown_apps_engine::apps::Registry;
use markdown_apps_engine::parsing::parse_to_tree;
use markdown_apps_engine::render::{DisplayNode, RenderContext, render};
use markdown_apps_engine::transform::transform;
use markdown_apps_engine::tree::{Element, TreeNode};
use markdown_apps_engine::writeback::replace_app_code;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn render_tree(tree: &TreeNode, registry: &Registry) -> DisplayNode {
    render(tree, &RenderContext::new(registry, Rc::new(|_, _| {}))).unwrap()
}

fn applications(text: &str) -> Vec<Element> {
    transform(&parse_to_tree(text), &Registry::builtin())
        .elements()
        .into_iter()
        .filter(|e| e.application_tag().is_some())
        .cloned()
        .collect()
}

#[rstest]
#[case::fixture(fixture("plain"))]
#[case::unregistered_fence("```python\nprint(1)\n```\n".to_string())]
#[case::empty(String::new())]
fn documents_without_applications_render_identically(#[case] text: String) {
    let registry = Registry::builtin();
    let tree = parse_to_tree(&text);

    let transformed = transform(&tree, &registry);

    assert!(matches!(transformed, Cow::Borrowed(_)));
    assert_eq!(
        render_tree(&transformed, &registry),
        render_tree(&tree, &registry)
    );
}

#[test]
fn unregistered_language_renders_as_code() {
    let registry = Registry::builtin();
    let tree = parse_to_tree("```chess\ne4 e5\n```\n");
    let rendered = render_tree(&transform(&tree, &registry), &registry);

    assert!(rendered.components().is_empty());
    let code = rendered.find_all(|e| e.tag == "code");
    assert_eq!(code.len(), 1);
    assert_eq!(code[0].class_tokens(), ["language-chess", "md"]);
    assert_eq!(rendered.text_content(), "e4 e5\n");
}

#[test]
fn fixture_applications_carry_exact_spans() {
    let text = fixture("board");
    let apps = applications(&text);

    assert_eq!(apps.len(), 2);
    let first = apps[0].position.unwrap();
    assert_eq!(
        &text[first.byte_range()],
        "```kanban\n* Todo\n  * Write docs\n  * Review\n* Doing\n  * Parser\n* Done\n```"
    );
    assert_eq!(first.start.line, 5);
    assert_eq!(first.start.column, 1);

    let nested = apps[1].position.unwrap();
    assert_eq!(nested.start.column, 3);
    assert_eq!(nested.end.column, 6);
    assert_eq!(apps[1].first_text(), Some("* Ideas\n  * Drag and drop"));
}

#[rstest]
#[case::first_block(0, "* Todo\n* Done\n  * Write docs")]
#[case::nested_block(1, "* Ideas\n* Later\n  * Drag and drop")]
#[case::emptied(0, "")]
fn writeback_changes_only_the_span(#[case] index: usize, #[case] body: &str) {
    let text = fixture("board");
    let apps = applications(&text);
    let span = apps[index].position.unwrap();

    let updated = replace_app_code(&text, &span, "kanban", body);

    assert_eq!(&updated[..span.start.offset], &text[..span.start.offset]);
    assert!(updated.ends_with(&text[span.end.offset..]));

    let reparsed = applications(&updated);
    assert_eq!(reparsed.len(), apps.len());
    assert_eq!(reparsed[index].first_text(), Some(body));
    for (i, (other, original)) in reparsed.iter().zip(&apps).enumerate() {
        if i != index {
            assert_eq!(other.first_text(), original.first_text());
        }
    }
}

#[rstest]
#[case(0)]
#[case(2)]
#[case(3)]
fn closing_fence_indentation_survives_writeback(#[case] indent: usize) {
    let pad = " ".repeat(indent);
    let text = format!("Intro\n\n{pad}```kanban\n{pad}* A\n{pad}```\nOutro\n");
    let span = applications(&text)[0].position.unwrap();

    let updated = replace_app_code(&text, &span, "kanban", "* B");

    let closing = updated.lines().find(|line| line.trim() == "```").unwrap();
    assert_eq!(closing, format!("{pad}```"));
    assert_eq!(applications(&updated)[0].first_text(), Some("* B"));
}
