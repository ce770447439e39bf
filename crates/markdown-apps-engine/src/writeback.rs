//! Splice an application's new body back into the page text.
//!
//! Only the fenced block's span is rewritten: every byte before `span.start.offset` and
//! from `span.end.offset` on is copied unchanged. Body lines are indented like the
//! opening fence (the span's start column); the closing fence keeps the indentation it
//! had, recovered from the span's end column.

use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::tree::Span;

/// Opening and closing fence marker written for application blocks.
pub const FENCE: &str = "```";

/// Return `original` with the block at `span` replaced by a fresh fence around
/// `new_body`.
///
/// ```
/// use markdown_apps_engine::parsing::parse_to_tree;
/// use markdown_apps_engine::writeback::replace_app_code;
///
/// let text = "Intro\n\n```kanban\n* Todo\n```\n\nOutro\n";
/// let tree = parse_to_tree(text);
/// let pre = tree.elements().into_iter().find(|e| e.tag_name == "pre").unwrap();
///
/// let updated = replace_app_code(text, &pre.position.unwrap(), "kanban", "* Todo\n* Done");
/// assert_eq!(updated, "Intro\n\n```kanban\n* Todo\n* Done\n```\n\nOutro\n");
/// ```
pub fn replace_app_code(original: &str, span: &Span, language_tag: &str, new_body: &str) -> String {
    compile_writeback(original, span, language_tag, new_body)
        .apply(&Rope::from(original))
        .to_string()
}

/// The writeback as a delta over `original`, for callers that keep the text in a rope.
pub fn compile_writeback(
    original: &str,
    span: &Span,
    language_tag: &str,
    new_body: &str,
) -> Delta<RopeInfo> {
    let range = edit_range(original, span);
    let indent = body_indent(span);
    let closing = if ends_with_closing_fence(&original[range.clone()]) {
        closing_indent(span)
    } else {
        indent
    };
    let block = fenced_block(language_tag, new_body, indent, closing);

    let mut builder = Builder::new(original.len());
    builder.replace(range, Rope::from(block));
    builder.build()
}

/// Columns before the opening fence. Containers and the fence itself strip this much
/// from every body line, so the new body is indented by the same amount.
pub fn body_indent(span: &Span) -> usize {
    span.start.column.saturating_sub(1)
}

/// Spaces before the closing fence: the end column sits just past the marker.
pub fn closing_indent(span: &Span) -> usize {
    span.end.column.saturating_sub(1 + FENCE.len())
}

/// Whether the block's last line is a closing fence; a block left open at the end of
/// the text ends in a body line instead.
fn ends_with_closing_fence(block: &str) -> bool {
    let Some((_, last)) = block.trim_end().rsplit_once('\n') else {
        return false;
    };
    let marker = last.trim_start();
    marker.len() >= FENCE.len()
        && (marker.chars().all(|c| c == '`') || marker.chars().all(|c| c == '~'))
}

/// A complete fenced block, without the indentation of its opening line (that lies
/// before the span and is kept as is).
///
/// Non-empty body lines get `indent` spaces; the closing fence gets `closing`.
pub fn fenced_block(language_tag: &str, body: &str, indent: usize, closing: usize) -> String {
    let padding = " ".repeat(indent);
    let body = if indent == 0 {
        body.to_string()
    } else {
        body.split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{padding}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let closing = " ".repeat(closing);
    format!("{FENCE}{language_tag}\n{body}\n{closing}{FENCE}")
}

/// The span's byte range clamped to `text` and to character boundaries.
fn edit_range(text: &str, span: &Span) -> Range<usize> {
    let floor = |mut offset: usize| {
        offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    };
    let start = floor(span.start.offset);
    let end = floor(span.end.offset).max(start);
    if start != span.start.offset || end != span.end.offset {
        log::warn!(
            "Writeback span {}..{} does not fit the text ({} bytes); clamped to {start}..{end}",
            span.start.offset,
            span.end.offset,
            text.len()
        );
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::Registry;
    use crate::parsing::parse_to_tree;
    use crate::transform::transform;
    use crate::tree::{Element, Point, Position};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn applications(text: &str) -> Vec<Element> {
        let tree = parse_to_tree(text);
        transform(&tree, &Registry::builtin())
            .elements()
            .into_iter()
            .filter(|e| e.application_tag().is_some())
            .cloned()
            .collect()
    }

    fn only_span(text: &str) -> Span {
        let apps = applications(text);
        assert_eq!(apps.len(), 1, "expected one application in {text:?}");
        apps[0].position.expect("application span")
    }

    #[test]
    fn replaces_only_the_block() {
        let text = "# Page\n\nBefore.\n\n```kanban\n* Todo\n```\n\nAfter.\n";
        let span = only_span(text);

        let updated = replace_app_code(text, &span, "kanban", "* Todo\n  * a\n* Done");

        assert_eq!(
            updated,
            "# Page\n\nBefore.\n\n```kanban\n* Todo\n  * a\n* Done\n```\n\nAfter.\n"
        );
        assert_eq!(&updated[..span.start.offset], &text[..span.start.offset]);
        assert!(updated.ends_with(&text[span.end.offset..]));
    }

    #[test]
    fn rewritten_block_parses_back_to_new_body() {
        let text = "Intro\n\n```kanban\n* A\n```\n\n```kanban\n* B\n```\n";
        let second = applications(text)[1].position.unwrap();

        let updated = replace_app_code(text, &second, "kanban", "* B\n  * moved");
        let apps = applications(&updated);

        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].first_text(), Some("* A"));
        assert_eq!(apps[1].first_text(), Some("* B\n  * moved"));
    }

    #[rstest]
    #[case::flush(0)]
    #[case::one(1)]
    #[case::three(3)]
    fn closing_fence_keeps_indentation(#[case] indent: usize) {
        let pad = " ".repeat(indent);
        let text = format!("{pad}```kanban\n{pad}* A\n{pad}```\n");
        let span = only_span(&text);
        assert_eq!(closing_indent(&span), indent);

        let updated = replace_app_code(&text, &span, "kanban", "* A\n* B");
        assert_eq!(updated, format!("{pad}```kanban\n{pad}* A\n{pad}* B\n{pad}```\n"));
    }

    #[test]
    fn block_inside_list_item_round_trips() {
        let text = "- Board:\n\n  ```kanban\n  * A\n  ```\n- Next\n";
        let span = only_span(text);

        let updated = replace_app_code(text, &span, "kanban", "* A\n  * x");

        assert_eq!(
            updated,
            "- Board:\n\n  ```kanban\n  * A\n    * x\n  ```\n- Next\n"
        );
        assert_eq!(applications(&updated)[0].first_text(), Some("* A\n  * x"));
    }

    #[test]
    fn empty_body_keeps_block_recognisable() {
        let text = "```kanban\n* A\n```\n";
        let updated = replace_app_code(text, &only_span(text), "kanban", "");
        assert_eq!(updated, "```kanban\n\n```\n");
        assert_eq!(applications(&updated)[0].first_text(), Some(""));
    }

    #[test]
    fn block_at_end_of_text_without_newline() {
        let text = "```kanban\n* A\n```";
        let updated = replace_app_code(text, &only_span(text), "kanban", "* Z");
        assert_eq!(updated, "```kanban\n* Z\n```");
    }

    #[test]
    fn out_of_range_span_is_clamped() {
        let span = Position::new(Point::new(1, 1, 2), Point::new(9, 4, 500));
        let updated = replace_app_code("ab", &span, "kanban", "* A");
        assert_eq!(updated, "ab```kanban\n* A\n```");
    }

    #[test]
    fn span_inside_multibyte_character_is_clamped() {
        let span = Position::new(Point::new(1, 1, 1), Point::new(1, 4, 1));
        let updated = replace_app_code("é", &span, "kanban", "");
        assert_eq!(updated, "```kanban\n\n```é");
    }

    #[test]
    fn fenced_block_indents_body_lines() {
        assert_eq!(fenced_block("kanban", "a\n\nb", 2, 2), "```kanban\n  a\n\n  b\n  ```");
        assert_eq!(fenced_block("kanban", "a\n\nb", 0, 0), "```kanban\na\n\nb\n```");
        assert_eq!(fenced_block("kanban", "a", 0, 2), "```kanban\na\n  ```");
    }

    #[test]
    fn closing_fence_deeper_than_opening_leaves_body_flush() {
        let text = "```kanban\n* A\n  * x\n  ```\n";
        let span = only_span(text);
        assert_eq!(body_indent(&span), 0);
        assert_eq!(closing_indent(&span), 2);

        let updated = replace_app_code(text, &span, "kanban", "* A\n  * x\n  * y");

        assert_eq!(updated, "```kanban\n* A\n  * x\n  * y\n  ```\n");
        assert_eq!(applications(&updated)[0].first_text(), Some("* A\n  * x\n  * y"));
    }

    #[test]
    fn unclosed_block_at_end_of_text_gets_closed() {
        let text = "Intro\n\n```kanban\n* Todo";
        let span = only_span(text);

        let updated = replace_app_code(text, &span, "kanban", "* Todo\n  * a");

        assert_eq!(updated, "Intro\n\n```kanban\n* Todo\n  * a\n```");
        assert_eq!(applications(&updated)[0].first_text(), Some("* Todo\n  * a"));
    }

    #[rstest]
    #[case::closed("```kanban\n* A\n```", true)]
    #[case::indented_tildes("  ~~~kanban\n* A\n  ~~~~", true)]
    #[case::unclosed("```kanban\n* A", false)]
    #[case::body_with_backticks("```kanban\n* `x`", false)]
    #[case::opening_only("```kanban", false)]
    fn detects_closing_fence(#[case] block: &str, #[case] closed: bool) {
        assert_eq!(ends_with_closing_fence(block), closed);
    }
}
