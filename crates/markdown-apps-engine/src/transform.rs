//! Replace fenced blocks of registered applications with application nodes.
//!
//! ```text
//! pre                          app:kanban   (position = span of the whole fence)
//! └── code.language-kanban  →  └── "* Todo\n  * a"
//!     └── "* Todo\n  * a\n"
//! ```
//!
//! The input tree is never mutated. Subtrees without application blocks come back as
//! [`Cow::Borrowed`], so callers can tell by identity that nothing changed.

use std::borrow::Cow;

use crate::apps::Registry;
use crate::tree::{APP_TAG_PREFIX, Element, Root, Text, TreeNode};

pub fn transform<'a>(node: &'a TreeNode, registry: &Registry) -> Cow<'a, TreeNode> {
    match node {
        TreeNode::Text(_) => Cow::Borrowed(node),
        TreeNode::Element(element) => {
            if let Some(app) = application_node(element, registry) {
                return Cow::Owned(app.into());
            }
            match transform_children(&element.children, registry) {
                Some(children) => Cow::Owned(TreeNode::Element(Element {
                    children,
                    ..shallow_clone(element)
                })),
                None => Cow::Borrowed(node),
            }
        }
        TreeNode::Root(root) => match transform_children(&root.children, registry) {
            Some(children) => Cow::Owned(TreeNode::Root(Root {
                children,
                position: root.position,
            })),
            None => Cow::Borrowed(node),
        },
    }
}

/// New children if any child changed, `None` otherwise.
fn transform_children(children: &[TreeNode], registry: &Registry) -> Option<Vec<TreeNode>> {
    let transformed: Vec<Cow<'_, TreeNode>> = children
        .iter()
        .map(|child| transform(child, registry))
        .collect();
    if transformed.iter().all(|child| matches!(child, Cow::Borrowed(_))) {
        return None;
    }
    Some(transformed.into_iter().map(Cow::into_owned).collect())
}

fn shallow_clone(element: &Element) -> Element {
    Element {
        tag_name: element.tag_name.clone(),
        properties: element.properties.clone(),
        children: Vec::new(),
        position: element.position,
    }
}

/// `pre > code.language-<tag>` with `<tag>` registered, as an `app:<tag>` node.
fn application_node(pre: &Element, registry: &Registry) -> Option<Element> {
    if pre.tag_name != "pre" {
        return None;
    }
    let [TreeNode::Element(code)] = pre.children.as_slice() else {
        return None;
    };
    let language = code.code_language()?;
    if !registry.contains(language) {
        log::debug!("Leaving `{language}` block as code: no such application");
        return None;
    }

    let raw = code.text_content();
    let body = raw.strip_suffix('\n').unwrap_or(&raw);
    let text_position = code.children.first().and_then(TreeNode::position).copied();

    Some(Element {
        tag_name: format!("{APP_TAG_PREFIX}{language}"),
        properties: Default::default(),
        children: vec![TreeNode::Text(Text {
            value: body.to_string(),
            position: text_position,
        })],
        position: pre.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::board::LANGUAGE_TAG;
    use crate::parsing::parse_to_tree;
    use pretty_assertions::assert_eq;

    fn app_nodes(tree: &TreeNode) -> Vec<&Element> {
        tree.elements()
            .into_iter()
            .filter(|e| e.application_tag().is_some())
            .collect()
    }

    #[test]
    fn registered_block_becomes_application_node() {
        let text = "# Board\n\n```kanban\n* Todo\n  * a\n```\n";
        let tree = parse_to_tree(text);
        let transformed = transform(&tree, &Registry::builtin());

        let apps = app_nodes(&transformed);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].tag_name, format!("app:{LANGUAGE_TAG}"));
        assert_eq!(apps[0].first_text(), Some("* Todo\n  * a"));

        let span = apps[0].position.expect("application keeps its span");
        assert_eq!(&text[span.byte_range()], "```kanban\n* Todo\n  * a\n```");
    }

    #[test]
    fn unchanged_tree_is_borrowed() {
        let tree = parse_to_tree("# Title\n\n```rust\nfn main() {}\n```\n");
        let transformed = transform(&tree, &Registry::builtin());
        assert!(matches!(transformed, Cow::Borrowed(_)));
        assert!(std::ptr::eq(transformed.as_ref(), &tree));
    }

    #[test]
    fn untouched_siblings_keep_their_content() {
        let tree = parse_to_tree("Intro *here*\n\n```kanban\n* A\n```\n\nOutro\n");
        let transformed = transform(&tree, &Registry::builtin());

        assert!(matches!(transformed, Cow::Owned(_)));
        assert_eq!(transformed.children()[0], tree.children()[0]);
        assert_eq!(transformed.children()[2], tree.children()[2]);
    }

    #[test]
    fn block_without_language_passes_through() {
        let tree = parse_to_tree("```\n* A\n```\n");
        let transformed = transform(&tree, &Registry::builtin());
        assert!(app_nodes(&transformed).is_empty());
        assert_eq!(transformed.as_ref(), &tree);
    }

    #[test]
    fn empty_application_block_has_empty_body() {
        let tree = parse_to_tree("```kanban\n```\n");
        let transformed = transform(&tree, &Registry::builtin());
        let apps = app_nodes(&transformed);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].first_text(), Some(""));
    }

    #[test]
    fn empty_registry_transforms_nothing() {
        let tree = parse_to_tree("```kanban\n* A\n```\n");
        let transformed = transform(&tree, &Registry::new());
        assert!(matches!(transformed, Cow::Borrowed(_)));
    }

    #[test]
    fn nested_blocks_are_found() {
        let tree = parse_to_tree("- Board:\n\n  ```kanban\n  * A\n  ```\n");
        let transformed = transform(&tree, &Registry::builtin());
        let apps = app_nodes(&transformed);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].first_text(), Some("* A"));
    }
}
