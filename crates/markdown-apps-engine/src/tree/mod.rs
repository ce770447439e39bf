//! # Document Tree
//!
//! An HTML-shaped syntax tree (root, elements, text) produced from Markdown by
//! [`crate::parsing`] and consumed by [`crate::transform`] and [`crate::render`].
//!
//! Every node carries the source [`Position`] the parser assigned to it. Positions are
//! copied verbatim through transformation; nodes the pipeline invents carry `None`.

pub mod position;

use std::collections::BTreeMap;

use serde::Serialize;

pub use position::{LineIndex, Point, Position, Span};

/// Tag prefix marking an application node: `app:<language tag>`.
pub const APP_TAG_PREFIX: &str = "app:";

/// Property name holding the class token list.
pub const CLASS_NAME: &str = "className";

/// Class token prefix used on `code` elements to carry a fenced block's language.
pub const LANGUAGE_CLASS_PREFIX: &str = "language-";

pub type Properties = BTreeMap<String, PropValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropValue {
    Str(String),
    Tokens(Vec<String>),
    Bool(bool),
    Int(i64),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TreeNode {
    Root(Root),
    Element(Element),
    Text(Text),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Root {
    pub children: Vec<TreeNode>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag_name: String,
    pub properties: Properties,
    pub children: Vec<TreeNode>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub value: String,
    pub position: Option<Position>,
}

impl TreeNode {
    pub fn text(value: impl Into<String>) -> Self {
        TreeNode::Text(Text {
            value: value.into(),
            position: None,
        })
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            TreeNode::Root(root) => root.position.as_ref(),
            TreeNode::Element(element) => element.position.as_ref(),
            TreeNode::Text(text) => text.position.as_ref(),
        }
    }

    /// Children of a root or element; text nodes have none.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Root(root) => &root.children,
            TreeNode::Element(element) => &element.children,
            TreeNode::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            TreeNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            TreeNode::Text(text) => out.push_str(&text.value),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Every element in the tree in document order, this node included.
    pub fn elements(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_elements(&mut found);
        found
    }

    fn collect_elements<'a>(&'a self, found: &mut Vec<&'a Element>) {
        if let TreeNode::Element(element) = self {
            found.push(element);
        }
        for child in self.children() {
            child.collect_elements(found);
        }
    }
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children: Vec::new(),
            position: None,
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropValue::as_str)
    }

    pub fn class_tokens(&self) -> &[String] {
        match self.properties.get(CLASS_NAME) {
            Some(PropValue::Tokens(tokens)) => tokens,
            _ => &[],
        }
    }

    /// Language tag of a `code` element, taken from its first `language-*` class.
    pub fn code_language(&self) -> Option<&str> {
        if self.tag_name != "code" {
            return None;
        }
        self.class_tokens()
            .first()
            .and_then(|token| token.strip_prefix(LANGUAGE_CLASS_PREFIX))
            .filter(|lang| !lang.is_empty())
    }

    /// Language tag of an application node (`app:<tag>`).
    pub fn application_tag(&self) -> Option<&str> {
        self.tag_name.strip_prefix(APP_TAG_PREFIX)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        self.children.iter().map(TreeNode::text_content).collect()
    }

    /// Raw string of the first text child, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            TreeNode::Text(text) => Some(text.value.as_str()),
            _ => None,
        })
    }
}

impl From<Element> for TreeNode {
    fn from(element: Element) -> Self {
        TreeNode::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(lang: &str) -> Element {
        Element::new("code").with_property(
            CLASS_NAME,
            PropValue::Tokens(vec![format!("{LANGUAGE_CLASS_PREFIX}{lang}")]),
        )
    }

    #[test]
    fn code_language_from_class_token() {
        assert_eq!(code("kanban").code_language(), Some("kanban"));
    }

    #[test]
    fn code_language_requires_code_tag() {
        let mut pre = code("kanban");
        pre.tag_name = "pre".to_string();
        assert_eq!(pre.code_language(), None);
    }

    #[test]
    fn code_without_class_has_no_language() {
        assert_eq!(Element::new("code").code_language(), None);
    }

    #[test]
    fn application_tag_strips_prefix() {
        assert_eq!(Element::new("app:kanban").application_tag(), Some("kanban"));
        assert_eq!(Element::new("div").application_tag(), None);
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let node = TreeNode::Element(Element::new("p").with_children(vec![
            TreeNode::text("Hello "),
            Element::new("em")
                .with_children(vec![TreeNode::text("world")])
                .into(),
        ]));
        assert_eq!(node.text_content(), "Hello world");
        assert_eq!(node.elements().len(), 2);
        assert_eq!(node.as_element().unwrap().text_content(), "Hello world");
    }
}
