//! Markdown parsing into the positioned document tree.
//!
//! This is the tree primitive the rest of the pipeline builds on: a thin adapter over
//! `pulldown-cmark` offset events that produces HTML-shaped [`TreeNode`]s, each carrying
//! the line/column/offset range it was parsed from.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::tree::{
    CLASS_NAME, Element, LANGUAGE_CLASS_PREFIX, LineIndex, Position, PropValue, Root, Text,
    TreeNode,
};

/// Parse Markdown text into a root [`TreeNode`].
///
/// The root spans the whole text. Fenced code blocks become `pre > code` with a
/// `language-<tag>` class on the `code` element when the info string names a language;
/// the `pre` position covers exactly the fence lines (see [`fence_range`]).
pub fn parse_to_tree(text: &str) -> TreeNode {
    let index = LineIndex::new(text);
    let mut builder = TreeBuilder::new(text, &index);

    for (event, range) in Parser::new_ext(text, options()).into_offset_iter() {
        builder.process_event(event, range);
    }

    builder.finish()
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Narrow a fenced code block's event range to the fence itself: leading indentation
/// is skipped so the range starts at the first fence character, and the trailing line
/// ending (plus any whitespace after the closing marker) is dropped so the range ends
/// just past the closing fence.
pub fn fence_range(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let end_bound = range.end.min(bytes.len());

    let mut start = range.start.min(end_bound);
    while start < end_bound && matches!(bytes[start], b' ' | b'\t') {
        start += 1;
    }

    let mut end = end_bound;
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }

    start..end
}

/// An open node on the builder stack.
enum Frame {
    Open(Element),
    /// Raw HTML and metadata: the content is dropped.
    Skip,
    /// Constructs without an element of their own: children move to the parent.
    Hoist(Vec<TreeNode>),
}

/// Turns the flat pulldown-cmark event stream into a nested tree.
///
/// Every `Start` pushes one or more frames and records how many, so the matching `End`
/// pops exactly those. Fenced code (`pre` + `code`) and table heads (`thead` + `tr`)
/// push two frames for one event.
struct TreeBuilder<'t, 'i> {
    text: &'t str,
    index: &'i LineIndex<'t>,
    root_children: Vec<TreeNode>,
    stack: Vec<Frame>,
    closers: Vec<usize>,
    in_table_head: bool,
}

impl<'t, 'i> TreeBuilder<'t, 'i> {
    fn new(text: &'t str, index: &'i LineIndex<'t>) -> Self {
        Self {
            text,
            index,
            root_children: Vec::new(),
            stack: Vec::new(),
            closers: Vec::new(),
            in_table_head: false,
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag_end) => {
                if matches!(tag_end, TagEnd::TableHead) {
                    self.in_table_head = false;
                }
                self.close();
            }
            Event::Text(text) => {
                let position = self.position(range);
                self.append(TreeNode::Text(Text {
                    value: text.into_string(),
                    position,
                }));
            }
            Event::Code(code) => {
                let element = Element::new("code")
                    .with_children(vec![TreeNode::text(code.into_string())])
                    .with_position(self.position(range));
                self.append(element.into());
            }
            Event::SoftBreak => {
                let position = self.position(range);
                self.append(TreeNode::Text(Text {
                    value: "\n".to_string(),
                    position,
                }));
            }
            Event::HardBreak => {
                let element = Element::new("br").with_position(self.position(range));
                self.append(element.into());
            }
            Event::Rule => {
                let element = Element::new("hr").with_position(self.position(range));
                self.append(element.into());
            }
            Event::TaskListMarker(checked) => {
                let element = Element::new("input")
                    .with_property("type", "checkbox")
                    .with_property("checked", checked)
                    .with_property("disabled", true)
                    .with_position(self.position(range));
                self.append(element.into());
            }
            // Raw HTML is not carried into the tree
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let position = self.position(range.clone());
        match tag {
            Tag::Paragraph => self.open_element("p", position),
            Tag::Heading { level, .. } => {
                self.open_element(&format!("h{}", level as usize), position)
            }
            Tag::BlockQuote(_) => self.open_element("blockquote", position),
            Tag::CodeBlock(kind) => {
                let (language, position) = match kind {
                    CodeBlockKind::Fenced(info) => (
                        info.split_whitespace().next().map(str::to_string),
                        self.position(fence_range(self.text, range)),
                    ),
                    CodeBlockKind::Indented => (None, position),
                };

                let mut code = Element::new("code").with_position(position);
                if let Some(language) = language {
                    code = code.with_property(
                        CLASS_NAME,
                        PropValue::Tokens(vec![format!("{LANGUAGE_CLASS_PREFIX}{language}")]),
                    );
                }
                let pre = Element::new("pre").with_position(position);
                self.open_nested(pre, code);
            }
            Tag::HtmlBlock | Tag::MetadataBlock(_) => self.open(Frame::Skip),
            Tag::List(Some(start)) => {
                let mut list = Element::new("ol").with_position(position);
                if start != 1 {
                    list = list.with_property("start", PropValue::Int(start as i64));
                }
                self.open(Frame::Open(list));
            }
            Tag::List(None) => self.open_element("ul", position),
            Tag::Item => self.open_element("li", position),
            Tag::Table(_) => self.open_element("table", position),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open_nested(
                    Element::new("thead").with_position(position),
                    Element::new("tr").with_position(position),
                );
            }
            Tag::TableRow => self.open_element("tr", position),
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.open_element(cell, position);
            }
            Tag::Emphasis => self.open_element("em", position),
            Tag::Strong => self.open_element("strong", position),
            Tag::Strikethrough => self.open_element("del", position),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a")
                    .with_property("href", dest_url.into_string())
                    .with_position(position);
                if !title.is_empty() {
                    link = link.with_property("title", title.into_string());
                }
                self.open(Frame::Open(link));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image = Element::new("img")
                    .with_property("src", dest_url.into_string())
                    .with_position(position);
                if !title.is_empty() {
                    image = image.with_property("title", title.into_string());
                }
                self.open(Frame::Open(image));
            }
            _ => self.open(Frame::Hoist(Vec::new())),
        }
    }

    fn position(&self, range: Range<usize>) -> Option<Position> {
        Some(self.index.position(range))
    }

    fn open_element(&mut self, tag_name: &str, position: Option<Position>) {
        self.open(Frame::Open(Element::new(tag_name).with_position(position)));
    }

    fn open(&mut self, frame: Frame) {
        self.stack.push(frame);
        self.closers.push(1);
    }

    fn open_nested(&mut self, outer: Element, inner: Element) {
        self.stack.push(Frame::Open(outer));
        self.stack.push(Frame::Open(inner));
        self.closers.push(2);
    }

    fn close(&mut self) {
        let frames = self.closers.pop().unwrap_or(0);
        for _ in 0..frames {
            self.close_frame();
        }
    }

    fn close_frame(&mut self) {
        match self.stack.pop() {
            Some(Frame::Open(element)) => {
                let element = finish_element(element);
                self.append(element.into());
            }
            Some(Frame::Hoist(children)) => {
                for child in children {
                    self.append(child);
                }
            }
            Some(Frame::Skip) | None => {}
        }
    }

    /// Append to the innermost open node, merging runs of adjacent text.
    fn append(&mut self, node: TreeNode) {
        let children = match self.stack.last_mut() {
            Some(Frame::Open(element)) => &mut element.children,
            Some(Frame::Hoist(children)) => children,
            Some(Frame::Skip) => return,
            None => &mut self.root_children,
        };

        if let TreeNode::Text(next) = &node
            && let Some(TreeNode::Text(previous)) = children.last_mut()
        {
            previous.value.push_str(&next.value);
            previous.position = match (previous.position, next.position) {
                (Some(first), Some(last)) => Some(Position {
                    start: first.start,
                    end: last.end,
                }),
                _ => None,
            };
            return;
        }

        children.push(node);
    }

    fn finish(mut self) -> TreeNode {
        while !self.closers.is_empty() {
            self.close();
        }

        TreeNode::Root(Root {
            children: self.root_children,
            position: Some(self.index.position(0..self.text.len())),
        })
    }
}

/// Images keep their description as `alt` rather than as children.
fn finish_element(mut element: Element) -> Element {
    if element.tag_name == "img" {
        let alt: String = element
            .children
            .drain(..)
            .map(|child| child.text_content())
            .collect();
        element.properties.insert("alt".to_string(), PropValue::Str(alt));
    }
    element
}
