//! Lay a rendered page out as terminal lines.
//!
//! Works on an expanded view (see `DisplayNode::expand`): mounted components must
//! already be replaced by their views, or they are skipped. Focus targets are counted
//! in document order by [`targets`] and [`layout`] alike, so a focus index means the
//! same element to both.

use markdown_apps_engine::render::{DisplayElement, DisplayNode, EventKind, NavLink};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Something the user can move focus to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Control(&'a DisplayElement),
    Link(&'a NavLink),
}

impl<'a> Target<'a> {
    pub fn as_control(&self) -> Option<&'a DisplayElement> {
        match self {
            Target::Control(element) => Some(element),
            Target::Link(_) => None,
        }
    }
}

pub fn is_control(element: &DisplayElement) -> bool {
    [
        EventKind::Click,
        EventKind::Input,
        EventKind::DragStart,
        EventKind::Drop,
    ]
    .into_iter()
    .any(|kind| element.listens_to(kind))
}

/// Focus targets of `view`, in document order.
pub fn targets(view: &DisplayNode) -> Vec<Target<'_>> {
    let mut found = Vec::new();
    collect_targets(view, &mut found);
    found
}

fn collect_targets<'a>(node: &'a DisplayNode, found: &mut Vec<Target<'a>>) {
    match node {
        DisplayNode::Element(element) if is_control(element) => found.push(Target::Control(element)),
        DisplayNode::Link(link) => found.push(Target::Link(link)),
        _ => {}
    }
    for child in node.children() {
        collect_targets(child, found);
    }
}

pub struct PageLines {
    pub lines: Vec<Line<'static>>,
    /// Line holding the focused target
    pub focus_line: Option<usize>,
}

pub fn layout(view: &DisplayNode, focus: Option<usize>) -> PageLines {
    let mut writer = Writer {
        focus,
        ..Writer::default()
    };
    writer.node(view);
    writer.break_line();
    while writer.lines.last().is_some_and(|line| line.spans.is_empty()) {
        writer.lines.pop();
    }
    PageLines {
        lines: writer.lines,
        focus_line: writer.focus_line,
    }
}

#[derive(Default)]
struct Writer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// Indentation in force when the current line started
    line_prefix: Option<String>,
    indent: Vec<&'static str>,
    styles: Vec<Style>,
    focus: Option<usize>,
    next_target: usize,
    focus_line: Option<usize>,
}

impl Writer {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn with_style(&mut self, style: Style, f: impl FnOnce(&mut Self)) {
        self.styles.push(self.style().patch(style));
        f(self);
        self.styles.pop();
    }

    fn with_indent(&mut self, indent: &'static str, f: impl FnOnce(&mut Self)) {
        self.indent.push(indent);
        f(self);
        self.break_line();
        self.indent.pop();
    }

    fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            if self.current.is_empty() {
                self.line_prefix = Some(self.indent.concat());
            }
            let style = self.style();
            self.current.push(Span::styled(text, style));
        }
    }

    /// Push text that may span lines.
    fn push_text(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.end_line();
            }
            self.push(part);
        }
    }

    fn end_line(&mut self) {
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        let prefix = self
            .line_prefix
            .take()
            .unwrap_or_else(|| self.indent.concat());
        if !prefix.is_empty() {
            spans.push(Span::styled(prefix, Style::default().fg(Color::DarkGray)));
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.end_line();
        }
    }

    fn blank_line(&mut self) {
        self.break_line();
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn children(&mut self, children: &[DisplayNode]) {
        for child in children {
            self.node(child);
        }
    }

    /// Count a focus target; returns whether it is the focused one.
    fn target(&mut self) -> bool {
        let index = self.next_target;
        self.next_target += 1;
        let focused = self.focus == Some(index);
        if focused {
            self.focus_line = Some(self.lines.len());
        }
        focused
    }

    fn node(&mut self, node: &DisplayNode) {
        match node {
            DisplayNode::Text(text) => self.push_text(text),
            DisplayNode::Link(link) => {
                let mut style = Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED);
                if self.target() {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                self.with_style(style, |w| w.children(&link.children));
            }
            DisplayNode::Element(element) => self.element(element),
            DisplayNode::Component(mounted) => {
                log::debug!("Skipping unexpanded `{}` component", mounted.language_tag);
            }
        }
    }

    fn element(&mut self, element: &DisplayElement) {
        let tag = element.tag.as_str();
        if is_block(element) {
            self.break_line();
        }
        let focused = is_control(element) && self.target();
        let focus_style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                self.blank_line();
                let style = Style::default()
                    .fg(if level <= 2 { Color::Magenta } else { Color::Reset })
                    .add_modifier(Modifier::BOLD);
                self.with_style(style, |w| {
                    w.push(format!("{} ", "#".repeat(level)));
                    w.children(&element.children);
                });
                self.blank_line();
            }
            "p" => {
                self.children(&element.children);
                self.blank_line();
            }
            "li" => {
                self.push("• ");
                self.with_indent("  ", |w| w.children(&element.children));
            }
            "blockquote" => self.with_indent("│ ", |w| w.children(&element.children)),
            "pre" => {
                let text = element.children.iter().map(DisplayNode::text_content).collect::<String>();
                self.with_style(Style::default().fg(Color::Cyan), |w| {
                    w.push_text(text.strip_suffix('\n').unwrap_or(&text));
                });
                self.blank_line();
            }
            "hr" => {
                self.push("────────────────");
                self.end_line();
            }
            "br" => self.end_line(),
            "img" => {
                let alt = element.prop_str("alt").unwrap_or_default();
                self.with_style(Style::default().fg(Color::DarkGray), |w| {
                    w.push(format!("[image: {alt}]"));
                });
            }
            "input" => self.input(element, focus_style),
            "button" => self.with_style(focus_style.fg(Color::Red), |w| {
                w.push(" [");
                w.children(&element.children);
                w.push("]");
            }),
            "td" | "th" if !is_block(element) => {
                self.children(&element.children);
                self.push(" │ ");
            }
            "span" if element.has_class("kanban-card") => {
                let mut style = focus_style.fg(Color::Yellow);
                if element.has_class("dragging") {
                    style = style.add_modifier(Modifier::DIM | Modifier::ITALIC);
                }
                self.with_style(style, |w| {
                    w.push("▪ ");
                    w.children(&element.children);
                });
            }
            "span" if element.has_class("kanban-placeholder") => {
                self.with_style(Style::default().fg(Color::Green), |w| w.push("┈┈ drop here ┈┈"));
            }
            "span" if element.has_class("kanban-dropzone") => {
                self.with_style(focus_style.fg(Color::DarkGray), |w| w.push("⤓ end of list"));
            }
            _ => {
                let style = match tag {
                    "em" => Style::default().add_modifier(Modifier::ITALIC),
                    "strong" => Style::default().add_modifier(Modifier::BOLD),
                    "del" => Style::default().add_modifier(Modifier::CROSSED_OUT),
                    "code" => Style::default().fg(Color::Cyan),
                    _ => Style::default(),
                };
                self.with_style(style.patch(focus_style), |w| w.children(&element.children));
            }
        }

        if is_block(element) {
            self.break_line();
        }
    }

    fn input(&mut self, element: &DisplayElement, focus_style: Style) {
        if element.prop_str("type") == Some("checkbox") {
            let checked = matches!(
                element.props.get("checked"),
                Some(markdown_apps_engine::tree::PropValue::Bool(true))
            );
            self.push(if checked { "[x] " } else { "[ ] " });
            return;
        }

        let value = element.prop_str("value").unwrap_or_default();
        if value.is_empty() {
            let placeholder = element.prop_str("placeholder").unwrap_or_default();
            self.with_style(focus_style.fg(Color::DarkGray), |w| {
                w.push(format!("[{placeholder}…]"));
            });
        } else {
            self.with_style(focus_style, |w| w.push(format!("[{value}]")));
        }
    }
}

fn is_block(element: &DisplayElement) -> bool {
    match element.tag.as_str() {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "li" | "blockquote"
        | "pre" | "hr" | "table" | "thead" | "tbody" | "tr" | "div" => true,
        "td" | "th" => element.children.iter().any(|child| match child {
            DisplayNode::Element(inner) => is_block(inner),
            _ => false,
        }),
        "span" => {
            element.has_class("kanban-card")
                || element.has_class("kanban-placeholder")
                || element.has_class("kanban-dropzone")
        }
        _ => false,
    }
}
