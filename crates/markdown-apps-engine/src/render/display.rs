//! Display tree produced by the renderer and by application components.
//!
//! A host walks this tree to draw it and fires [`UiEvent`]s at elements that carry
//! listeners. Components are kept live: [`DisplayNode::expand`] asks each one for its
//! current view, so state a component holds between events (drafts, drag previews)
//! shows up without re-running the pipeline.

use std::fmt;
use std::rc::Rc;

use crate::apps::{AppContext, Component};
use crate::tree::{CLASS_NAME, PropValue, Properties};

/// Property naming the action a control performs, used by hosts and tests to find it.
pub const ACTION_PROP: &str = "data-action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    DragStart,
    DragEnter,
    Drop,
    DragEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click,
    /// The full new value of a text input.
    Input(String),
    DragStart,
    DragEnter,
    Drop,
    DragEnd,
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Click => EventKind::Click,
            UiEvent::Input(_) => EventKind::Input,
            UiEvent::DragStart => EventKind::DragStart,
            UiEvent::DragEnter => EventKind::DragEnter,
            UiEvent::Drop => EventKind::Drop,
            UiEvent::DragEnd => EventKind::DragEnd,
        }
    }
}

pub type Handler = Rc<dyn Fn(&UiEvent)>;

#[derive(Clone)]
pub struct Listener {
    pub kind: EventKind,
    handler: Handler,
}

impl Listener {
    pub fn new(kind: EventKind, handler: impl Fn(&UiEvent) + 'static) -> Self {
        Self {
            kind,
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:?})", self.kind)
    }
}

/// Handlers are opaque; two listeners compare equal when they listen for the same event.
impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayNode {
    Element(DisplayElement),
    /// In-document navigation, rewritten from a relative hyperlink.
    Link(NavLink),
    Text(String),
    Component(Mounted),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayElement {
    pub tag: String,
    pub props: Properties,
    pub children: Vec<DisplayNode>,
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub to: String,
    pub props: Properties,
    pub children: Vec<DisplayNode>,
}

/// A mounted application instance.
#[derive(Clone)]
pub struct Mounted {
    pub language_tag: String,
    pub app_context: AppContext,
    component: Rc<dyn Component>,
}

impl Mounted {
    pub fn new(app_context: AppContext, component: Rc<dyn Component>) -> Self {
        Self {
            language_tag: app_context.language_tag.clone(),
            app_context,
            component,
        }
    }

    /// Current view of the component.
    pub fn view(&self) -> DisplayNode {
        self.component.view()
    }
}

impl fmt::Debug for Mounted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mounted")
            .field("language_tag", &self.language_tag)
            .field("app_context", &self.app_context)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Mounted {
    fn eq(&self, other: &Self) -> bool {
        self.app_context == other.app_context && Rc::ptr_eq(&self.component, &other.component)
    }
}

impl DisplayElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Properties::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Append class tokens; existing tokens are kept.
    pub fn class(mut self, tokens: &str) -> Self {
        for token in tokens.split_whitespace() {
            push_class_token(&mut self.props, token);
        }
        self
    }

    pub fn child(mut self, child: impl Into<DisplayNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = DisplayNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(DisplayNode::Text(text.into()))
    }

    pub fn on(mut self, kind: EventKind, handler: impl Fn(&UiEvent) + 'static) -> Self {
        self.listeners.push(Listener::new(kind, handler));
        self
    }

    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(PropValue::as_str)
    }

    pub fn prop_int(&self, name: &str) -> Option<i64> {
        match self.props.get(name) {
            Some(PropValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn class_tokens(&self) -> &[String] {
        match self.props.get(CLASS_NAME) {
            Some(PropValue::Tokens(tokens)) => tokens,
            _ => &[],
        }
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_tokens().iter().any(|t| t == token)
    }

    /// Visible text of the element's subtree.
    pub fn text_content(&self) -> String {
        self.children.iter().map(DisplayNode::text_content).collect()
    }

    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.iter().any(|listener| listener.kind == kind)
    }

    /// Fire `event` at this element. Returns whether any listener handled it.
    pub fn dispatch(&self, event: &UiEvent) -> bool {
        let kind = event.kind();
        let mut handled = false;
        for listener in self.listeners.iter().filter(|l| l.kind == kind) {
            (listener.handler)(event);
            handled = true;
        }
        handled
    }
}

impl From<DisplayElement> for DisplayNode {
    fn from(element: DisplayElement) -> Self {
        DisplayNode::Element(element)
    }
}

impl From<NavLink> for DisplayNode {
    fn from(link: NavLink) -> Self {
        DisplayNode::Link(link)
    }
}

impl DisplayNode {
    pub fn children(&self) -> &[DisplayNode] {
        match self {
            DisplayNode::Element(element) => &element.children,
            DisplayNode::Link(link) => &link.children,
            DisplayNode::Text(_) | DisplayNode::Component(_) => &[],
        }
    }

    /// Replace every mounted component by its current view, recursively.
    pub fn expand(&self) -> DisplayNode {
        match self {
            DisplayNode::Element(element) => DisplayNode::Element(DisplayElement {
                tag: element.tag.clone(),
                props: element.props.clone(),
                children: element.children.iter().map(DisplayNode::expand).collect(),
                listeners: element.listeners.clone(),
            }),
            DisplayNode::Link(link) => DisplayNode::Link(NavLink {
                to: link.to.clone(),
                props: link.props.clone(),
                children: link.children.iter().map(DisplayNode::expand).collect(),
            }),
            DisplayNode::Text(text) => DisplayNode::Text(text.clone()),
            DisplayNode::Component(mounted) => mounted.view().expand(),
        }
    }

    /// Elements matching `predicate`, in document order. Components are not entered;
    /// call [`DisplayNode::expand`] first to search their views.
    pub fn find_all(&self, predicate: impl Fn(&DisplayElement) -> bool) -> Vec<&DisplayElement> {
        let mut found = Vec::new();
        self.collect(&predicate, &mut found);
        found
    }

    fn collect<'a>(
        &'a self,
        predicate: &dyn Fn(&DisplayElement) -> bool,
        found: &mut Vec<&'a DisplayElement>,
    ) {
        if let DisplayNode::Element(element) = self
            && predicate(element)
        {
            found.push(element);
        }
        for child in self.children() {
            child.collect(predicate, found);
        }
    }

    /// Controls tagged with `data-action = action`.
    pub fn find_by_action(&self, action: &str) -> Vec<&DisplayElement> {
        self.find_all(|element| element.prop_str(ACTION_PROP) == Some(action))
    }

    /// Mounted components directly in this tree.
    pub fn components(&self) -> Vec<&Mounted> {
        let mut found = Vec::new();
        self.collect_components(&mut found);
        found
    }

    fn collect_components<'a>(&'a self, found: &mut Vec<&'a Mounted>) {
        if let DisplayNode::Component(mounted) = self {
            found.push(mounted);
        }
        for child in self.children() {
            child.collect_components(found);
        }
    }

    /// Visible text of the tree, components included.
    pub fn text_content(&self) -> String {
        match self {
            DisplayNode::Text(text) => text.clone(),
            DisplayNode::Component(mounted) => mounted.view().text_content(),
            _ => self.children().iter().map(DisplayNode::text_content).collect(),
        }
    }
}

/// Append `token` to the class list in `props`, creating the list if absent.
/// A whitespace-separated string class is split into tokens first.
pub fn push_class_token(props: &mut Properties, token: &str) {
    let mut tokens = match props.remove(CLASS_NAME) {
        Some(PropValue::Tokens(tokens)) => tokens,
        Some(PropValue::Str(classes)) => classes.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    };
    tokens.push(token.to_string());
    props.insert(CLASS_NAME.to_string(), PropValue::Tokens(tokens));
}
