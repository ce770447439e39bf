//! # Rendering
//!
//! Converts a (transformed) document tree into a [`DisplayNode`] tree. Children are
//! rendered before their parent, and each element is dispatched on its shape:
//!
//! 1. `app:<tag>` nodes mount the registered application with the node's body and span.
//! 2. Links whose target starts with `.` or `/` become in-document [`NavLink`]s.
//! 3. Everything else becomes a plain element.
//!
//! Every element and link gets the marker class appended to its class list, so pages
//! can be styled apart from the host's own chrome.

pub mod display;
pub mod html;

use std::rc::Rc;

use thiserror::Error;

use crate::apps::{AppContext, AppProps, EditCallback, Registry};
use crate::tree::{Element, Properties, TreeNode};

pub use display::{
    ACTION_PROP, DisplayElement, DisplayNode, EventKind, Listener, Mounted, NavLink, UiEvent,
    push_class_token,
};
pub use html::to_html;

/// Class token added to every rendered element.
pub const DEFAULT_MARKER_CLASS: &str = "md";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("No application registered for `{language_tag}`")]
    UnknownApplication { language_tag: String },

    #[error("Application node `{language_tag}` has no source position")]
    MissingPosition { language_tag: String },
}

/// What the renderer needs from its host.
#[derive(Clone)]
pub struct RenderContext<'r> {
    pub registry: &'r Registry,
    pub on_edit: EditCallback,
    pub marker_class: String,
}

impl<'r> RenderContext<'r> {
    pub fn new(registry: &'r Registry, on_edit: EditCallback) -> Self {
        Self {
            registry,
            on_edit,
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
        }
    }

    pub fn with_marker_class(mut self, marker_class: impl Into<String>) -> Self {
        self.marker_class = marker_class.into();
        self
    }
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("registry", self.registry)
            .field("marker_class", &self.marker_class)
            .finish_non_exhaustive()
    }
}

pub fn render(node: &TreeNode, context: &RenderContext<'_>) -> Result<DisplayNode, RenderError> {
    match node {
        TreeNode::Text(text) => Ok(DisplayNode::Text(text.value.clone())),
        TreeNode::Root(root) => {
            let children = render_children(&root.children, context)?;
            Ok(marked_element("div", Properties::new(), children, context))
        }
        TreeNode::Element(element) => render_element(element, context),
    }
}

fn render_element(
    element: &Element,
    context: &RenderContext<'_>,
) -> Result<DisplayNode, RenderError> {
    if let Some(language_tag) = element.application_tag() {
        return mount_application(element, language_tag, context);
    }

    let children = render_children(&element.children, context)?;

    if element.tag_name == "a"
        && let Some(href) = element.property_str("href")
        && is_internal_link(href)
    {
        let mut props = element.properties.clone();
        props.remove("href");
        push_class_token(&mut props, &context.marker_class);
        return Ok(NavLink {
            to: href.to_string(),
            props,
            children,
        }
        .into());
    }

    Ok(marked_element(
        &element.tag_name,
        element.properties.clone(),
        children,
        context,
    ))
}

fn render_children(
    children: &[TreeNode],
    context: &RenderContext<'_>,
) -> Result<Vec<DisplayNode>, RenderError> {
    children.iter().map(|child| render(child, context)).collect()
}

fn marked_element(
    tag: &str,
    mut props: Properties,
    children: Vec<DisplayNode>,
    context: &RenderContext<'_>,
) -> DisplayNode {
    push_class_token(&mut props, &context.marker_class);
    DisplayElement {
        tag: tag.to_string(),
        props,
        children,
        listeners: Vec::new(),
    }
    .into()
}

fn mount_application(
    element: &Element,
    language_tag: &str,
    context: &RenderContext<'_>,
) -> Result<DisplayNode, RenderError> {
    let app = context
        .registry
        .get(language_tag)
        .ok_or_else(|| RenderError::UnknownApplication {
            language_tag: language_tag.to_string(),
        })?;
    let position = element.position.ok_or_else(|| RenderError::MissingPosition {
        language_tag: language_tag.to_string(),
    })?;

    let app_context = AppContext {
        language_tag: language_tag.to_string(),
        position,
    };
    log::debug!(
        "Mounting `{language_tag}` at {}:{}",
        position.start.line,
        position.start.column
    );
    let component = app.mount(AppProps {
        data: element.first_text().unwrap_or_default().to_string(),
        on_edit: Rc::clone(&context.on_edit),
        app_context: app_context.clone(),
    });
    Ok(DisplayNode::Component(Mounted::new(app_context, component)))
}

/// Relative and absolute paths stay inside the wiki; anything else is an external URL.
pub fn is_internal_link(href: &str) -> bool {
    href.starts_with(['.', '/'])
}
