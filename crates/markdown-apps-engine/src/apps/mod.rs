//! # Embedded Applications
//!
//! An application lives inside a fenced code block whose language tag names it:
//!
//! ````markdown
//! ```kanban
//! * Todo
//!   * Write docs
//! ```
//! ````
//!
//! The block body is the application's serialized state. The renderer mounts the
//! registered [`Application`] with that body, and the mounted [`Component`] reports every
//! change through its [`EditCallback`] as a complete new body plus the [`AppContext`]
//! identifying which block to rewrite. The host hands that pair to
//! [`crate::writeback::replace_app_code`]; the application never touches the document.

pub mod board;
pub mod registry;

use std::rc::Rc;

use crate::render::DisplayNode;
use crate::tree::Span;

pub use registry::Registry;

/// Identifies the block an application instance was mounted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    pub language_tag: String,
    /// Span of the whole fenced block in the text the page was rendered from.
    pub position: Span,
}

/// Receives `(new serialized body, context)` whenever an application changes.
pub type EditCallback = Rc<dyn Fn(String, AppContext)>;

/// Everything an application is mounted with.
#[derive(Clone)]
pub struct AppProps {
    /// Raw body of the fenced block.
    pub data: String,
    pub on_edit: EditCallback,
    pub app_context: AppContext,
}

/// A live application instance. Views are recomputed on demand from its state.
pub trait Component {
    fn view(&self) -> DisplayNode;
}

/// An embeddable application, registered once under its language tag.
pub trait Application: Send + Sync {
    fn language_tag(&self) -> &'static str;

    fn mount(&self, props: AppProps) -> Rc<dyn Component>;
}
