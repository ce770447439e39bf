//! # markdown-apps engine
//!
//! Markdown pages with embedded interactive applications. A page goes through four
//! stages, each a plain function over owned or borrowed trees:
//!
//! - [`parsing::parse_to_tree`]: text to a positioned document tree
//! - [`transform::transform`]: registered fenced blocks become application nodes
//! - [`render::render`]: document tree to display tree, mounting applications
//! - [`writeback::replace_app_code`]: an application's new body spliced back into
//!   the text at its block's span
//!
//! [`editing::Page`] ties the stages together for a host; [`apps::board`] is the
//! built-in ordered board.

pub mod apps;
pub mod editing;
pub mod io;
pub mod parsing;
pub mod render;
pub mod transform;
pub mod tree;
pub mod writeback;

#[cfg(test)]
pub mod tests;

pub use apps::{AppContext, AppProps, Application, Component, EditCallback, Registry};
pub use editing::{EditQueue, EditRequest, Page, Patch};
pub use io::*;
pub use parsing::parse_to_tree;
pub use render::{DisplayNode, RenderContext, RenderError, render, to_html};
pub use transform::transform;
pub use tree::{Position, Span, TreeNode};
pub use writeback::replace_app_code;
