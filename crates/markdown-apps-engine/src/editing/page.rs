use xi_rope::Rope;

use crate::apps::{AppContext, Registry};
use crate::editing::{EditRequest, Patch};
use crate::parsing::parse_to_tree;
use crate::render::{DisplayNode, RenderContext, RenderError, render};
use crate::transform::transform;
use crate::tree::TreeNode;
use crate::writeback::{FENCE, compile_writeback};

/// One Markdown page and its edit history counter.
///
/// The rope buffer is the single source of truth: the tree, the transformed tree and
/// the display tree are recomputed from it on every call.
#[derive(Debug, Clone)]
pub struct Page {
    buffer: Rope,
    version: u64,
}

impl Page {
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            version: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Exact bytes of the page, for saving
    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Number of edits applied since the page was loaded
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> TreeNode {
        parse_to_tree(&self.text())
    }

    pub fn transformed(&self, registry: &Registry) -> TreeNode {
        transform(&self.tree(), registry).into_owned()
    }

    /// Every application block on the page, in document order.
    pub fn applications(&self, registry: &Registry) -> Vec<AppContext> {
        self.transformed(registry)
            .elements()
            .into_iter()
            .filter_map(|element| {
                Some(AppContext {
                    language_tag: element.application_tag()?.to_string(),
                    position: element.position?,
                })
            })
            .collect()
    }

    /// Run the whole pipeline: parse, transform, render.
    pub fn render(&self, context: &RenderContext<'_>) -> Result<DisplayNode, RenderError> {
        let tree = self.tree();
        let transformed = transform(&tree, context.registry);
        log::debug!("Rendering page version {}", self.version);
        render(&transformed, context)
    }

    /// Write an application's new body back into the page.
    pub fn apply_edit(&mut self, edit: &EditRequest) -> Patch {
        let text = self.text();
        let span = &edit.context.position;
        if !text
            .get(span.byte_range())
            .is_some_and(|block| block.starts_with(FENCE) || block.starts_with("~~~"))
        {
            log::warn!(
                "Edit for `{}` at {}..{} does not point at a fenced block; the span may be stale",
                edit.context.language_tag,
                span.start.offset,
                span.end.offset
            );
        }

        let delta = compile_writeback(&text, span, &edit.context.language_tag, &edit.text);
        self.buffer = delta.apply(&self.buffer);
        self.version += 1;
        Patch::from_delta(&delta, self.version)
    }
}
