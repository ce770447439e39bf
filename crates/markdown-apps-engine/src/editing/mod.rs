/*!
 * # Page Editing
 *
 * The host side of the edit loop. A [`Page`] owns the document text in a single
 * `xi_rope::Rope` buffer and is the only thing that changes it:
 *
 * 1. The page is rendered; mounted applications get an `on_edit` callback, usually
 *    [`EditQueue::callback`].
 * 2. A user event makes an application report `(new body, app context)`. The queue
 *    stores it as an [`EditRequest`]; nothing is written while the event is handled.
 * 3. The host takes the request and calls [`Page::apply_edit`], which compiles the
 *    writeback into a rope `Delta`, applies it, and returns a [`Patch`].
 * 4. The host renders the page again from scratch. Spans handed out by the previous
 *    render are stale from this point on.
 *
 * ```rust
 * use markdown_apps_engine::apps::Registry;
 * use markdown_apps_engine::editing::{EditQueue, Page};
 * use markdown_apps_engine::render::{RenderContext, UiEvent};
 *
 * let mut page = Page::from_text("```kanban\n* Todo\n  * a\n```\n");
 * let queue = EditQueue::new();
 * let context = RenderContext::new(Registry::global(), queue.callback());
 *
 * let view = page.render(&context).unwrap().expand();
 * view.find_by_action("remove-item")[0].dispatch(&UiEvent::Click);
 *
 * let edit = queue.take_last().unwrap();
 * page.apply_edit(&edit);
 * assert_eq!(page.text(), "```kanban\n* Todo\n```\n");
 * ```
 */

pub mod page;
pub mod patch;
pub mod queue;

pub use page::Page;
pub use patch::Patch;
pub use queue::{EditQueue, EditRequest};
