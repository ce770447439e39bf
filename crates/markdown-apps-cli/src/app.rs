use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use markdown_apps_engine::render::{DisplayElement, DisplayNode, RenderContext, UiEvent};
use markdown_apps_engine::{EditQueue, Page, Registry, io};
use ratatui::widgets::ListState;
use relative_path::{RelativePath, RelativePathBuf};
use std::path::PathBuf;

use crate::layout::{self, Target};

pub struct OpenPage {
    pub path: RelativePathBuf,
    pub page: Page,
    /// Render output with live components
    rendered: Option<DisplayNode>,
    /// `rendered` with every component replaced by its current view
    pub view: Option<DisplayNode>,
}

pub struct App {
    pages_path: PathBuf,
    marker_class: String,
    pub pages: Vec<RelativePathBuf>,
    pub page_list_state: ListState,
    pub open: Option<OpenPage>,
    queue: EditQueue,
    pub focus: Option<usize>,
    /// Focus index of the card being dragged
    pub drag_source: Option<usize>,
    pub status: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(pages_path: PathBuf, marker_class: impl Into<String>) -> Result<Self> {
        let pages = io::scan_pages(&pages_path)?;
        log::info!("Found {} pages in {}", pages.len(), pages_path.display());

        let mut app = Self {
            pages_path,
            marker_class: marker_class.into(),
            pages,
            page_list_state: ListState::default(),
            open: None,
            queue: EditQueue::new(),
            focus: None,
            drag_source: None,
            status: String::new(),
            should_quit: false,
        };

        if !app.pages.is_empty() {
            app.select_page(0);
        }

        Ok(app)
    }

    pub fn next_page(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        let i = match self.page_list_state.selected() {
            Some(i) => (i + 1) % self.pages.len(),
            None => 0,
        };
        self.select_page(i);
    }

    pub fn previous_page(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        let i = match self.page_list_state.selected() {
            Some(0) | None => self.pages.len() - 1,
            Some(i) => i - 1,
        };
        self.select_page(i);
    }

    fn select_page(&mut self, index: usize) {
        self.page_list_state.select(Some(index));
        let path = self.pages[index].clone();
        self.open_page(path);
    }

    fn open_page(&mut self, path: RelativePathBuf) {
        self.queue.drain();
        self.focus = None;
        self.drag_source = None;

        match io::read_page(&path, &self.pages_path) {
            Ok(page) => {
                log::info!("Opened {path}");
                self.status = format!("Opened {path}");
                let mut open = OpenPage {
                    path,
                    page,
                    rendered: None,
                    view: None,
                };
                self.render(&mut open);
                self.open = Some(open);
            }
            Err(e) => {
                log::error!("Failed to open {path}: {e}");
                self.status = format!("Error reading {path}: {e}");
                self.open = None;
            }
        }
    }

    fn render(&mut self, open: &mut OpenPage) {
        let context = RenderContext::new(Registry::global(), self.queue.callback())
            .with_marker_class(self.marker_class.clone());
        match open.page.render(&context) {
            Ok(rendered) => {
                open.view = Some(rendered.expand());
                open.rendered = Some(rendered);
            }
            Err(e) => {
                log::error!("Failed to render {}: {e}", open.path);
                self.status = format!("Error rendering {}: {e}", open.path);
                open.rendered = None;
                open.view = None;
            }
        }
        let count = open.view.as_ref().map_or(0, |view| layout::targets(view).len());
        self.focus = match self.focus {
            _ if count == 0 => None,
            Some(focus) => Some(focus.min(count - 1)),
            None => None,
        };
    }

    pub fn targets(&self) -> Vec<Target<'_>> {
        self.open
            .as_ref()
            .and_then(|open| open.view.as_ref())
            .map(layout::targets)
            .unwrap_or_default()
    }

    pub fn focused_element(&self) -> Option<&DisplayElement> {
        let focus = self.focus?;
        self.targets().get(focus)?.as_control()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('d') if ctrl => self.start_drag(),
            KeyCode::PageDown => self.next_page(),
            KeyCode::PageUp => self.previous_page(),
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            KeyCode::Esc => self.cancel_drag(),
            KeyCode::Enter => self.activate(),
            KeyCode::Backspace => self.edit_input(|value| {
                value.pop();
            }),
            KeyCode::Char(c) if !ctrl => self.edit_input(|value| value.push(c)),
            _ => return,
        }
        self.settle();
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.targets().len();
        if count == 0 {
            return;
        }
        self.focus = Some(match (self.focus, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });

        if self.drag_source.is_some()
            && let Some(focus) = self.focus
        {
            self.dispatch(focus, &UiEvent::DragEnter);
        }
    }

    /// Fire `event` at the control at `index`. Returns whether anything listened.
    fn dispatch(&self, index: usize, event: &UiEvent) -> bool {
        self.targets()
            .get(index)
            .and_then(Target::as_control)
            .is_some_and(|element| element.dispatch(event))
    }

    fn edit_input(&mut self, change: impl FnOnce(&mut String)) {
        let Some(element) = self.focused_element() else {
            return;
        };
        if element.prop_str("type") != Some("text") {
            return;
        }
        let mut value = element.prop_str("value").unwrap_or_default().to_string();
        change(&mut value);
        if let Some(focus) = self.focus {
            self.dispatch(focus, &UiEvent::Input(value));
        }
    }

    fn activate(&mut self) {
        let Some(focus) = self.focus else {
            return;
        };

        if let Some(source) = self.drag_source.take() {
            if self.dispatch(focus, &UiEvent::Drop) {
                self.status = "Moved".to_string();
            } else {
                self.status = "Not a drop target; drag cancelled".to_string();
            }
            self.dispatch(source, &UiEvent::DragEnd);
            return;
        }

        let link = match self.targets().get(focus) {
            Some(Target::Link(link)) => Some(link.to.clone()),
            _ => None,
        };
        match link {
            Some(to) => self.follow_link(&to),
            None => {
                self.dispatch(focus, &UiEvent::Click);
            }
        }
    }

    fn start_drag(&mut self) {
        let Some(focus) = self.focus else {
            return;
        };
        if self.dispatch(focus, &UiEvent::DragStart) {
            self.drag_source = Some(focus);
            self.status = "Dragging: Tab to a target, Enter to drop, Esc to cancel".to_string();
        } else {
            self.status = "Only cards can be dragged".to_string();
        }
    }

    fn cancel_drag(&mut self) {
        if let Some(source) = self.drag_source.take() {
            self.dispatch(source, &UiEvent::DragEnd);
            self.status = "Drag cancelled".to_string();
        }
    }

    fn follow_link(&mut self, to: &str) {
        let Some(target) = self.resolve_link(to) else {
            self.status = format!("Cannot follow {to}");
            return;
        };
        match self.pages.iter().position(|page| *page == target) {
            Some(index) => self.select_page(index),
            None => self.status = format!("No such page: {target}"),
        }
    }

    /// `/` paths are relative to the pages directory, `.` paths to the open page.
    fn resolve_link(&self, to: &str) -> Option<RelativePathBuf> {
        let to = to.split('#').next().unwrap_or(to);
        if let Some(rooted) = to.strip_prefix('/') {
            return Some(RelativePath::new(rooted).normalize());
        }
        let current = &self.open.as_ref()?.path;
        let base = current.parent().unwrap_or(RelativePath::new(""));
        Some(base.join_normalized(to))
    }

    /// Apply the newest pending edit, save, and render again; otherwise refresh the
    /// view from the live components.
    fn settle(&mut self) {
        let Some(mut open) = self.open.take() else {
            return;
        };

        match self.queue.take_last() {
            Some(edit) => {
                let patch = open.page.apply_edit(&edit);
                log::info!(
                    "Applied `{}` edit to {} (version {})",
                    edit.context.language_tag,
                    open.path,
                    patch.version
                );
                match io::write_page(&open.path, &self.pages_path, &open.page) {
                    Ok(()) => self.status = format!("Saved {}", open.path),
                    Err(e) => {
                        log::error!("Failed to save {}: {e}", open.path);
                        self.status = format!("Error saving {}: {e}", open.path);
                    }
                }
                self.drag_source = None;
                self.render(&mut open);
            }
            None => {
                open.view = open.rendered.as_ref().map(DisplayNode::expand);
            }
        }

        self.open = Some(open);
    }
}
