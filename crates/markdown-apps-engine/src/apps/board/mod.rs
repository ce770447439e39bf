//! Ordered board (kanban) application.
//!
//! State lives in the fenced block as a two-level outline (see [`markdown`]). The mounted
//! component keeps a [`BoardState`] plus the drafts typed into its inputs, and reports
//! each change to the board as a fresh serialization through `on_edit`.

pub mod markdown;
pub mod model;

use std::cell::RefCell;
use std::rc::Rc;

use super::{AppContext, AppProps, Application, Component, EditCallback};
use crate::render::display::{ACTION_PROP, DisplayElement, DisplayNode, EventKind, UiEvent};

pub use model::{Board, BoardAction, BoardList, BoardState, ItemId, MovePreview};

pub const LANGUAGE_TAG: &str = "kanban";

/// `data-action` values of the board's controls.
pub mod actions {
    pub const LIST_NAME: &str = "list-name";
    pub const ADD_LIST: &str = "add-list";
    pub const REMOVE_LIST: &str = "remove-list";
    pub const CARD: &str = "card";
    pub const REMOVE_ITEM: &str = "remove-item";
    pub const DROP_ZONE: &str = "drop-zone";
    pub const ITEM_TEXT: &str = "item-text";
    pub const ADD_ITEM: &str = "add-item";
}

/// Registered under [`LANGUAGE_TAG`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardApp;

impl Application for BoardApp {
    fn language_tag(&self) -> &'static str {
        LANGUAGE_TAG
    }

    fn mount(&self, props: AppProps) -> Rc<dyn Component> {
        Rc::new(BoardComponent::new(props))
    }
}

/// A mounted board. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BoardComponent {
    shared: Rc<Shared>,
}

struct Shared {
    inner: RefCell<Inner>,
    on_edit: EditCallback,
    app_context: AppContext,
}

#[derive(Default)]
struct Inner {
    state: BoardState,
    list_draft: String,
    item_drafts: Vec<String>,
    dragging: Option<ItemId>,
}

impl BoardComponent {
    pub fn new(props: AppProps) -> Self {
        let board = markdown::deserialize(&props.data);
        log::debug!(
            "Mounted board with {} lists at offset {}",
            board.lists.len(),
            props.app_context.position.start.offset
        );
        Self {
            shared: Rc::new(Shared {
                inner: RefCell::new(Inner {
                    state: BoardState::new(board),
                    ..Inner::default()
                }),
                on_edit: props.on_edit,
                app_context: props.app_context,
            }),
        }
    }

    /// Snapshot of the current board.
    pub fn board(&self) -> Board {
        self.shared.inner.borrow().state.board.clone()
    }

    pub fn preview(&self) -> Option<MovePreview> {
        self.shared.inner.borrow().state.preview()
    }
}

impl Shared {
    /// Apply `action` and report the new serialization if the board changed.
    fn commit(&self, action: BoardAction) {
        let serialized = {
            let mut inner = self.inner.borrow_mut();
            inner.dragging = None;
            if !inner.state.commit(action) {
                return;
            }
            markdown::serialize(&inner.state.board)
        };
        (self.on_edit)(serialized, self.app_context.clone());
    }

    fn set_list_draft(&self, text: &str) {
        self.inner.borrow_mut().list_draft = text.to_string();
    }

    fn set_item_draft(&self, list: usize, text: &str) {
        let mut inner = self.inner.borrow_mut();
        if inner.item_drafts.len() <= list {
            inner.item_drafts.resize(list + 1, String::new());
        }
        inner.item_drafts[list] = text.to_string();
    }

    fn add_list(&self) {
        let name = std::mem::take(&mut self.inner.borrow_mut().list_draft);
        if name.trim().is_empty() {
            return;
        }
        self.commit(BoardAction::AddList(name));
    }

    fn add_item(&self, list: usize) {
        let text = self
            .inner
            .borrow_mut()
            .item_drafts
            .get_mut(list)
            .map(std::mem::take)
            .unwrap_or_default();
        self.commit(BoardAction::AddItem { list, text });
    }

    /// Drafts are per list, so the ones after `index` move down with their lists.
    fn remove_list(&self, index: usize) {
        {
            let mut inner = self.inner.borrow_mut();
            if index < inner.state.board.lists.len() && index < inner.item_drafts.len() {
                inner.item_drafts.remove(index);
            }
        }
        self.commit(BoardAction::RemoveList(index));
    }

    fn start_drag(&self, source: ItemId) {
        let mut inner = self.inner.borrow_mut();
        inner.state.cancel_drag();
        inner.dragging = Some(source);
    }

    fn hover(&self, target: ItemId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(source) = inner.dragging {
            inner.state.preview_move_item(source, target);
        }
    }

    fn drop_on(&self, target: ItemId) {
        let source = self.inner.borrow_mut().dragging.take();
        match source {
            Some(source) => self.commit(BoardAction::MoveItem { source, target }),
            None => log::debug!("Drop without an active drag"),
        }
    }

    fn end_drag(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.dragging = None;
        inner.state.cancel_drag();
    }
}

impl Component for BoardComponent {
    fn view(&self) -> DisplayNode {
        let inner = self.shared.inner.borrow();
        let lists = &inner.state.board.lists;

        let list_cells = lists
            .iter()
            .enumerate()
            .map(|(index, list)| DisplayNode::from(self.list_cell(&inner, index, list)));
        let add_item_cells = (0..lists.len()).map(|index| {
            let draft = inner.item_drafts.get(index).map(String::as_str).unwrap_or("");
            DisplayNode::from(self.add_item_cell(index, draft))
        });

        DisplayElement::new("div")
            .class("kanban")
            .child(self.text_input(actions::LIST_NAME, "Add list", &inner.list_draft, {
                let shared = self.shared.clone();
                move |text| shared.set_list_draft(text)
            }))
            .child(self.button(actions::ADD_LIST, "Add list", {
                let shared = self.shared.clone();
                move || shared.add_list()
            }))
            .child(
                DisplayElement::new("table").child(
                    DisplayElement::new("tbody")
                        .child(DisplayElement::new("tr").children(list_cells))
                        .child(DisplayElement::new("tr").children(add_item_cells)),
                ),
            )
            .into()
    }
}

impl BoardComponent {
    fn list_cell(&self, inner: &Inner, index: usize, list: &BoardList) -> DisplayElement {
        let preview = inner.state.preview();
        let placeholder_at = preview
            .filter(|p| p.target.list == index)
            .map(|p| p.slot().min(list.items.len()));

        let mut cards: Vec<DisplayNode> = Vec::with_capacity(list.items.len() + 1);
        for (item_index, title) in list.items.iter().enumerate() {
            if placeholder_at == Some(item_index) {
                cards.push(placeholder().into());
            }
            let id = ItemId::new(index, item_index);
            let dragging = preview.is_some_and(|p| p.source == id) || inner.dragging == Some(id);
            cards.push(self.card(id, title, dragging).into());
        }
        if placeholder_at == Some(list.items.len()) {
            cards.push(placeholder().into());
        }
        cards.push(self.drop_zone(ItemId::new(index, list.items.len())).into());

        let remove = self
            .button(actions::REMOVE_LIST, "x", {
                let shared = self.shared.clone();
                move || shared.remove_list(index)
            })
            .prop("data-list", index);

        DisplayElement::new("td")
            .class("kanban-list")
            .child(DisplayElement::new("h2").text(list.name.clone()).child(remove))
            .children(cards)
    }

    fn card(&self, id: ItemId, title: &str, dragging: bool) -> DisplayElement {
        let remove = self
            .button(actions::REMOVE_ITEM, "x", {
                let shared = self.shared.clone();
                move || shared.commit(BoardAction::RemoveItem(id))
            })
            .prop("data-list", id.list)
            .prop("data-item", id.item);

        let mut card = DisplayElement::new("span")
            .class("kanban-card")
            .prop(ACTION_PROP, actions::CARD)
            .prop("data-list", id.list)
            .prop("data-item", id.item)
            .prop("draggable", true)
            .text(title.to_string())
            .child(remove);
        if dragging {
            card = card.class("dragging");
        }
        self.drag_target(card, id).on(EventKind::DragStart, {
            let shared = self.shared.clone();
            move |_| shared.start_drag(id)
        })
    }

    /// Trailing target of each list, so drops land at the end and empty lists accept them.
    fn drop_zone(&self, id: ItemId) -> DisplayElement {
        let zone = DisplayElement::new("span")
            .class("kanban-dropzone")
            .prop(ACTION_PROP, actions::DROP_ZONE)
            .prop("data-list", id.list)
            .prop("data-item", id.item);
        self.drag_target(zone, id)
    }

    fn drag_target(&self, element: DisplayElement, id: ItemId) -> DisplayElement {
        element
            .on(EventKind::DragEnter, {
                let shared = self.shared.clone();
                move |_| shared.hover(id)
            })
            .on(EventKind::Drop, {
                let shared = self.shared.clone();
                move |_| shared.drop_on(id)
            })
            .on(EventKind::DragEnd, {
                let shared = self.shared.clone();
                move |_| shared.end_drag()
            })
    }

    fn add_item_cell(&self, index: usize, draft: &str) -> DisplayElement {
        let input = self
            .text_input(actions::ITEM_TEXT, "Add item", draft, {
                let shared = self.shared.clone();
                move |text| shared.set_item_draft(index, text)
            })
            .prop("data-list", index);
        let add = self
            .button(actions::ADD_ITEM, "Add", {
                let shared = self.shared.clone();
                move || shared.add_item(index)
            })
            .prop("data-list", index);
        DisplayElement::new("td").child(input).child(add)
    }

    fn text_input(
        &self,
        action: &str,
        placeholder: &str,
        value: &str,
        on_input: impl Fn(&str) + 'static,
    ) -> DisplayElement {
        DisplayElement::new("input")
            .prop("type", "text")
            .prop("placeholder", placeholder)
            .prop("value", value)
            .prop(ACTION_PROP, action)
            .on(EventKind::Input, move |event| {
                if let UiEvent::Input(text) = event {
                    on_input(text);
                }
            })
    }

    fn button(&self, action: &str, label: &str, on_click: impl Fn() + 'static) -> DisplayElement {
        DisplayElement::new("button")
            .prop("type", "button")
            .prop(ACTION_PROP, action)
            .text(label)
            .on(EventKind::Click, move |_| on_click())
    }
}

fn placeholder() -> DisplayElement {
    DisplayElement::new("span").class("kanban-placeholder")
}
