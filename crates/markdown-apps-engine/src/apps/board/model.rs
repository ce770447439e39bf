//! Ordered board state: named lists of string items.
//!
//! Changes go through [`Board::apply`], a pure `(board, action) -> board'` transition.
//! Out-of-range indices are no-ops rather than errors: item identities are positional,
//! so a stale id after a racing click must not take the editor down.

/// Positional identity of an item. Only valid until the next mutation of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub list: usize,
    pub item: usize,
}

impl ItemId {
    pub fn new(list: usize, item: usize) -> Self {
        Self { list, item }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardList {
    pub name: String,
    pub items: Vec<String>,
}

impl BoardList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub lists: Vec<BoardList>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardAction {
    AddList(String),
    RemoveList(usize),
    AddItem { list: usize, text: String },
    RemoveItem(ItemId),
    MoveItem { source: ItemId, target: ItemId },
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: ItemId) -> Option<&str> {
        self.lists
            .get(id.list)
            .and_then(|list| list.items.get(id.item))
            .map(String::as_str)
    }

    /// Apply `action`, returning the resulting board.
    #[must_use]
    pub fn apply(mut self, action: BoardAction) -> Board {
        self.apply_in_place(action);
        self
    }

    /// Apply `action` to this board. Returns whether anything changed.
    pub fn apply_in_place(&mut self, action: BoardAction) -> bool {
        match action {
            BoardAction::AddList(name) => {
                self.lists.push(BoardList::new(single_line(&name)));
                true
            }
            BoardAction::RemoveList(index) => {
                if index < self.lists.len() {
                    self.lists.remove(index);
                    true
                } else {
                    false
                }
            }
            BoardAction::AddItem { list, text } => {
                let text = single_line(&text);
                if text.is_empty() {
                    return false;
                }
                match self.lists.get_mut(list) {
                    Some(list) => {
                        list.items.push(text);
                        true
                    }
                    None => false,
                }
            }
            BoardAction::RemoveItem(id) => match self.lists.get_mut(id.list) {
                Some(list) if id.item < list.items.len() => {
                    list.items.remove(id.item);
                    true
                }
                _ => false,
            },
            BoardAction::MoveItem { source, target } => self.move_item(source, target),
        }
    }

    /// Remove the item at `source` and insert it at `target`, positions taken after the
    /// removal. A target index past the end of its list appends.
    fn move_item(&mut self, source: ItemId, target: ItemId) -> bool {
        if source == target || target.list >= self.lists.len() || self.item(source).is_none() {
            return false;
        }

        let item = self.lists[source.list].items.remove(source.item);
        let destination = &mut self.lists[target.list].items;
        let index = target.item.min(destination.len());
        destination.insert(index, item);
        true
    }
}

/// Text as it survives the outline: one line, no surrounding whitespace.
fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

/// Where a dragged item would land if dropped now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePreview {
    pub source: ItemId,
    pub target: ItemId,
}

impl MovePreview {
    /// Index in the target list, counted before the dragged item leaves its place, of the
    /// item the dragged one would land in front of. Matches the order the move commits.
    pub fn slot(&self) -> usize {
        if self.source.list == self.target.list && self.target.item > self.source.item {
            self.target.item + 1
        } else {
            self.target.item
        }
    }
}

/// A board plus the transient drag hint shown while an item is being dragged.
///
/// The hint is never written into the board; only [`BoardState::commit`] mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    pub board: Board,
    preview: Option<MovePreview>,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            preview: None,
        }
    }

    pub fn preview(&self) -> Option<MovePreview> {
        self.preview
    }

    /// Record that `source` would move to `target`. Pointing at itself clears the hint.
    pub fn preview_move_item(&mut self, source: ItemId, target: ItemId) {
        self.preview = (source != target).then_some(MovePreview { source, target });
    }

    /// Abandon a drag.
    pub fn cancel_drag(&mut self) {
        self.preview = None;
    }

    /// Apply `action` to the board. Any commit ends the drag. Returns whether the board
    /// changed.
    pub fn commit(&mut self, action: BoardAction) -> bool {
        self.preview = None;
        self.board.apply_in_place(action)
    }
}
