//! Board ⇄ two-level bullet outline.
//!
//! ```markdown
//! * Todo
//!   * Write docs
//! * Done
//! ```
//!
//! Reading is best-effort: the text may have been edited by hand, so lines that do not
//! fit the outline are skipped and reading never fails.

use std::sync::OnceLock;

use regex::Regex;

use super::model::{Board, BoardList};

pub fn serialize(board: &Board) -> String {
    board
        .lists
        .iter()
        .map(list_to_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_to_markdown(list: &BoardList) -> String {
    std::iter::once(format!("* {}", list.name))
        .chain(list.items.iter().map(|item| format!("  * {item}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse an outline into a board.
///
/// An unindented `*`/`-` bullet starts a list; an indented bullet adds an item to the
/// latest list. Item lines before the first list are dropped, as is anything else.
pub fn deserialize(text: &str) -> Board {
    static LIST_RE: OnceLock<Regex> = OnceLock::new();
    static ITEM_RE: OnceLock<Regex> = OnceLock::new();
    let list_re = LIST_RE.get_or_init(|| Regex::new(r"^[*-]\s*(.*)$").expect("Invalid list regex"));
    let item_re =
        ITEM_RE.get_or_init(|| Regex::new(r"^\s+[*-]\s*(.*)$").expect("Invalid item regex"));

    let mut board = Board::new();
    for line in text.lines() {
        if let Some(captures) = list_re.captures(line) {
            board.lists.push(BoardList::new(&captures[1]));
        } else if let Some(captures) = item_re.captures(line) {
            match board.lists.last_mut() {
                Some(list) => list.items.push(captures[1].to_string()),
                None => log::debug!("Dropping board item before any list: {line:?}"),
            }
        }
    }
    board
}
