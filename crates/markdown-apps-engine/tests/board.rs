use markdown_apps_engine::apps::Registry;
use markdown_apps_engine::apps::board::markdown::{deserialize, serialize};
use markdown_apps_engine::apps::board::{Board, BoardAction, BoardState, ItemId, actions};
use markdown_apps_engine::editing::{EditQueue, Page};
use markdown_apps_engine::render::{DisplayNode, RenderContext, UiEvent};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// Render `page` with edits going to `queue`, components expanded.
fn view(page: &Page, queue: &EditQueue) -> DisplayNode {
    let context = RenderContext::new(Registry::global(), queue.callback());
    page.render(&context).unwrap().expand()
}

/// Apply the pending edit, as a host does after each event.
fn settle(page: &mut Page, queue: &EditQueue) {
    if let Some(edit) = queue.take_last() {
        page.apply_edit(&edit);
    }
}

#[test]
fn built_board_survives_serialization() {
    let board = Board::new()
        .apply(BoardAction::AddList("Todo".to_string()))
        .apply(BoardAction::AddItem {
            list: 0,
            text: "Write docs".to_string(),
        })
        .apply(BoardAction::AddList("Done".to_string()))
        .apply(BoardAction::AddItem {
            list: 1,
            text: "Parser".to_string(),
        });

    assert_eq!(deserialize(&serialize(&board)), board);
}

#[rstest]
#[case::binary("\u{0}\u{1}\u{2}")]
#[case::deep_nesting("* a\n      * b\n            * c")]
#[case::markdown_noise("# title\n> quote\n| t |\n")]
#[case::lone_markers("*\n-\n  *\n")]
fn deserialize_accepts_anything(#[case] input: &str) {
    let board = deserialize(input);
    assert_eq!(deserialize(&serialize(&board)), board);
}

#[test]
fn move_between_lists_and_onto_itself() {
    let board = deserialize("* A\n  * x\n  * y\n* B\n  * z");

    let moved = board.clone().apply(BoardAction::MoveItem {
        source: ItemId::new(0, 0),
        target: ItemId::new(1, 1),
    });
    assert_eq!(serialize(&moved), "* A\n  * y\n* B\n  * z\n  * x");

    let unchanged = board.clone().apply(BoardAction::MoveItem {
        source: ItemId::new(0, 0),
        target: ItemId::new(0, 0),
    });
    assert_eq!(unchanged, board);
}

#[test]
fn previews_then_cancel_leave_serialization_unchanged() {
    let text = "* A\n  * x\n  * y\n* B\n  * z";
    let mut state = BoardState::new(deserialize(text));

    state.preview_move_item(ItemId::new(0, 0), ItemId::new(1, 0));
    state.preview_move_item(ItemId::new(0, 0), ItemId::new(0, 1));
    state.preview_move_item(ItemId::new(0, 1), ItemId::new(1, 1));
    state.cancel_drag();

    assert_eq!(serialize(&state.board), text);
}

#[test]
fn editing_through_the_page_rewrites_only_the_board() {
    let original = fixture("board");
    let mut page = Page::from_text(&original);
    let queue = EditQueue::new();

    let rendered = view(&page, &queue);
    rendered.find_by_action(actions::ITEM_TEXT)[1].dispatch(&UiEvent::Input("Lexer".to_string()));
    rendered.find_by_action(actions::ADD_ITEM)[1].dispatch(&UiEvent::Click);
    settle(&mut page, &queue);

    let expected = original.replace(
        "* Doing\n  * Parser\n* Done\n```",
        "* Doing\n  * Parser\n  * Lexer\n* Done\n```",
    );
    assert_eq!(page.text(), expected);
    assert_eq!(page.version(), 1);
}

#[test]
fn drag_and_drop_across_renders() {
    let mut page = Page::from_text("```kanban\n* A\n  * x\n  * y\n* B\n```\n");
    let queue = EditQueue::new();

    let rendered = view(&page, &queue);
    let cards = rendered.find_by_action(actions::CARD);
    cards[0].dispatch(&UiEvent::DragStart);
    let zones = rendered.find_by_action(actions::DROP_ZONE);
    zones[1].dispatch(&UiEvent::DragEnter);
    assert!(queue.is_empty(), "previewing must not edit");
    zones[1].dispatch(&UiEvent::Drop);
    settle(&mut page, &queue);

    assert_eq!(page.text(), "```kanban\n* A\n  * y\n* B\n  * x\n```\n");

    let rendered = view(&page, &queue);
    rendered.find_by_action(actions::REMOVE_LIST)[0].dispatch(&UiEvent::Click);
    settle(&mut page, &queue);

    assert_eq!(page.text(), "```kanban\n* B\n  * x\n```\n");
    assert_eq!(page.version(), 2);
}

#[test]
fn nested_board_edit_keeps_list_structure() {
    let original = fixture("board");
    let mut page = Page::from_text(&original);
    let queue = EditQueue::new();

    let rendered = view(&page, &queue);
    // The nested board's card comes last on the page
    let remove_item = rendered.find_by_action(actions::REMOVE_ITEM);
    remove_item[remove_item.len() - 1].dispatch(&UiEvent::Click);
    settle(&mut page, &queue);

    assert_eq!(
        page.text(),
        original.replace("  * Ideas\n    * Drag and drop\n", "  * Ideas\n")
    );
    let apps = page.applications(Registry::global());
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[1].position.start.column, 3);
}

#[test]
fn abandoned_drag_does_not_touch_the_page() {
    let text = fixture("board");
    let page = Page::from_text(&text);
    let queue = EditQueue::new();

    let rendered = view(&page, &queue);
    let cards = rendered.find_by_action(actions::CARD);
    cards[0].dispatch(&UiEvent::DragStart);
    cards[2].dispatch(&UiEvent::DragEnter);
    cards[0].dispatch(&UiEvent::DragEnd);
    cards[2].dispatch(&UiEvent::Drop);

    assert!(queue.is_empty());
    assert_eq!(page.text(), text);
}
