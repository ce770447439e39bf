// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_page(sections: usize) -> String {
    let base = "## Section\n\nParagraph with [a link](./Other.md) and *emphasis*.\n\n- Bullet point\n  - Nested item\n\n```rust\nfn example() {}\n```\n\n";
    let mut content = String::from("# Title\n\n");
    for section in 0..sections {
        content.push_str(base);
        if section % 4 == 0 {
            content.push_str(&generate_board(3, 5));
        }
    }
    content
}

#[allow(dead_code)]
pub fn generate_board(lists: usize, items: usize) -> String {
    let mut content = String::from("```kanban\n");
    for list in 0..lists {
        content.push_str(&format!("* List {list}\n"));
        for item in 0..items {
            content.push_str(&format!("  * Item {item} of list {list}\n"));
        }
    }
    content.push_str("```\n\n");
    content
}
