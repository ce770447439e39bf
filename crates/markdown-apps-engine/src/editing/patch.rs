use std::ops::Range;

use xi_rope::delta::DeltaElement;
use xi_rope::{Delta, RopeInfo};

/// Result of applying an edit to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges of inserted text, in the new document
    pub changed: Vec<Range<usize>>,
    pub version: u64,
}

impl Patch {
    pub fn from_delta(delta: &Delta<RopeInfo>, version: u64) -> Self {
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in &delta.els {
            match op {
                DeltaElement::Copy(from, to) => cursor += to - from,
                DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    cursor += inserted.len();
                    changed.push(start..cursor);
                }
            }
        }
        Self { changed, version }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xi_rope::Rope;
    use xi_rope::delta::Builder;

    #[test]
    fn insert_ranges_are_in_new_coordinates() {
        let mut builder = Builder::new(11);
        builder.replace(6..11, Rope::from("there, world"));
        let patch = Patch::from_delta(&builder.build(), 3);

        assert_eq!(patch.changed, vec![6..18]);
        assert_eq!(patch.version, 3);
    }

    #[test]
    fn pure_deletion_changes_no_range() {
        let mut builder = Builder::new(11);
        builder.delete(0..6);
        let patch = Patch::from_delta(&builder.build(), 1);
        assert!(patch.changed.is_empty());
    }
}
