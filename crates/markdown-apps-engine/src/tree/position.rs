use serde::Serialize;

/// A single location in the source text.
///
/// `line` and `column` are 1-based, `column` counts characters. `offset` is the
/// byte offset into the full document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A `[start, end)` range over the original document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

/// The span of a fenced block, measured over the full document it was parsed from.
pub type Span = Position;

impl Point {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Position {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Byte range covered by this position.
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps byte offsets to line/column points for one text.
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    /// Offsets past the end of the text are clamped, as are offsets that fall inside
    /// a multi-byte character.
    pub fn point(&self, offset: usize) -> Point {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line_idx];
        let column = self.text[line_start..offset].chars().count() + 1;

        Point {
            line: line_idx + 1,
            column,
            offset,
        }
    }

    pub fn position(&self, range: std::ops::Range<usize>) -> Position {
        Position {
            start: self.point(range.start),
            end: self.point(range.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_character_is_line_one_column_one() {
        let index = LineIndex::new("abc");
        assert_eq!(
            index.point(0),
            Point {
                line: 1,
                column: 1,
                offset: 0
            }
        );
    }

    #[test]
    fn offset_after_newline_starts_next_line() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.point(3).line, 2);
        assert_eq!(index.point(3).column, 1);
        assert_eq!(index.point(5).column, 3);
        assert_eq!(index.point(6).line, 3);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let index = LineIndex::new("é```");
        let point = index.point(5);
        assert_eq!(point.column, 5);
        assert_eq!(point.offset, 5);
    }

    #[test]
    fn offsets_are_clamped_to_text() {
        let index = LineIndex::new("ab");
        assert_eq!(index.point(99).offset, 2);
    }

    #[test]
    fn position_length() {
        let index = LineIndex::new("hello\nworld");
        let pos = index.position(2..8);
        assert_eq!(pos.len(), 6);
        assert_eq!(pos.byte_range(), 2..8);
        assert!(!pos.is_empty());
    }
}
