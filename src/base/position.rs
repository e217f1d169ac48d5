/// Position tracking for syntax nodes
///
/// Stores the source location (line/column plus byte offset) of syntax nodes
/// so edits can be spliced back into the original text.
use std::fmt;
use text_size::{TextRange, TextSize};

/// A span representing a range in source code (0-indexed lines and columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: TextSize,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Byte range covered by this span
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start.offset, self.end.offset.max(self.start.offset))
    }

    /// Check if a byte offset falls within this span (end exclusive)
    pub fn contains(&self, offset: TextSize) -> bool {
        self.range().contains(offset)
    }

    /// Check if another span nests inside this one
    pub fn encloses(&self, other: &Span) -> bool {
        self.range().contains_range(other.range())
    }

    /// Slice the covered text out of `source`.
    ///
    /// Returns `None` when the span does not describe `source` (stale span).
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start_offset()..self.end_offset())
    }

    pub fn start_offset(&self) -> usize {
        usize::from(self.start.offset)
    }

    pub fn end_offset(&self) -> usize {
        usize::from(self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line + 1,
            self.start.column + 1,
            self.end.line + 1,
            self.end.column + 1
        )
    }
}

impl Position {
    pub fn new(line: usize, column: usize, offset: TextSize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of every line
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(idx as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Resolve an offset to a position; offsets past the end clamp to EOF.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = usize::from(offset - self.line_starts[line]);
        Position::new(line, column, offset)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
