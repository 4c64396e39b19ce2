//! Line/column position tracking.
//!
//! Every [`IncludeFrame`](../cfg_include/enum.IncludeFrame.html) starts at
//! `(1, 1)` and advances as characters are consumed; a [`Span`] glues a
//! start and end [`Position`] together the way a token's location spans
//! `(first_line, first_column)` to `(last_line, last_column)`.

mod cursor;
mod span;

pub use cursor::Cursor;
pub use span::Span;

/// A 1-indexed line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
