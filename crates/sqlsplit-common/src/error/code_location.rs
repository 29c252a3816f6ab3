use std::cmp;

use serde::{Deserialize, Serialize};

/// A position in a script, tracked three ways at once so that both
/// editor-facing consumers (line/column) and executor-facing consumers
/// (byte offset) get what they need without a second scan.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CodeLocation {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number (unicode characters)
    pub col: usize,
    /// 0-based byte offset
    pub index: usize,
}

impl CodeLocation {
    pub fn new(line: usize, col: usize, index: usize) -> Self {
        CodeLocation { line, col, index }
    }

    /// Location of the start of a document (line 1, column 1).
    ///
    /// Note: this is *not* the same as `CodeLocation::default()`, which is
    /// the "unknown location" sentinel.
    pub fn start_of_file() -> Self {
        CodeLocation {
            line: 1,
            col: 1,
            index: 0,
        }
    }

    /// Whether this location carries valid line and column info.
    pub fn has_position(&self) -> bool {
        self.line != 0 || self.col != 0
    }

    /// Returns a new location advanced as if `c` was consumed at this one.
    pub fn advance(&self, c: char) -> Self {
        if c == '\n' {
            CodeLocation::new(self.line + 1, 1, self.index + c.len_utf8())
        } else {
            CodeLocation::new(self.line, self.col + 1, self.index + c.len_utf8())
        }
    }

    /// Returns a new location advanced as if all characters in `s` were
    /// consumed after this one.
    pub fn advance_by_text(&self, s: &str) -> Self {
        let mut line = self.line;
        let mut col = self.col;
        for c in s.chars() {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        CodeLocation::new(line, col, self.index + s.len())
    }
}

impl Ord for CodeLocation {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl PartialOrd for CodeLocation {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl std::fmt::Debug for CodeLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}({})", self.line, self.col, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let loc = CodeLocation::start_of_file();
        let loc = loc.advance('S');
        assert_eq!(loc, CodeLocation::new(1, 2, 1));
        let loc = loc.advance('\n');
        assert_eq!(loc, CodeLocation::new(2, 1, 2));
    }

    #[test]
    fn test_advance_by_text() {
        let loc = CodeLocation::start_of_file().advance_by_text("ab\ncd");
        assert_eq!(loc, CodeLocation::new(2, 3, 5));
    }

    #[test]
    fn test_advance_multibyte() {
        let loc = CodeLocation::start_of_file().advance('é');
        assert_eq!(loc, CodeLocation::new(1, 2, 2));
    }

    #[test]
    fn test_ordering_by_index() {
        let a = CodeLocation::new(1, 5, 4);
        let b = CodeLocation::new(2, 1, 6);
        assert!(a < b);
    }
}
