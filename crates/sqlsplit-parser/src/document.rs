//! Script document abstraction.
//!
//! The splitter reads its input through [ScriptDocument] rather than a bare
//! `&str`, so hosts with their own buffer types can implement the line and
//! offset queries themselves over a contiguous text view. [TextDocument] is
//! the plain-string implementation used by the convenience entry points.

use sqlsplit_common::CodeLocation;

pub trait ScriptDocument {
    /// Length of the document in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full document text.
    fn text(&self) -> &str;

    /// The character starting at byte `offset`.
    ///
    /// Panics if `offset` is out of bounds or not a character boundary;
    /// offsets handed to a document must come from scanning that document.
    fn char_at(&self, offset: usize) -> char;

    /// The 1-based line number containing byte `offset`.
    fn line_of_offset(&self, offset: usize) -> usize;

    /// The full location (line, column, byte index) of `offset`.
    fn location_of(&self, offset: usize) -> CodeLocation {
        let line = self.line_of_offset(offset);
        let text = self.text();
        let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = text[line_start..offset].chars().count() + 1;
        CodeLocation::new(line, col, offset)
    }
}

/// A [ScriptDocument] over a borrowed string, with a precomputed line index
/// so `line_of_offset` is a binary search.
#[derive(Debug, Clone)]
pub struct TextDocument<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> TextDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        TextDocument { text, line_starts }
    }
}

impl ScriptDocument for TextDocument<'_> {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn text(&self) -> &str {
        self.text
    }

    fn char_at(&self, offset: usize) -> char {
        let mut chars = self.text[offset..].chars();
        match chars.next() {
            Some(c) => c,
            None => panic!("char_at past end of document: {offset}"),
        }
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}
