use serde::{Deserialize, Serialize};

use crate::error::CodeLocation;

/// A source span over a script.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Serialize, Deserialize, Hash, Ord,
)]
pub struct Span {
    /// start location of the span (inclusive)
    pub start: CodeLocation,
    /// stop location of the span (exclusive)
    pub stop: CodeLocation,
}

impl Span {
    pub fn new(start: CodeLocation, stop: CodeLocation) -> Self {
        Span { start, stop }
    }

    pub fn contains(&self, location: &CodeLocation) -> bool {
        &self.start <= location && location < &self.stop
    }

    pub fn is_empty(&self) -> bool {
        self.start.index >= self.stop.index
    }

    pub fn len(&self) -> usize {
        self.stop.index.saturating_sub(self.start.index)
    }

    /// The text this span covers in `input`.
    ///
    /// Panics if the span is out of bounds for `input`; spans are only
    /// meaningful against the document they were produced from.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.index..self.stop.index]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn span(start: usize, stop: usize) -> Span {
        Span::new(
            CodeLocation::new(1, start + 1, start),
            CodeLocation::new(1, stop + 1, stop),
        )
    }

    #[test]
    fn test_slice() {
        let input = "SELECT 1; SELECT 2";
        assert_eq!(span(0, 8).slice(input), "SELECT 1");
        assert_eq!(span(10, 18).slice(input), "SELECT 2");
    }

    #[test]
    fn test_contains() {
        let s = span(2, 5);
        assert!(s.contains(&CodeLocation::new(1, 3, 2)));
        assert!(s.contains(&CodeLocation::new(1, 5, 4)));
        assert!(!s.contains(&CodeLocation::new(1, 6, 5)));
        assert!(!s.contains(&CodeLocation::new(1, 2, 1)));
    }

    #[test]
    fn test_len() {
        assert_eq!(span(3, 9).len(), 6);
        assert!(span(4, 4).is_empty());
    }
}
