//! Positions and ranges in the text buffer
//!
//! Positions are `(line, column)` pairs ordered line-first. They serialize
//! with the field names the editor uses (`{line, ch}`), so they travel
//! unchanged through the export document and the JS boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in the text buffer
///
/// Captured at selection time and not re-validated afterwards: if the buffer
/// changes, only the editor's live markers follow the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line index
    pub line: usize,
    /// Zero-based column within the line
    #[serde(rename = "ch")]
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A range between two positions, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    #[serde(rename = "from")]
    pub start: Position,
    #[serde(rename = "to")]
    pub end: Position,
}

impl Range {
    /// Create a range, swapping the endpoints if they arrive backwards
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at `point`
    pub fn point(point: Position) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// Whether `point` lies within the range, both ends included
    pub fn contains(&self, point: Position) -> bool {
        self.start <= point && point <= self.end
    }

    pub fn is_multi_line(&self) -> bool {
        self.start.line != self.end.line
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the two ranges share at least one position, ends included
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_new_orders_endpoints() {
        let range = Range::new(Position::new(3, 2), Position::new(1, 5));
        assert_eq!(range.start, Position::new(1, 5));
        assert_eq!(range.end, Position::new(3, 2));
    }

    #[test]
    fn test_contains_is_boundary_inclusive() {
        let range = Range::new(Position::new(0, 5), Position::new(0, 10));
        assert!(range.contains(Position::new(0, 5)));
        assert!(range.contains(Position::new(0, 10)));
        assert!(range.contains(Position::new(0, 7)));
        assert!(!range.contains(Position::new(0, 4)));
        assert!(!range.contains(Position::new(0, 11)));
        assert!(!range.contains(Position::new(1, 0)));
    }

    #[test]
    fn test_contains_across_lines() {
        let range = Range::new(Position::new(1, 8), Position::new(3, 2));
        assert!(range.contains(Position::new(2, 0)));
        assert!(range.contains(Position::new(2, 500)));
        assert!(!range.contains(Position::new(1, 7)));
        assert!(!range.contains(Position::new(3, 3)));
    }

    #[test]
    fn test_multi_line() {
        assert!(!Range::new(Position::new(4, 0), Position::new(4, 9)).is_multi_line());
        assert!(Range::new(Position::new(4, 0), Position::new(5, 0)).is_multi_line());
    }

    #[test]
    fn test_overlaps() {
        let a = Range::new(Position::new(0, 0), Position::new(0, 5));
        let b = Range::new(Position::new(0, 5), Position::new(0, 8));
        let c = Range::new(Position::new(0, 6), Position::new(0, 8));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps(&Range::point(Position::new(0, 3))));
    }

    #[test]
    fn test_serialization_uses_editor_field_names() {
        let range = Range::new(Position::new(1, 2), Position::new(3, 4));
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"from":{"line":1,"ch":2},"to":{"line":3,"ch":4}}"#);

        let parsed: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, range);
    }
}
