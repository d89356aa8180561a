//! Selection normalization
//!
//! Trims a raw multi-line selection so the annotated range begins on code
//! rather than indentation and never ends past a line's content.
//! Single-line selections are taken as-is.

use std::borrow::Cow;

use crate::range::{Position, Range};

/// Read access to buffer lines
///
/// Columns are counted in `char`s.
pub trait LineSource {
    /// Content of `line` without its line terminator, or `None` past the end
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.get(line).map(|l| Cow::Borrowed(l.as_ref()))
    }
}

/// Column of the first non-whitespace character, `None` for blank lines
pub fn first_non_whitespace(line: &str) -> Option<usize> {
    line.chars().position(|c| !c.is_whitespace())
}

/// Length of the line in columns
pub fn line_len(line: &str) -> usize {
    line.chars().count()
}

/// Column just past the last non-whitespace character, 0 for blank lines
pub fn content_end(line: &str) -> usize {
    line_len(line.trim_end())
}

/// Normalize a raw selection
///
/// For a multi-line selection the start column moves forward to the first
/// non-whitespace character of its line (never backward), and the end column
/// is clamped to the length of its line. Lines in between are left to the
/// marker projector.
pub fn normalize_range<L: LineSource + ?Sized>(range: Range, lines: &L) -> Range {
    if !range.is_multi_line() {
        return range;
    }

    let mut start = range.start;
    let mut end = range.end;

    if let Some(first) = lines
        .line_text(start.line)
        .and_then(|text| first_non_whitespace(&text))
    {
        if first > start.column {
            start = Position::new(start.line, first);
        }
    }

    let end_len = lines
        .line_text(end.line)
        .map(|text| line_len(&text))
        .unwrap_or(0);
    if end.column > end_len {
        end = Position::new(end.line, end_len);
    }

    Range { start, end }
}
