//! Marker projection
//!
//! Turns an annotation's range into the markers the editor renders: one
//! marker for a single-line range, one per line otherwise. Each marker is
//! trimmed to the code on its line so indentation between lines is never
//! highlighted, and each carries the annotation id so a hovered marker
//! can be traced back to its note.

use crate::buffer::{MarkerHandle, MarkerTag, TextBuffer};
use crate::normalize::{content_end, first_non_whitespace, line_len, LineSource};
use crate::range::{Position, Range};
use crate::store::AnnotationId;

/// CSS classes for a marker in the given palette slot
///
/// Every marker gets the base class plus `<base>-<color_index>`.
pub fn color_class(marker_class: &str, color_index: usize) -> String {
    format!("{} {}-{}", marker_class, marker_class, color_index)
}

/// Tag attached to every marker of one annotation
pub fn marker_tag(marker_class: &str, annotation_id: AnnotationId, color_index: usize) -> MarkerTag {
    MarkerTag {
        annotation_id,
        class_name: color_class(marker_class, color_index),
    }
}

/// Split a range into the per-line spans that get markers
///
/// A single-line range is returned unchanged. For a multi-line range:
/// - the first line runs from the later of the start column and the first
///   non-whitespace character to the end of the line's content;
/// - inner lines run from their first non-whitespace character (0 when
///   blank) to the end of their content;
/// - the last line runs from its first non-whitespace character to the end
///   column, collapsing to a zero-width span when the end column sits inside
///   the indentation.
///
/// Lines with no content still yield a zero-width span.
pub fn line_spans<L: LineSource + ?Sized>(range: Range, lines: &L) -> Vec<Range> {
    if !range.is_multi_line() {
        return vec![range];
    }

    let Range { start, end } = range;
    (start.line..=end.line)
        .map(|line| {
            let text = lines.line_text(line).unwrap_or_default();
            let indent = first_non_whitespace(&text).unwrap_or(0);

            let (from, to) = if line == start.line {
                (start.column.max(indent), content_end(&text))
            } else if line == end.line {
                (indent.min(end.column), end.column)
            } else {
                (indent, content_end(&text))
            };

            let from = from.min(line_len(&text));
            Range {
                start: Position::new(line, from),
                end: Position::new(line, to.max(from)),
            }
        })
        .collect()
}

/// Create the markers for `range`, all carrying `tag`
pub fn project<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    range: Range,
    tag: &MarkerTag,
) -> Vec<MarkerHandle> {
    let spans = line_spans(range, &*buffer);
    tracing::trace!(
        "Projecting annotation {} over {} as {} marker(s)",
        tag.annotation_id,
        range,
        spans.len()
    );

    spans
        .into_iter()
        .map(|span| buffer.mark_range(span, tag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::normalize::normalize_range;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_color_class() {
        assert_eq!(color_class("cm-mark", 2), "cm-mark cm-mark-2");
    }

    #[test]
    fn test_single_line_one_span() {
        let lines = ["  print(x)"];
        let range = Range::new(pos(0, 5), pos(0, 10));
        assert_eq!(line_spans(range, &lines[..]), vec![range]);
    }

    #[test]
    fn test_two_line_function() {
        let lines = ["    def f():", "        return 1"];
        let raw = Range::new(pos(0, 0), pos(1, 17));
        let normalized = normalize_range(raw, &lines[..]);
        assert_eq!(normalized.start, pos(0, 4));

        let spans = line_spans(normalized, &lines[..]);
        assert_eq!(
            spans,
            vec![
                Range::new(pos(0, 4), pos(0, 12)),
                Range::new(pos(1, 8), pos(1, 16)),
            ]
        );
    }

    #[test]
    fn test_inner_lines_trimmed() {
        let lines = ["x = [", "    1,  ", "", "    ", "]"];
        let range = Range::new(pos(0, 0), pos(4, 1));
        let spans = line_spans(range, &lines[..]);

        assert_eq!(spans.len(), 5);
        assert_eq!(spans[0], Range::new(pos(0, 0), pos(0, 5)));
        assert_eq!(spans[1], Range::new(pos(1, 4), pos(1, 6)));
        assert_eq!(spans[2], Range::point(pos(2, 0)));
        assert_eq!(spans[3], Range::point(pos(3, 0)));
        assert_eq!(spans[4], Range::new(pos(4, 0), pos(4, 1)));
    }

    #[test]
    fn test_end_inside_indentation_is_zero_width() {
        let lines = ["if x:", "    y()"];
        let range = Range::new(pos(0, 0), pos(1, 0));
        let spans = line_spans(range, &lines[..]);

        assert_eq!(spans[1], Range::point(pos(1, 0)));
    }

    #[test]
    fn test_start_in_trailing_whitespace() {
        let lines = ["a = 1    ", "b = 2"];
        let range = Range::new(pos(0, 7), pos(1, 5));
        let spans = line_spans(range, &lines[..]);

        assert_eq!(spans[0], Range::point(pos(0, 7)));
        assert_eq!(spans[1], Range::new(pos(1, 0), pos(1, 5)));
    }

    #[test]
    fn test_project_tags_every_marker() {
        let mut buffer = MemoryBuffer::new("def f():\n    a = 1\n    return a");
        let tag = marker_tag("cm-mark", AnnotationId(9), 1);
        let handles = project(&mut buffer, Range::new(pos(0, 0), pos(2, 12)), &tag);

        assert_eq!(handles.len(), 3);
        for handle in &handles {
            let attached = buffer.marker_tag(*handle).unwrap();
            assert_eq!(attached.annotation_id, AnnotationId(9));
            assert_eq!(attached.class_name, "cm-mark cm-mark-1");
        }
        assert_eq!(
            buffer.marker_range(handles[1]).unwrap(),
            Range::new(pos(1, 4), pos(1, 9))
        );
    }
}
