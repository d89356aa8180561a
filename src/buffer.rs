//! Text buffer capability
//!
//! The annotation core never talks to a concrete editor widget. It needs a
//! buffer it can read line by line and a way to attach live markers to
//! sub-ranges of the text; `TextBuffer` names exactly that. The browser
//! implementation lives in [`crate::wasm`]; [`MemoryBuffer`] is the in-process
//! one used by the native binary and the tests.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::normalize::{line_len, LineSource};
use crate::range::{Position, Range};
use crate::store::AnnotationId;

/// Opaque handle to a live marker owned by the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Metadata attached to a marker when it is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTag {
    /// The annotation this marker belongs to
    pub annotation_id: AnnotationId,
    /// CSS classes applied to the marked text
    pub class_name: String,
}

/// A mutable text buffer with live range markers
pub trait TextBuffer: LineSource {
    /// Full buffer contents
    fn text(&self) -> String;

    /// Replace the full contents. Existing markers are dropped.
    fn set_text(&mut self, text: &str);

    fn line_count(&self) -> usize;

    /// Attach a live marker to `range`
    fn mark_range(&mut self, range: Range, tag: MarkerTag) -> MarkerHandle;

    /// Remove a marker. Unknown handles are ignored.
    fn clear_marker(&mut self, handle: MarkerHandle);

    /// Current bounds of a marker, after any edits the buffer has applied
    fn marker_range(&self, handle: MarkerHandle) -> Option<Range>;

    /// Every live marker, in creation order
    fn markers(&self) -> Vec<MarkerHandle>;

    /// Markers overlapping `range` (ends included) with the annotation each carries
    fn find_markers(&self, range: Range) -> Vec<(MarkerHandle, AnnotationId)>;
}

/// Marker bounds as char offsets into the buffer text
#[derive(Debug, Clone)]
struct LiveMarker {
    start: usize,
    end: usize,
    tag: MarkerTag,
}

/// In-memory buffer with auto-adjusting markers
///
/// Lines are split on `\n`. Text inserted exactly at a marker boundary lands
/// outside the marker; deleted text collapses marker bounds onto the
/// deletion point.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    text: String,
    markers: BTreeMap<u64, LiveMarker>,
    next_marker: u64,
}

impl MemoryBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markers: BTreeMap::new(),
            next_marker: 0,
        }
    }

    fn lines(&self) -> std::str::Split<'_, char> {
        self.text.split('\n')
    }

    /// Char offset of `position`, clamped to the buffer
    pub fn offset_of(&self, position: Position) -> usize {
        let mut offset = 0;
        for (index, line) in self.lines().enumerate() {
            let len = line_len(line);
            if index == position.line {
                return offset + position.column.min(len);
            }
            offset += len + 1;
        }
        // Past the last line: clamp to the end of the text
        offset.saturating_sub(1)
    }

    /// Position of a char offset, clamped to the buffer
    pub fn position_at(&self, offset: usize) -> Position {
        let mut remaining = offset;
        let mut last = Position::default();
        for (index, line) in self.lines().enumerate() {
            let len = line_len(line);
            if remaining <= len {
                return Position::new(index, remaining);
            }
            remaining -= len + 1;
            last = Position::new(index, len);
        }
        last
    }

    fn byte_index(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(byte, _)| byte)
            .unwrap_or(self.text.len())
    }

    /// Insert `text` at `at`, shifting markers that follow it
    pub fn insert(&mut self, at: Position, text: &str) {
        let offset = self.offset_of(at);
        let byte = self.byte_index(offset);
        self.text.insert_str(byte, text);

        let inserted = line_len(text);
        for marker in self.markers.values_mut() {
            if marker.start >= offset {
                marker.start += inserted;
            }
            if marker.end > offset {
                marker.end += inserted;
            }
            marker.end = marker.end.max(marker.start);
        }
    }

    /// Delete the text in `range`, pulling markers back over the gap
    pub fn delete(&mut self, range: Range) {
        let from = self.offset_of(range.start);
        let to = self.offset_of(range.end);
        if from >= to {
            return;
        }
        let byte_from = self.byte_index(from);
        let byte_to = self.byte_index(to);
        self.text.replace_range(byte_from..byte_to, "");

        let removed = to - from;
        let shift = |x: usize| {
            if x <= from {
                x
            } else if x >= to {
                x - removed
            } else {
                from
            }
        };
        for marker in self.markers.values_mut() {
            marker.start = shift(marker.start);
            marker.end = shift(marker.end);
        }
    }

    /// Metadata attached to a marker
    pub fn marker_tag(&self, handle: MarkerHandle) -> Option<&MarkerTag> {
        self.markers.get(&handle.0).map(|m| &m.tag)
    }
}

impl LineSource for MemoryBuffer {
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.lines().nth(line).map(Cow::Borrowed)
    }
}

impl TextBuffer for MemoryBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.markers.clear();
    }

    fn line_count(&self) -> usize {
        self.lines().count()
    }

    fn mark_range(&mut self, range: Range, tag: MarkerTag) -> MarkerHandle {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end).max(start);
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(handle.0, LiveMarker { start, end, tag });
        handle
    }

    fn clear_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle.0);
    }

    fn marker_range(&self, handle: MarkerHandle) -> Option<Range> {
        self.markers.get(&handle.0).map(|m| Range {
            start: self.position_at(m.start),
            end: self.position_at(m.end),
        })
    }

    fn markers(&self) -> Vec<MarkerHandle> {
        self.markers.keys().copied().map(MarkerHandle).collect()
    }

    fn find_markers(&self, range: Range) -> Vec<(MarkerHandle, AnnotationId)> {
        let from = self.offset_of(range.start);
        let to = self.offset_of(range.end);
        self.markers
            .iter()
            .filter(|(_, m)| m.start <= to && from <= m.end)
            .map(|(handle, m)| (MarkerHandle(*handle), m.tag.annotation_id))
            .collect()
    }
}
