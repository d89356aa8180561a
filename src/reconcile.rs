//! Reconciliation between the store and the buffer's markers
//!
//! The store is authoritative for which annotations exist; the buffer is
//! authoritative for where their markers currently sit, since it moves them
//! as the code is edited.

use std::collections::HashSet;

use crate::buffer::{MarkerHandle, TextBuffer};
use crate::marker::{self, marker_tag};
use crate::range::Range;
use crate::store::AnnotationStore;

/// Current extent of a set of markers: first live marker's start to last
/// live marker's end. Markers the buffer no longer tracks are skipped.
pub(crate) fn live_range<B: TextBuffer + ?Sized>(buffer: &B, markers: &[MarkerHandle]) -> Option<Range> {
    let mut live = markers.iter().filter_map(|handle| buffer.marker_range(*handle));
    let first = live.next()?;
    let last = live.last().unwrap_or(first);
    Some(Range::new(first.start, last.end))
}

impl AnnotationStore {
    /// Clear the markers of every annotation, keeping the annotations
    pub fn clear_markers<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B) {
        for annotation in &mut self.annotations {
            for handle in annotation.markers.drain(..) {
                buffer.clear_marker(handle);
            }
        }
    }

    /// Clear every live marker in the buffer and re-project each annotation
    /// from its stored range
    pub fn rebuild_markers<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B) {
        for handle in buffer.markers() {
            buffer.clear_marker(handle);
        }

        let marker_class = &self.marker_class;
        for annotation in &mut self.annotations {
            let tag = marker_tag(marker_class, annotation.id, annotation.color_index);
            annotation.markers = marker::project(buffer, annotation.range, &tag);
        }
    }

    /// Re-derive stored ranges from live marker geometry
    ///
    /// Returns the number of annotations whose range moved.
    pub fn refresh_ranges<B: TextBuffer + ?Sized>(&mut self, buffer: &B) -> usize {
        let mut moved = 0;
        for annotation in &mut self.annotations {
            match live_range(buffer, &annotation.markers) {
                Some(live) if live != annotation.range => {
                    tracing::trace!(
                        "Annotation {} moved from {} to {}",
                        annotation.id,
                        annotation.range,
                        live
                    );
                    annotation.range = live;
                    moved += 1;
                }
                _ => {}
            }
        }
        moved
    }

    /// Whether the buffer's markers exactly mirror the store: every
    /// annotation has at least one live marker, and every live marker
    /// belongs to exactly one annotation
    pub fn is_reconciled<B: TextBuffer + ?Sized>(&self, buffer: &B) -> bool {
        let live: HashSet<MarkerHandle> = buffer.markers().into_iter().collect();
        let mut owned = HashSet::new();

        for annotation in &self.annotations {
            if annotation.markers.is_empty() {
                return false;
            }
            for handle in &annotation.markers {
                if !live.contains(handle) || !owned.insert(*handle) {
                    return false;
                }
            }
        }

        owned.len() == live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{MarkerTag, MemoryBuffer};
    use crate::range::Position;
    use crate::store::AnnotationId;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_rebuild_drops_foreign_markers() {
        let mut buffer = MemoryBuffer::new("for i in range(3):\n    print(i)");
        let mut store = AnnotationStore::with_palette(4, "cm-mark");
        store
            .add(&mut buffer, Range::new(pos(0, 0), pos(1, 12)), "loop")
            .unwrap();
        buffer.mark_range(
            Range::new(pos(0, 0), pos(0, 3)),
            MarkerTag {
                annotation_id: AnnotationId(77),
                class_name: "stray".to_string(),
            },
        );
        assert!(!store.is_reconciled(&buffer));

        store.rebuild_markers(&mut buffer);
        assert!(store.is_reconciled(&buffer));
        assert_eq!(buffer.markers().len(), 2);
    }

    #[test]
    fn test_cleared_marker_is_not_reconciled() {
        let mut buffer = MemoryBuffer::new("x = 1");
        let mut store = AnnotationStore::with_palette(4, "cm-mark");
        let handle = store
            .add(&mut buffer, Range::new(pos(0, 0), pos(0, 5)), "x")
            .unwrap()
            .markers[0];
        assert!(store.is_reconciled(&buffer));

        buffer.clear_marker(handle);
        assert!(!store.is_reconciled(&buffer));
    }

    #[test]
    fn test_refresh_ranges_follows_edits() {
        let mut buffer = MemoryBuffer::new("def f():\n    return 1\n\nf()");
        let mut store = AnnotationStore::with_palette(4, "cm-mark");
        let id = store
            .add(&mut buffer, Range::new(pos(0, 0), pos(1, 12)), "function")
            .unwrap()
            .id;
        let call = store
            .add(&mut buffer, Range::new(pos(3, 0), pos(3, 3)), "call")
            .unwrap()
            .id;

        assert_eq!(store.refresh_ranges(&buffer), 0);

        buffer.insert(pos(0, 0), "import os\n");
        assert_eq!(store.refresh_ranges(&buffer), 2);
        assert_eq!(
            store.find_by_id(id).unwrap().range,
            Range::new(pos(1, 0), pos(2, 12))
        );
        assert_eq!(
            store.find_by_id(call).unwrap().range,
            Range::new(pos(4, 0), pos(4, 3))
        );
    }

    #[test]
    fn test_live_range_without_markers() {
        let buffer = MemoryBuffer::new("x");
        assert!(live_range(&buffer, &[]).is_none());
        assert!(live_range(&buffer, &[MarkerHandle(12)]).is_none());
    }

    #[test]
    fn test_live_range_skips_lost_markers() {
        let mut buffer = MemoryBuffer::new("items = [\n    1,\n]");
        let mut store = AnnotationStore::with_palette(4, "cm-mark");
        let markers = store
            .add(&mut buffer, Range::new(pos(0, 0), pos(2, 1)), "list")
            .unwrap()
            .markers
            .clone();
        assert_eq!(markers.len(), 3);

        buffer.clear_marker(markers[0]);
        assert_eq!(
            live_range(&buffer, &markers),
            Some(Range::new(pos(1, 4), pos(2, 1)))
        );

        buffer.clear_marker(markers[2]);
        assert_eq!(
            live_range(&buffer, &markers),
            Some(Range::new(pos(1, 4), pos(1, 6)))
        );
    }
}
