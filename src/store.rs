//! Annotation store
//!
//! The authoritative, ordered collection of annotations for one editor
//! session. The store is the only thing that creates or clears markers: every
//! mutation that changes an annotation's geometry or color goes through here
//! and keeps the buffer's markers in step.
//!
//! Colors are positional. The annotation at index `i` always has color
//! `i % palette_size`, so removing an annotation shifts the colors of all
//! the annotations after it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::buffer::{MarkerHandle, TextBuffer};
use crate::config::AnnotatorConfig;
use crate::error::{AnnotationError, Result};
use crate::marker::{self, marker_tag};
use crate::normalize::normalize_range;
use crate::range::{Position, Range};
use crate::reconcile::live_range;

/// Identifier of an annotation, unique within a session and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A note bound to a range of code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Normalized when the annotation is created
    pub range: Range,
    /// Note body, trimmed and non-empty
    pub text: String,
    /// Palette slot, always `index % palette_size`
    pub color_index: usize,
    /// Live markers owned by this annotation, one per covered line
    pub markers: Vec<MarkerHandle>,
}

impl Annotation {
    pub fn record(&self) -> AnnotationRecord {
        AnnotationRecord {
            id: self.id,
            range: self.range,
            text: self.text.clone(),
            color_index: Some(self.color_index),
        }
    }
}

/// An annotation without its markers, as exported and imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub range: Range,
    pub text: String,
    #[serde(
        rename = "colorIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub color_index: Option<usize>,
}

#[derive(Debug)]
pub struct AnnotationStore {
    pub(crate) annotations: Vec<Annotation>,
    next_id: u64,
    pub(crate) palette_size: usize,
    pub(crate) marker_class: String,
}

impl AnnotationStore {
    pub fn new(config: &AnnotatorConfig) -> Self {
        Self::with_palette(config.palette_size, config.marker_class.clone())
    }

    pub fn with_palette(palette_size: usize, marker_class: impl Into<String>) -> Self {
        Self {
            annotations: Vec::new(),
            next_id: 1,
            palette_size: palette_size.max(1),
            marker_class: marker_class.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    /// Annotations in store order
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    /// Records of every annotation in store order
    pub fn records(&self) -> Vec<AnnotationRecord> {
        self.annotations.iter().map(Annotation::record).collect()
    }

    fn allocate_id(&mut self) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Annotate `selection` with `text`
    ///
    /// The selection is normalized against the buffer, the annotation takes
    /// the next palette slot, and its markers are created.
    pub fn add<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        selection: Range,
        text: &str,
    ) -> Result<&Annotation> {
        if selection.is_empty() {
            return Err(AnnotationError::InvalidSelection(
                "select some code to annotate".to_string(),
            ));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(AnnotationError::EmptyText);
        }

        let range = normalize_range(selection, &*buffer);
        let id = self.allocate_id();
        let color_index = self.annotations.len() % self.palette_size;
        let tag = marker_tag(&self.marker_class, id, color_index);
        let markers = marker::project(buffer, range, &tag);

        tracing::debug!("Added annotation {} over {} (color {})", id, range, color_index);

        let index = self.annotations.len();
        self.annotations.push(Annotation {
            id,
            range,
            text: text.to_string(),
            color_index,
            markers,
        });
        Ok(&self.annotations[index])
    }

    pub fn find_by_id(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// First annotation, in store order, whose stored range contains `point`
    pub fn find_at_point(&self, point: Position) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.range.contains(point))
    }

    /// The annotation owning `handle`
    pub fn owner_of(&self, handle: MarkerHandle) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.markers.contains(&handle))
    }

    /// Replace an annotation's text
    pub fn edit(&mut self, id: AnnotationId, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AnnotationError::EmptyText);
        }
        let annotation = self
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AnnotationError::NotFound(id))?;

        annotation.text = text.to_string();
        tracing::debug!("Edited annotation {}", id);
        Ok(())
    }

    /// Remove an annotation, clear its markers and recolor the rest
    ///
    /// Every remaining annotation is checked, not just those after the removed
    /// one, since imported colors need not be positional.
    pub fn remove<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        id: AnnotationId,
    ) -> Result<Annotation> {
        let index = self
            .annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or(AnnotationError::NotFound(id))?;

        let mut removed = self.annotations.remove(index);
        for handle in removed.markers.drain(..) {
            buffer.clear_marker(handle);
        }
        let recolored = self.recolor(buffer);

        tracing::debug!(
            "Removed annotation {} ({} annotation(s) recolored)",
            id,
            recolored
        );
        Ok(removed)
    }

    /// Reassign `index % palette_size` to every annotation, re-projecting
    /// the markers of each one whose color changed
    fn recolor<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B) -> usize {
        let palette_size = self.palette_size;
        let marker_class = &self.marker_class;
        let mut recolored = 0;

        for (index, annotation) in self.annotations.iter_mut().enumerate() {
            let color_index = index % palette_size;
            if annotation.color_index == color_index {
                continue;
            }

            if let Some(live) = live_range(&*buffer, &annotation.markers) {
                annotation.range = live;
            }
            for handle in annotation.markers.drain(..) {
                buffer.clear_marker(handle);
            }
            annotation.color_index = color_index;
            let tag = marker_tag(marker_class, annotation.id, color_index);
            annotation.markers = marker::project(buffer, annotation.range, &tag);
            recolored += 1;
        }

        recolored
    }

    /// Replace every annotation with `records`
    ///
    /// Ids are kept. A record's color is kept when it fits the palette,
    /// otherwise it gets its positional slot. Records repeating an id already
    /// taken are skipped. All markers are rebuilt afterwards.
    pub fn replace_all<B, I>(&mut self, buffer: &mut B, records: I)
    where
        B: TextBuffer + ?Sized,
        I: IntoIterator<Item = AnnotationRecord>,
    {
        self.clear_markers(buffer);
        self.annotations.clear();

        for record in records {
            if self.annotations.iter().any(|a| a.id == record.id) {
                tracing::warn!("Skipping duplicate annotation id {}", record.id);
                continue;
            }
            let position = self.annotations.len();
            let color_index = record
                .color_index
                .filter(|c| *c < self.palette_size)
                .unwrap_or(position % self.palette_size);

            self.next_id = self.next_id.max(record.id.0.saturating_add(1));
            self.annotations.push(Annotation {
                id: record.id,
                range: record.range,
                text: record.text,
                color_index,
                markers: Vec::new(),
            });
        }

        self.rebuild_markers(buffer);
        tracing::debug!("Replaced store with {} annotation(s)", self.annotations.len());
    }
}
