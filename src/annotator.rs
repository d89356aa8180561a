//! Annotation session
//!
//! One `Annotator` per editor. It owns the buffer, the store and the
//! configuration, and exposes the actions the page wires to its menus,
//! tooltips and buttons. Nothing else mutates annotations.

use serde::Serialize;

use crate::buffer::TextBuffer;
use crate::config::AnnotatorConfig;
use crate::error::{AnnotationError, Result};
use crate::export::{self, ExportDocument};
use crate::markup;
use crate::range::{Position, Range};
use crate::store::{Annotation, AnnotationId, AnnotationStore};

/// What a context menu acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuTarget {
    /// An annotation under the click or inside the selection
    Existing { id: AnnotationId },
    /// A selection with no annotation on it yet
    Selection { range: Range },
}

/// Menu entries to show for a right-click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub target: Option<MenuTarget>,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl ContextMenu {
    fn for_target(target: Option<MenuTarget>) -> Self {
        let existing = matches!(target, Some(MenuTarget::Existing { .. }));
        let selection = matches!(target, Some(MenuTarget::Selection { .. }));
        ContextMenu {
            target,
            can_add: selection,
            can_edit: existing,
            can_delete: existing,
        }
    }
}

/// Hover popup content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub annotation_id: AnnotationId,
    pub html: String,
}

pub struct Annotator<B: TextBuffer> {
    buffer: B,
    store: AnnotationStore,
    config: AnnotatorConfig,
    import_in_flight: bool,
}

impl<B: TextBuffer> Annotator<B> {
    pub fn new(buffer: B, config: AnnotatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buffer,
            store: AnnotationStore::new(&config),
            config,
            import_in_flight: false,
        })
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Direct buffer access for text edits. Markers are left to the buffer.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate the current selection
    pub fn annotate(&mut self, selection: Range, text: &str) -> Result<AnnotationId> {
        let annotation = self.store.add(&mut self.buffer, selection, text)?;
        Ok(annotation.id)
    }

    pub fn edit(&mut self, id: AnnotationId, text: &str) -> Result<()> {
        self.store.edit(id, text)
    }

    pub fn delete(&mut self, id: AnnotationId) -> Result<()> {
        self.store.remove(&mut self.buffer, id).map(|_| ())
    }

    fn resolve_markers(&self, range: Range) -> Option<&Annotation> {
        self.buffer
            .find_markers(range)
            .into_iter()
            .find_map(|(handle, _)| self.store.owner_of(handle))
    }

    /// The annotation under `point`
    ///
    /// Markers are consulted first since they follow edits; stored ranges are
    /// the fallback when no marker there resolves to a live annotation.
    pub fn annotation_at(&self, point: Position) -> Option<&Annotation> {
        self.resolve_markers(Range::point(point))
            .or_else(|| self.store.find_at_point(point))
    }

    /// Decide what a right-click at `click` offers
    pub fn context_menu(&self, click: Position, selection: Option<Range>) -> ContextMenu {
        if let Some(annotation) = self.annotation_at(click) {
            return ContextMenu::for_target(Some(MenuTarget::Existing { id: annotation.id }));
        }

        let target = selection.filter(|s| !s.is_empty()).map(|range| {
            match self.resolve_markers(range) {
                Some(annotation) => MenuTarget::Existing { id: annotation.id },
                None => MenuTarget::Selection { range },
            }
        });
        ContextMenu::for_target(target)
    }

    /// Popup content for the annotation under `point`
    pub fn tooltip(&self, point: Position) -> Option<Tooltip> {
        self.annotation_at(point).map(|annotation| Tooltip {
            annotation_id: annotation.id,
            html: markup::render(&annotation.text),
        })
    }

    /// Snapshot for export, with ranges taken from where the markers sit now
    pub fn export_document(&mut self) -> ExportDocument {
        self.store.refresh_ranges(&self.buffer);
        export::export(&self.store, &self.buffer)
    }

    pub fn export_json(&mut self) -> Result<String> {
        self.export_document().to_json()
    }

    pub fn is_importing(&self) -> bool {
        self.import_in_flight
    }

    /// Mark an import as started; fails while another one is in flight
    pub fn begin_import(&mut self) -> Result<()> {
        if self.import_in_flight {
            return Err(AnnotationError::ImportInProgress);
        }
        self.import_in_flight = true;
        Ok(())
    }

    /// Apply an import and clear the in-flight flag
    ///
    /// On error nothing changes. Returns the number of annotations imported.
    pub fn finish_import(&mut self, json: &str) -> Result<usize> {
        self.import_in_flight = false;
        let document = ExportDocument::from_json(json)?;
        export::import(document, &mut self.store, &mut self.buffer);
        Ok(self.store.len())
    }

    pub fn cancel_import(&mut self) {
        self.import_in_flight = false;
    }

    /// Import in one step
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        self.begin_import()?;
        self.finish_import(json)
    }
}
