//! Browser binding
//!
//! `CodeMirrorBuffer` adapts a CodeMirror 5 editor to [`TextBuffer`], and
//! `AnnotationLayer` is the class the page script constructs and wires to
//! its context menu, tooltip and export/import buttons.
//!
//! CodeMirror counts columns in UTF-16 code units while the core counts
//! `char`s; the two agree for code outside the astral planes.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::annotator::Annotator;
use crate::buffer::{MarkerHandle, MarkerTag, TextBuffer};
use crate::config::AnnotatorConfig;
use crate::error::AnnotationError;
use crate::logging;
use crate::markup;
use crate::normalize::LineSource;
use crate::range::{Position, Range};
use crate::store::{AnnotationId, AnnotationRecord};

#[wasm_bindgen]
extern "C" {
    /// A CodeMirror 5 editor instance
    pub type CodeMirror;

    #[wasm_bindgen(method, js_name = getValue)]
    fn get_value(this: &CodeMirror) -> String;

    #[wasm_bindgen(method, js_name = setValue)]
    fn set_value(this: &CodeMirror, value: &str);

    #[wasm_bindgen(method, js_name = getLine)]
    fn get_line(this: &CodeMirror, line: u32) -> Option<String>;

    #[wasm_bindgen(method, js_name = lineCount)]
    fn line_count(this: &CodeMirror) -> u32;

    #[wasm_bindgen(method, js_name = markText)]
    fn mark_text(this: &CodeMirror, from: &JsValue, to: &JsValue, options: &JsValue) -> TextMarker;

    #[wasm_bindgen(method, js_name = coordsChar)]
    fn coords_char(this: &CodeMirror, coords: &JsValue, mode: &str) -> JsValue;

    /// Handle returned by `markText`
    pub type TextMarker;

    #[wasm_bindgen(method)]
    fn clear(this: &TextMarker);

    #[wasm_bindgen(method)]
    fn find(this: &TextMarker) -> JsValue;
}

impl From<AnnotationError> for JsValue {
    fn from(err: AnnotationError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to convert value for JS: {}", e);
            JsValue::UNDEFINED
        })
}

fn position_from_js(value: JsValue) -> Result<Position, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| js_error(&format!("Invalid position: {}", e)))
}

/// Largest integer a JS number holds exactly
const MAX_SAFE_ID: f64 = 9_007_199_254_740_991.0;

/// Ids cross the boundary as JS numbers. Fractional, negative and
/// non-finite values name no annotation, and neither do ids above 2^53 - 1,
/// which JS cannot represent exactly.
fn id_from_js(id: f64) -> Option<AnnotationId> {
    (id.fract() == 0.0 && (0.0..=MAX_SAFE_ID).contains(&id)).then(|| AnnotationId(id as u64))
}

/// `markText` options
///
/// `clearWhenEmpty` is off so zero-width spans keep a live marker and text
/// deleted from under a marker does not detach it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkOptions<'a> {
    class_name: &'a str,
    attributes: BTreeMap<&'a str, String>,
    clear_when_empty: bool,
}

/// Shape of `TextMarker.find()`
#[derive(Deserialize)]
struct MarkerSpan {
    from: Position,
    to: Position,
}

#[derive(Serialize)]
struct PageCoords {
    left: f64,
    top: f64,
}

/// [`TextBuffer`] over a CodeMirror editor
pub struct CodeMirrorBuffer {
    editor: CodeMirror,
    markers: BTreeMap<u64, (TextMarker, MarkerTag)>,
    next_marker: u64,
    id_attribute: String,
}

impl CodeMirrorBuffer {
    pub fn new(editor: CodeMirror, id_attribute: impl Into<String>) -> Self {
        Self {
            editor,
            markers: BTreeMap::new(),
            next_marker: 0,
            id_attribute: id_attribute.into(),
        }
    }

    /// Text position under page coordinates
    pub fn position_at(&self, left: f64, top: f64) -> Option<Position> {
        let pos = self.editor.coords_char(&to_js(&PageCoords { left, top }), "page");
        serde_wasm_bindgen::from_value(pos).ok()
    }
}

impl LineSource for CodeMirrorBuffer {
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        let line = u32::try_from(line).ok()?;
        self.editor.get_line(line).map(Cow::Owned)
    }
}

impl TextBuffer for CodeMirrorBuffer {
    fn text(&self) -> String {
        self.editor.get_value()
    }

    fn set_text(&mut self, text: &str) {
        for (marker, _) in std::mem::take(&mut self.markers).into_values() {
            marker.clear();
        }
        self.editor.set_value(text);
    }

    fn line_count(&self) -> usize {
        self.editor.line_count() as usize
    }

    fn mark_range(&mut self, range: Range, tag: MarkerTag) -> MarkerHandle {
        let mut attributes = BTreeMap::new();
        attributes.insert(self.id_attribute.as_str(), tag.annotation_id.to_string());
        let options = MarkOptions {
            class_name: &tag.class_name,
            attributes,
            clear_when_empty: false,
        };

        let marker = self
            .editor
            .mark_text(&to_js(&range.start), &to_js(&range.end), &to_js(&options));

        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(handle.0, (marker, tag));
        handle
    }

    fn clear_marker(&mut self, handle: MarkerHandle) {
        if let Some((marker, _)) = self.markers.remove(&handle.0) {
            marker.clear();
        }
    }

    fn marker_range(&self, handle: MarkerHandle) -> Option<Range> {
        let (marker, _) = self.markers.get(&handle.0)?;
        let span: Option<MarkerSpan> = serde_wasm_bindgen::from_value(marker.find()).ok()?;
        span.map(|s| Range::new(s.from, s.to))
    }

    fn markers(&self) -> Vec<MarkerHandle> {
        self.markers.keys().copied().map(MarkerHandle).collect()
    }

    fn find_markers(&self, range: Range) -> Vec<(MarkerHandle, AnnotationId)> {
        self.markers
            .iter()
            .filter_map(|(handle, (_, tag))| {
                let handle = MarkerHandle(*handle);
                let live = self.marker_range(handle)?;
                live.overlaps(&range).then_some((handle, tag.annotation_id))
            })
            .collect()
    }
}

/// Annotation layer for one CodeMirror editor
#[wasm_bindgen]
pub struct AnnotationLayer {
    session: Annotator<CodeMirrorBuffer>,
}

#[wasm_bindgen]
impl AnnotationLayer {
    /// Attach to `editor`. `config` may be omitted or any subset of the
    /// configuration fields.
    #[wasm_bindgen(constructor)]
    pub fn new(editor: CodeMirror, config: JsValue) -> Result<AnnotationLayer, JsValue> {
        let config: AnnotatorConfig = if config.is_undefined() || config.is_null() {
            AnnotatorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_error(&format!("Invalid configuration: {}", e)))?
        };
        logging::init(&config.log_filter);

        let buffer = CodeMirrorBuffer::new(editor, config.id_attribute.clone());
        let session = Annotator::new(buffer, config)?;
        Ok(AnnotationLayer { session })
    }

    /// Annotate the selection `from`..`to`. Returns the new id, or nothing
    /// when the text was blank.
    #[wasm_bindgen(js_name = "addAnnotation")]
    pub fn add_annotation(
        &mut self,
        from: JsValue,
        to: JsValue,
        text: &str,
    ) -> Result<Option<f64>, JsValue> {
        let selection = Range::new(position_from_js(from)?, position_from_js(to)?);
        match self.session.annotate(selection, text) {
            Ok(id) => Ok(Some(id.0 as f64)),
            Err(e) if e.is_silent() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns whether the annotation was updated
    #[wasm_bindgen(js_name = "editAnnotation")]
    pub fn edit_annotation(&mut self, id: f64, text: &str) -> bool {
        id_from_js(id).is_some_and(|id| self.session.edit(id, text).is_ok())
    }

    /// Returns whether an annotation was removed
    #[wasm_bindgen(js_name = "deleteAnnotation")]
    pub fn delete_annotation(&mut self, id: f64) -> bool {
        id_from_js(id).is_some_and(|id| self.session.delete(id).is_ok())
    }

    /// The annotation record with `id`, or `undefined`
    #[wasm_bindgen(js_name = "getAnnotation")]
    pub fn get_annotation(&self, id: f64) -> JsValue {
        id_from_js(id)
            .and_then(|id| self.session.store().find_by_id(id))
            .map(|a| to_js(&a.record()))
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// Every annotation record in store order
    #[wasm_bindgen(js_name = "annotations")]
    pub fn annotations(&self) -> JsValue {
        let records: Vec<AnnotationRecord> = self.session.store().records();
        to_js(&records)
    }

    /// Tooltip `{annotationId, html}` for the mouse position, or `undefined`
    #[wasm_bindgen(js_name = "tooltipAt")]
    pub fn tooltip_at(&self, left: f64, top: f64) -> JsValue {
        self.session
            .buffer()
            .position_at(left, top)
            .and_then(|pos| self.session.tooltip(pos))
            .map(|tooltip| to_js(&tooltip))
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// Menu entries for a right-click at the mouse position. Pass the
    /// editor's selection bounds, or `undefined` when nothing is selected.
    #[wasm_bindgen(js_name = "contextMenu")]
    pub fn context_menu(
        &self,
        left: f64,
        top: f64,
        selection_from: JsValue,
        selection_to: JsValue,
    ) -> Result<JsValue, JsValue> {
        let Some(click) = self.session.buffer().position_at(left, top) else {
            return Ok(JsValue::UNDEFINED);
        };
        let selection = if selection_from.is_undefined() || selection_to.is_undefined() {
            None
        } else {
            Some(Range::new(
                position_from_js(selection_from)?,
                position_from_js(selection_to)?,
            ))
        };
        Ok(to_js(&self.session.context_menu(click, selection)))
    }

    #[wasm_bindgen(js_name = "exportJson")]
    pub fn export_json(&mut self) -> Result<String, JsValue> {
        Ok(self.session.export_json()?)
    }

    #[wasm_bindgen(getter, js_name = "exportFilename")]
    pub fn export_filename(&self) -> String {
        self.session.config().export_filename.clone()
    }

    /// Call when the file picker is opened; rejects while another import runs
    #[wasm_bindgen(js_name = "beginImport")]
    pub fn begin_import(&mut self) -> Result<(), JsValue> {
        Ok(self.session.begin_import()?)
    }

    /// Apply the picked file's contents. Returns the number of annotations.
    #[wasm_bindgen(js_name = "finishImport")]
    pub fn finish_import(&mut self, json: &str) -> Result<usize, JsValue> {
        self.session.finish_import(json).map_err(|e| {
            tracing::warn!("Import rejected: {}", e);
            JsValue::from(e)
        })
    }

    #[wasm_bindgen(js_name = "cancelImport")]
    pub fn cancel_import(&mut self) {
        self.session.cancel_import();
    }

    #[wasm_bindgen(getter, js_name = "isImporting")]
    pub fn is_importing(&self) -> bool {
        self.session.is_importing()
    }
}

/// Render annotation text to HTML for display
#[wasm_bindgen(js_name = "renderMarkup")]
pub fn render_markup(text: &str) -> String {
    markup::render(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_js() {
        assert_eq!(id_from_js(7.0), Some(AnnotationId(7)));
        assert_eq!(id_from_js(1_718_000_000_123.0), Some(AnnotationId(1_718_000_000_123)));
        assert_eq!(id_from_js(MAX_SAFE_ID), Some(AnnotationId(9_007_199_254_740_991)));

        assert_eq!(id_from_js(2.5), None);
        assert_eq!(id_from_js(-1.0), None);
        assert_eq!(id_from_js(f64::NAN), None);
        assert_eq!(id_from_js(f64::INFINITY), None);
        assert_eq!(id_from_js(MAX_SAFE_ID + 2.0), None);
    }

    #[test]
    fn test_mark_options_keep_empty_markers() {
        let mut attributes = BTreeMap::new();
        attributes.insert("data-id", "4".to_string());
        let options = MarkOptions {
            class_name: "cm-mark cm-mark-1",
            attributes,
            clear_when_empty: false,
        };

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "className": "cm-mark cm-mark-1",
                "attributes": {"data-id": "4"},
                "clearWhenEmpty": false
            })
        );
    }
}
