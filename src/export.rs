//! Export document encoding
//!
//! The interchange format is a JSON object holding the buffer text and the
//! annotations in store order:
//!
//! ```json
//! {
//!   "code": "def f():\n    return 1",
//!   "annotations": [
//!     { "id": 1, "from": {"line": 0, "ch": 0}, "to": {"line": 1, "ch": 12},
//!       "text": "a function", "colorIndex": 0 }
//!   ]
//! }
//! ```
//!
//! `colorIndex` is optional on import. Decoding checks the whole document
//! before anything is applied, so a rejected import leaves the session as it was.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::buffer::TextBuffer;
use crate::error::{AnnotationError, Result};
use crate::store::{AnnotationRecord, AnnotationStore};

/// Buffer text plus annotations, without markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub code: String,
    pub annotations: Vec<AnnotationRecord>,
}

impl ExportDocument {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate a document
    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| AnnotationError::Format(format!("not valid JSON: {}", e)))?;

        let Value::Object(mut fields) = value else {
            return Err(AnnotationError::Format(
                "expected a JSON object".to_string(),
            ));
        };

        let code = match fields.remove("code") {
            Some(Value::String(code)) => code,
            Some(_) => return Err(format_error("\"code\" must be a string")),
            None => return Err(format_error("missing \"code\" field")),
        };

        let entries = match fields.remove("annotations") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(format_error("\"annotations\" must be an array")),
            None => return Err(format_error("missing \"annotations\" field")),
        };

        let annotations = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<AnnotationRecord>(entry).map_err(|e| {
                    AnnotationError::Format(format!("annotation {}: {}", index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let document = ExportDocument { code, annotations };
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, record) in self.annotations.iter().enumerate() {
            if !seen.insert(record.id) {
                return Err(AnnotationError::Format(format!(
                    "annotation {}: duplicate id {}",
                    index, record.id
                )));
            }
            if record.range.start > record.range.end {
                return Err(AnnotationError::Format(format!(
                    "annotation {}: \"from\" is after \"to\"",
                    index
                )));
            }
            if record.text.trim().is_empty() {
                return Err(AnnotationError::Format(format!(
                    "annotation {}: text is empty",
                    index
                )));
            }
        }
        Ok(())
    }
}

fn format_error(message: &str) -> AnnotationError {
    AnnotationError::Format(message.to_string())
}

/// Snapshot the store and buffer text
pub fn export<B: TextBuffer + ?Sized>(store: &AnnotationStore, buffer: &B) -> ExportDocument {
    ExportDocument {
        code: buffer.text(),
        annotations: store.records(),
    }
}

/// Replace the buffer text and every annotation with the document's
pub fn import<B: TextBuffer + ?Sized>(
    document: ExportDocument,
    store: &mut AnnotationStore,
    buffer: &mut B,
) {
    let count = document.annotations.len();
    store.clear_markers(buffer);
    buffer.set_text(&document.code);
    store.replace_all(buffer, document.annotations);
    tracing::debug!("Imported {} annotation(s)", count);
}
