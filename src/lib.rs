//! Code Annotator
//!
//! A WASM annotation layer for a CodeMirror code editor that provides:
//! - Line-aware highlighting of selected code, one colored marker per line
//! - Annotation text with markdown-lite tooltips
//! - Positional recoloring when annotations are removed
//! - JSON export and import of code plus annotations
//!
//! The core works against the [`buffer::TextBuffer`] trait so it runs
//! natively over [`buffer::MemoryBuffer`] as well as in the browser.

use wasm_bindgen::prelude::*;

pub mod annotator;
pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod marker;
pub mod markup;
pub mod normalize;
pub mod range;
pub mod reconcile;
pub mod store;
pub mod wasm;

// Re-export common types
pub use annotator::{Annotator, ContextMenu, MenuTarget, Tooltip};
pub use buffer::{MarkerHandle, MemoryBuffer, TextBuffer};
pub use config::AnnotatorConfig;
pub use error::{AnnotationError, Result};
pub use export::ExportDocument;
pub use range::{Position, Range};
pub use store::{Annotation, AnnotationId, AnnotationRecord, AnnotationStore};
pub use wasm::AnnotationLayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in debug mode
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
