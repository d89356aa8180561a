//! Browser tests, run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use code_annotator::wasm::render_markup;
use code_annotator::{AnnotationError, Annotator, AnnotatorConfig, MemoryBuffer, Position, Range};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_render_markup() {
    assert_eq!(
        render_markup("calls **`main`**"),
        "calls <strong><code>main</code></strong>"
    );
    assert_eq!(render_markup("<b>"), "&lt;b&gt;");
}

#[wasm_bindgen_test]
fn test_errors_become_js_errors() {
    let value = JsValue::from(AnnotationError::ImportInProgress);
    assert!(value.is_instance_of::<js_sys::Error>());
}

#[wasm_bindgen_test]
fn test_session_in_browser() {
    let buffer = MemoryBuffer::new("for i in range(3):\n    print(i)");
    let mut session = Annotator::new(buffer, AnnotatorConfig::default()).unwrap();
    let id = session
        .annotate(
            Range::new(Position::new(0, 0), Position::new(1, 12)),
            "loops *three* times",
        )
        .unwrap();

    let tooltip = session.tooltip(Position::new(1, 6)).unwrap();
    assert_eq!(tooltip.annotation_id, id);
    assert_eq!(tooltip.html, "loops <em>three</em> times");
}
