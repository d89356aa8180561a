//! Annotation Report
//!
//! Loads an exported annotation document and prints each annotation with
//! the code its markers cover.
//!
//! Usage: annotation-report <export.json>

use anyhow::{Context, Result};
use std::env;
use std::fs;

use code_annotator::normalize::LineSource;
use code_annotator::{logging, Annotator, AnnotatorConfig, MemoryBuffer, Range, TextBuffer};

fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    let config = AnnotatorConfig::from_env().context("Invalid annotator configuration")?;
    logging::init(&config.log_filter);

    let path = env::args()
        .nth(1)
        .context("usage: annotation-report <export.json>")?;
    let json = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;

    let mut session = Annotator::new(MemoryBuffer::default(), config)?;
    let count = session
        .import_json(&json)
        .with_context(|| format!("Failed to import {}", path))?;

    tracing::info!("Loaded {} annotation(s) from {}", count, path);
    println!(
        "{} ({} line(s), {} annotation(s))",
        path,
        session.buffer().line_count(),
        count
    );

    for annotation in session.store().iter() {
        println!();
        println!(
            "#{} [color {}] {}",
            annotation.id, annotation.color_index, annotation.range
        );
        for line in annotation.text.lines() {
            println!("    {}", line);
        }
        for handle in &annotation.markers {
            if let Some(range) = session.buffer().marker_range(*handle) {
                println!("  | {}", covered_text(session.buffer(), range));
            }
        }
    }

    Ok(())
}

/// Text under a single-line marker
fn covered_text(buffer: &MemoryBuffer, range: Range) -> String {
    let Some(line) = buffer.line_text(range.start.line) else {
        return String::new();
    };
    line.chars()
        .skip(range.start.column)
        .take(range.end.column.saturating_sub(range.start.column))
        .collect()
}
