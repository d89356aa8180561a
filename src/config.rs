//! Configuration for the annotation layer

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AnnotationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotatorConfig {
    /// Number of highlight colors cycled through
    pub palette_size: usize,
    /// Base CSS class on every marker
    pub marker_class: String,
    /// Marker attribute carrying the annotation id
    pub id_attribute: String,
    /// Suggested file name for exports
    pub export_filename: String,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig {
            palette_size: 4,
            marker_class: "cm-mark".to_string(),
            id_attribute: "data-id".to_string(),
            export_filename: "python-study-export.json".to_string(),
            log_filter: "code_annotator=info".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Load from `ANNOTATOR_*` environment variables, defaulting anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AnnotatorConfig::default();
        let config = AnnotatorConfig {
            palette_size: match lookup("ANNOTATOR_PALETTE_SIZE") {
                Some(raw) => raw.trim().parse().map_err(|e| {
                    AnnotationError::Config(format!("ANNOTATOR_PALETTE_SIZE={}: {}", raw, e))
                })?,
                None => defaults.palette_size,
            },
            marker_class: lookup("ANNOTATOR_MARKER_CLASS").unwrap_or(defaults.marker_class),
            id_attribute: lookup("ANNOTATOR_ID_ATTRIBUTE").unwrap_or(defaults.id_attribute),
            export_filename: lookup("ANNOTATOR_EXPORT_FILENAME")
                .unwrap_or(defaults.export_filename),
            log_filter: lookup("ANNOTATOR_LOG").unwrap_or(defaults.log_filter),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette_size == 0 {
            return Err(AnnotationError::Config(
                "paletteSize must be at least 1".to_string(),
            ));
        }
        if self.marker_class.trim().is_empty() {
            return Err(AnnotationError::Config(
                "markerClass must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnnotatorConfig::from_vars(lookup(&[])).unwrap();
        assert_eq!(config, AnnotatorConfig::default());
        assert_eq!(config.palette_size, 4);
        assert_eq!(config.export_filename, "python-study-export.json");
    }

    #[test]
    fn test_overrides() {
        let config = AnnotatorConfig::from_vars(lookup(&[
            ("ANNOTATOR_PALETTE_SIZE", " 6 "),
            ("ANNOTATOR_MARKER_CLASS", "note"),
            ("ANNOTATOR_LOG", "code_annotator=trace"),
        ]))
        .unwrap();

        assert_eq!(config.palette_size, 6);
        assert_eq!(config.marker_class, "note");
        assert_eq!(config.log_filter, "code_annotator=trace");
        assert_eq!(config.id_attribute, "data-id");
    }

    #[test]
    fn test_invalid_palette() {
        let err = AnnotatorConfig::from_vars(lookup(&[("ANNOTATOR_PALETTE_SIZE", "many")]))
            .unwrap_err();
        assert!(matches!(err, AnnotationError::Config(_)));

        let err =
            AnnotatorConfig::from_vars(lookup(&[("ANNOTATOR_PALETTE_SIZE", "0")])).unwrap_err();
        assert!(err.to_string().contains("paletteSize"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnnotatorConfig = serde_json::from_str(r#"{"paletteSize": 8}"#).unwrap();
        assert_eq!(config.palette_size, 8);
        assert_eq!(config.marker_class, "cm-mark");
    }
}
