//! Error types for the annotation layer

use thiserror::Error;

use crate::store::AnnotationId;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AnnotationError>;

/// Annotation layer error type
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Annotation text is empty")]
    EmptyText,

    #[error("Annotation not found: {0}")]
    NotFound(AnnotationId),

    #[error("Invalid export document: {0}")]
    Format(String),

    #[error("An import is already in progress")]
    ImportInProgress,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnnotationError {
    /// Errors the UI drops without telling the user.
    ///
    /// Blank text means the user dismissed the prompt, and a missing id means
    /// the menu or tooltip was holding on to an annotation that is gone.
    pub fn is_silent(&self) -> bool {
        matches!(self, AnnotationError::EmptyText | AnnotationError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(AnnotationError::EmptyText.is_silent());
        assert!(AnnotationError::NotFound(AnnotationId(7)).is_silent());
        assert!(!AnnotationError::Format("bad".to_string()).is_silent());
        assert!(!AnnotationError::InvalidSelection("empty".to_string()).is_silent());
        assert!(!AnnotationError::ImportInProgress.is_silent());
    }

    #[test]
    fn test_messages() {
        let err = AnnotationError::Format("\"annotations\" must be an array".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid export document: \"annotations\" must be an array"
        );
        assert_eq!(
            AnnotationError::NotFound(AnnotationId(42)).to_string(),
            "Annotation not found: 42"
        );
    }
}
