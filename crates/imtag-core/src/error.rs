//! Error types for the imtag tagging engine.
//!
//! Errors are organized by layer: the embedding/retrieval engine, the image
//! classifier boundary, configuration, and the top-level tagger that wires
//! them together.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for imtag operations.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Vector store, hierarchy, embedding and retrieval errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Image classification errors
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Tagging was requested but no classifier is loaded
    #[error("No image classifier loaded")]
    NoClassifier,

    /// A hierarchy operation was requested with the hierarchy turned off
    #[error("The lexical hierarchy is disabled (hierarchy.enabled = false)")]
    HierarchyDisabled,

    /// The label registry file could not be read or written
    #[error("Label registry error at {path}: {message}")]
    Registry { path: PathBuf, message: String },

    /// The input path is neither a supported file nor a directory
    #[error("Invalid input path {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the label embedding and retrieval engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The vector store's companion files are missing or malformed.
    #[error("Failed to open vector store at {path}: {message}")]
    StoreOpen { path: PathBuf, message: String },

    /// Reading or writing vector store data failed after the layout was validated.
    #[error("Vector store I/O failed for {path}: {message}")]
    StoreIo { path: PathBuf, message: String },

    /// The term is unknown to the vector store or the hierarchy.
    ///
    /// Recoverable: callers usually skip the term and carry on.
    #[error("Term not found: {0}")]
    TermNotFound(String),

    /// No tag contributed any confidence, so no query point exists.
    #[error("Cannot embed image: no tag with non-zero confidence resolved to a vector")]
    EmptyEmbedding,

    /// Two vectors from different vector spaces met.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The lexical hierarchy database could not be read or parsed.
    #[error("Failed to load hierarchy from {path}: {message}")]
    Hierarchy { path: PathBuf, message: String },
}

/// Image classifier errors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The classifier name is not present in the registry
    #[error("Unknown classifier '{name}' (known: {known})")]
    UnknownClassifier { name: String, known: String },

    /// Model or label file could not be loaded
    #[error("Failed to load model {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// Image bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Inference failed or produced an unexpected output
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl EngineError {
    /// Whether the caller may skip the offending item and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TermNotFound(_))
    }
}

/// Convenience type alias for tagger results.
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Convenience type alias for engine-level results.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_not_found_is_recoverable() {
        assert!(EngineError::TermNotFound("zebra".into()).is_recoverable());
        assert!(!EngineError::EmptyEmbedding.is_recoverable());
        assert!(!EngineError::DimensionMismatch {
            expected: 300,
            actual: 2
        }
        .is_recoverable());
    }

    #[test]
    fn test_engine_error_passes_through_tagger_error() {
        let err: TaggerError = EngineError::TermNotFound("zebra".into()).into();
        assert_eq!(err.to_string(), "Term not found: zebra");
    }
}
