//! Core data types shared by the embedding, retrieval and tagging layers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A term paired with its vector in the shared semantic space.
///
/// Labels are re-derived from the vector store on every run and never
/// persisted with their vectors, so the word vector model can change
/// independently of the registered label set.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub term: String,
    pub vector: Vec<f32>,
}

impl Label {
    pub fn new(term: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            term: term.into(),
            vector,
        }
    }
}

/// A classifier-assigned score for one of its own training labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTag {
    /// The classifier label (e.g., "tabby", "golden retriever")
    pub term: String,

    /// Confidence score from 0.0 to 1.0
    pub confidence: f32,
}

impl ConfidenceTag {
    pub fn new(term: impl Into<String>, confidence: f32) -> Self {
        Self {
            term: term.into(),
            confidence,
        }
    }
}

/// An ancestor label and its shortest hop count from the seed concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelHierarchyEntry {
    pub level: usize,
    pub label: String,
}

/// A registered label ranked against an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// The term the label was embedded through
    pub name: String,

    /// Distance between the label vector and the image's embedding
    pub distance: f32,

    /// Registry entry the term came from, when it differs (e.g. a synset id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, distance: f32) -> Self {
        Self {
            name: name.into(),
            distance,
            label_id: None,
        }
    }

    /// Attach the registry entry this tag was derived from.
    pub fn with_label_id(mut self, label_id: impl Into<String>) -> Self {
        self.label_id = Some(label_id.into());
        self
    }
}

/// The complete tagging output for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedImage {
    /// Path to the source file
    pub file_path: PathBuf,

    /// BLAKE3 hash of the file contents
    pub content_hash: String,

    /// Raw classifier output that was aggregated into the image embedding
    pub classifier_tags: Vec<ConfidenceTag>,

    /// Registered labels nearest to the image, closest first.
    /// Empty when only raw classifier results were requested.
    pub tags: Vec<Tag>,
}

/// Statistics for a tagging run over many images.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaggingStats {
    /// Images tagged successfully
    pub succeeded: usize,

    /// Images that failed to classify or embed
    pub failed: usize,

    /// Images tagged per second
    pub images_per_second: f64,

    /// Total time in seconds
    pub total_seconds: f64,
}
