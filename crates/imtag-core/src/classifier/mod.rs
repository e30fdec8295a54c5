//! Image classifier boundary and the registry of known classifiers.
//!
//! A classifier turns image bytes into `(term, confidence)` pairs over its
//! own fixed label set. The tagger only sees the [`ImageClassifier`] trait;
//! concrete models are described by a [`ClassifierDescriptor`] and looked up
//! by name in a [`ClassifierRegistry`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use imtag_core::classifier::ClassifierRegistry;
//!
//! let registry = ClassifierRegistry::builtin();
//! let classifier = registry.get("vgg19")?.instantiate(&data_dir)?;
//! let tags = classifier.classify(&std::fs::read("cat.jpg")?)?;
//! ```

mod onnx;
pub(crate) mod preprocess;

pub use onnx::OnnxClassifier;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ClassifierError;
use crate::types::ConfidenceTag;

/// Label file shipped with the ImageNet models.
pub const IMAGENET_LABELS_FILE: &str = "imagenet_comp_graph_label_strings.txt";

/// Something that assigns confidences to a fixed label set.
pub trait ImageClassifier: Send + Sync {
    /// Registry name of this classifier.
    fn name(&self) -> &str;

    /// Classify encoded image bytes (JPEG, PNG, ...).
    ///
    /// Returns every label with its confidence, highest first.
    fn classify(&self, image: &[u8]) -> Result<Vec<ConfidenceTag>, ClassifierError>;
}

/// Memory layout of the model's image input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]` (TensorFlow exports)
    Nhwc,
    /// `[batch, channels, height, width]` (PyTorch exports)
    Nchw,
}

/// How to load and drive one classifier model.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierDescriptor {
    pub name: String,
    /// ONNX model filename, relative to the data directory
    pub model_file: String,
    /// Newline-separated label filename, relative to the data directory
    pub labels_file: String,
    /// Number of model outputs (may include a leading background class)
    pub num_labels: usize,
    /// Square input side in pixels
    pub input_size: u32,
    pub layout: TensorLayout,
    /// Whether the model emits logits that still need a softmax
    pub apply_softmax: bool,
    /// Output tensor to read; `None` reads the first output
    pub output_name: Option<String>,
}

impl ClassifierDescriptor {
    /// VGG-19 trained on ImageNet, emitting raw logits.
    pub fn vgg19() -> Self {
        Self {
            name: "vgg19".to_string(),
            model_file: "frozen_vgg_19.onnx".to_string(),
            labels_file: IMAGENET_LABELS_FILE.to_string(),
            num_labels: 1000,
            input_size: 224,
            layout: TensorLayout::Nhwc,
            apply_softmax: true,
            output_name: None,
        }
    }

    /// ResNet v2 152 trained on ImageNet with a background class, emitting probabilities.
    pub fn resnet_v2_152() -> Self {
        Self {
            name: "resnet_v2_152".to_string(),
            model_file: "frozen_resnet_v2_152.onnx".to_string(),
            labels_file: IMAGENET_LABELS_FILE.to_string(),
            num_labels: 1001,
            input_size: 224,
            layout: TensorLayout::Nhwc,
            apply_softmax: false,
            output_name: None,
        }
    }

    /// Full path of the model file.
    pub fn model_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.model_file)
    }

    /// Full path of the label file.
    pub fn labels_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.labels_file)
    }

    /// Whether both the model and the label file exist.
    pub fn is_available(&self, data_dir: &Path) -> bool {
        self.model_path(data_dir).exists() && self.labels_path(data_dir).exists()
    }

    /// Load the model described here.
    pub fn instantiate(&self, data_dir: &Path) -> Result<Box<dyn ImageClassifier>, ClassifierError> {
        Ok(Box::new(OnnxClassifier::load(self, data_dir)?))
    }
}

/// Named classifier descriptors, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ClassifierRegistry {
    descriptors: BTreeMap<String, ClassifierDescriptor>,
}

impl ClassifierRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in ImageNet classifiers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ClassifierDescriptor::vgg19());
        registry.register(ClassifierDescriptor::resnet_v2_152());
        registry
    }

    /// Add or replace a descriptor.
    pub fn register(&mut self, descriptor: ClassifierDescriptor) {
        self.descriptors
            .insert(descriptor.name.to_lowercase(), descriptor);
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Result<&ClassifierDescriptor, ClassifierError> {
        self.descriptors
            .get(&name.to_lowercase())
            .ok_or_else(|| ClassifierError::UnknownClassifier {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.name.as_str()).collect()
    }

    /// All descriptors, sorted by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &ClassifierDescriptor> {
        self.descriptors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = ClassifierRegistry::builtin();
        assert_eq!(registry.names(), vec!["resnet_v2_152", "vgg19"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ClassifierRegistry::builtin();
        let d = registry.get("VGG19").unwrap();
        assert_eq!(d.num_labels, 1000);
        assert!(d.apply_softmax);
    }

    #[test]
    fn test_unknown_classifier_lists_known() {
        let registry = ClassifierRegistry::builtin();
        let err = registry.get("alexnet").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("alexnet"));
        assert!(msg.contains("vgg19"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ClassifierRegistry::builtin();
        let mut custom = ClassifierDescriptor::vgg19();
        custom.model_file = "vgg19_custom.onnx".to_string();
        registry.register(custom);
        assert_eq!(registry.names().len(), 2);
        assert_eq!(registry.get("vgg19").unwrap().model_file, "vgg19_custom.onnx");
    }

    #[test]
    fn test_paths_join_data_dir() {
        let d = ClassifierDescriptor::resnet_v2_152();
        let data = Path::new("/data");
        assert_eq!(
            d.model_path(data),
            PathBuf::from("/data/frozen_resnet_v2_152.onnx")
        );
        assert_eq!(d.labels_path(data), PathBuf::from("/data").join(IMAGENET_LABELS_FILE));
        assert!(!d.is_available(Path::new("/nonexistent")));
    }

    #[test]
    fn test_instantiate_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClassifierDescriptor::vgg19()
            .instantiate(dir.path())
            .err()
            .unwrap();
        assert!(matches!(err, ClassifierError::Model { .. }));
    }
}
