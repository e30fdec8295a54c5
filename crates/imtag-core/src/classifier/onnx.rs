//! ONNX Runtime image classifier.
//!
//! Runs an ImageNet-style classification model exported to ONNX and maps
//! its output vector onto the label file that ships with it.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::ClassifierError;
use crate::math::softmax_in_place;
use crate::types::ConfidenceTag;

use super::preprocess::preprocess;
use super::{ClassifierDescriptor, ImageClassifier, TensorLayout};

/// An ONNX classification model plus its label set.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxClassifier {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    output_name: Option<String>,
    labels: Vec<String>,
    input_size: u32,
    layout: TensorLayout,
    apply_softmax: bool,
}

impl OnnxClassifier {
    /// Load the model and label file named by `descriptor` from `data_dir`.
    pub fn load(descriptor: &ClassifierDescriptor, data_dir: &Path) -> Result<Self, ClassifierError> {
        let labels_path = descriptor.labels_path(data_dir);
        let labels = load_labels(&labels_path)?;
        if labels.len() != descriptor.num_labels && labels.len() + 1 != descriptor.num_labels {
            return Err(ClassifierError::Model {
                path: labels_path,
                message: format!(
                    "expected {} labels, found {}",
                    descriptor.num_labels,
                    labels.len()
                ),
            });
        }

        let model_path = descriptor.model_path(data_dir);
        if !model_path.exists() {
            return Err(ClassifierError::Model {
                path: model_path,
                message: "Model not found".to_string(),
            });
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Model {
                path: model_path.clone(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| ClassifierError::Model {
                path: model_path.clone(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        tracing::debug!(
            "Loaded classifier {} from {:?} (input: {:?}, outputs: {:?})",
            descriptor.name,
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            name: descriptor.name.clone(),
            session: Mutex::new(session),
            input_name,
            output_name: descriptor.output_name.clone(),
            labels,
            input_size: descriptor.input_size,
            layout: descriptor.layout,
            apply_softmax: descriptor.apply_softmax,
        })
    }

    /// The label set, in model output order (background class excluded).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn run(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        let output = match &self.output_name {
            Some(wanted) => outputs.iter().find(|(name, _)| *name == wanted.as_str()),
            None => outputs.iter().next(),
        }
        .ok_or_else(|| ClassifierError::Inference("Model produced no usable output".to_string()))?;

        let (_, data) = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Failed to extract output tensor: {e}")))?;

        Ok(data.to_vec())
    }
}

impl ImageClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, image: &[u8]) -> Result<Vec<ConfidenceTag>, ClassifierError> {
        let decoded =
            image::load_from_memory(image).map_err(|e| ClassifierError::Decode(e.to_string()))?;
        let tensor = preprocess(&decoded, self.input_size, self.layout);
        let scores = self.run(&tensor)?;
        scores_to_tags(scores, &self.labels, self.apply_softmax)
    }
}

/// Read a newline-separated label file.
///
/// Line order is model output order. Labels are trimmed and inner spaces
/// become underscores so multi-word labels match word vector terms.
pub(crate) fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
    let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::Model {
        path: path.to_path_buf(),
        message: format!("Failed to read label file: {e}"),
    })?;
    Ok(content
        .trim_end()
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join("_"))
        .collect())
}

/// Pair model scores with labels, highest confidence first.
///
/// A score vector one longer than the label set carries a leading
/// background class, which is dropped.
pub(crate) fn scores_to_tags(
    mut scores: Vec<f32>,
    labels: &[String],
    apply_softmax: bool,
) -> Result<Vec<ConfidenceTag>, ClassifierError> {
    if apply_softmax {
        softmax_in_place(&mut scores);
    }
    let scores = match scores.len() {
        n if n == labels.len() => &scores[..],
        n if n == labels.len() + 1 => &scores[1..],
        n => {
            return Err(ClassifierError::Inference(format!(
                "model produced {} scores for {} labels",
                n,
                labels.len()
            )))
        }
    };

    let mut tags: Vec<ConfidenceTag> = labels
        .iter()
        .zip(scores)
        .map(|(label, &confidence)| ConfidenceTag::new(label.clone(), confidence))
        .collect();
    tags.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(tags)
}
