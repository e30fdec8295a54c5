//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::retrieval::DistanceMetric;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding models, word vectors, WordNet and the label registry.
    /// Relative paths elsewhere in the config are resolved against it.
    pub data_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.imtag/data"),
        }
    }
}

/// Word vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorsConfig {
    /// Directory with `shape.txt`, `id.txt` and `feature.bin`
    pub path: PathBuf,
}

impl Default for VectorsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("skipGram"),
        }
    }
}

/// Lexical hierarchy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Resolve registered words to WordNet synsets.
    /// When false, words are registered and embedded verbatim.
    pub enabled: bool,

    /// WordNet `dict/` directory
    pub dict_dir: PathBuf,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dict_dir: PathBuf::from("wordnet/dict"),
        }
    }
}

/// Image classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Registered classifier name ("vgg19", "resnet_v2_152")
    pub name: String,

    /// Number of top classifier tags fed into the image embedding (0 = all)
    pub top_k: usize,

    /// Classifier tags below this confidence are dropped before embedding
    pub min_confidence: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            name: "vgg19".to_string(),
            top_k: 10,
            min_confidence: 0.0,
        }
    }
}

/// Tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Number of registered labels returned per image (0 returns none)
    pub k: usize,

    /// Distance metric for nearest-label search
    pub metric: DistanceMetric,

    /// Skip retrieval and report the classifier's own tags
    pub raw_results: bool,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            k: 10,
            metric: DistanceMetric::Cosine,
            raw_results: false,
        }
    }
}

/// Label registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry file, one label per line
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("labelstore"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input formats
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Per-image classification deadline in milliseconds
    pub classify_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            classify_timeout_ms: 30000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
