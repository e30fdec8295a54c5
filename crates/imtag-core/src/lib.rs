//! imtag Core - label embedding and retrieval engine for zero-shot image tagging.
//!
//! A pretrained classifier only knows its own training labels. imtag maps
//! those labels into a word vector space, represents an image as the
//! confidence-weighted centroid of its classifier tags, and tags it with
//! the nearest user-registered labels, which the classifier may never have
//! seen.
//!
//! # Architecture
//!
//! ```text
//! Image → Classify → (term, confidence)* → Embed (word vectors) → kNN over labels → Tags
//!                                                                       ↑
//!                               add-label → WordNet senses → registry ──┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imtag_core::{classifier::ClassifierRegistry, Config, Tagger};
//!
//! fn main() -> imtag_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut tagger = Tagger::load(config)?;
//!     tagger.add_label("dog")?;
//!     tagger.load_classifier(&ClassifierRegistry::builtin())?;
//!
//!     let run = tagger.tag_path(std::path::Path::new("./photos"))?;
//!     for image in run.images {
//!         println!("{:?}: {:?}", image.file_path, image.tags);
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod classifier;
pub mod config;
pub mod discovery;
pub mod embedding;
pub mod error;
pub mod hierarchy;
mod math;
pub mod output;
pub mod registry;
pub mod retrieval;
pub mod tagger;
pub mod types;
pub mod vectors;

// Re-exports for convenient access
pub use config::Config;
pub use embedding::{ImageEmbedder, ImageEmbedding};
pub use error::{ClassifierError, ConfigError, EngineError, EngineResult, Result, TaggerError};
pub use hierarchy::{HierarchyExpander, LexicalHierarchy, WordNet};
pub use output::{OutputFormat, OutputWriter};
pub use registry::LabelRegistry;
pub use retrieval::{nearest_labels, DistanceMetric, Neighbor};
pub use tagger::{LabelSet, Registration, SearchReport, TagRun, Tagger};
pub use types::{ConfidenceTag, Label, LabelHierarchyEntry, Tag, TaggedImage, TaggingStats};
pub use vectors::{VectorStore, WordVectors};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
