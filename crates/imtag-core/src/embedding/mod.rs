//! Image embedding from classifier confidences.
//!
//! A classifier only knows its own fixed label set. To compare its output
//! against arbitrary registered labels, each raw tag is mapped into the word
//! vector space and the image is represented by the confidence-weighted
//! centroid of those vectors:
//!
//! ```text
//! v = Σ confidence_i · vec(term_i) / Σ confidence_i
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imtag_core::embedding::ImageEmbedder;
//!
//! let tags = classifier.classify(&bytes)?;
//! let embedding = ImageEmbedder::embed(&tags, &store)?;
//! // embedding.vector has store.dimension() elements
//! ```

use crate::error::{EngineError, EngineResult};
use crate::types::ConfidenceTag;
use crate::vectors::WordVectors;

/// The aggregate point for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEmbedding {
    /// Weighted centroid of the resolved tag vectors.
    pub vector: Vec<f32>,

    /// Tag terms the vector source did not know; they contributed nothing.
    pub skipped: Vec<String>,
}

/// Combines classifier confidences with term vectors.
pub struct ImageEmbedder;

impl ImageEmbedder {
    /// Embed one image's tags as the confidence-weighted centroid of their vectors.
    ///
    /// Unknown terms are skipped and reported in [`ImageEmbedding::skipped`].
    /// Tags with zero confidence are ignored without a lookup. Fails with
    /// [`EngineError::EmptyEmbedding`] when the remaining confidences sum to
    /// zero, and with [`EngineError::DimensionMismatch`] when the source
    /// returns a vector of the wrong length.
    pub fn embed<V>(tags: &[ConfidenceTag], vectors: &V) -> EngineResult<ImageEmbedding>
    where
        V: WordVectors + ?Sized,
    {
        let dim = vectors.dimension();
        let mut sum = vec![0.0f32; dim];
        let mut total_confidence = 0.0f32;
        let mut skipped = Vec::new();

        for tag in tags {
            if tag.confidence == 0.0 {
                continue;
            }

            let vector = match vectors.vector(&tag.term) {
                Ok(v) => v,
                Err(e) if e.is_recoverable() => {
                    skipped.push(tag.term.clone());
                    continue;
                }
                Err(e) => return Err(e),
            };
            if vector.len() != dim {
                return Err(EngineError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }

            for (acc, x) in sum.iter_mut().zip(&vector) {
                *acc += x * tag.confidence;
            }
            total_confidence += tag.confidence;
        }

        if total_confidence == 0.0 {
            return Err(EngineError::EmptyEmbedding);
        }

        let scale = 1.0 / total_confidence;
        for x in sum.iter_mut() {
            *x *= scale;
        }

        Ok(ImageEmbedding {
            vector: sum,
            skipped,
        })
    }

    /// Embed several images independently, one result per image.
    pub fn embed_batch<V>(
        images: &[Vec<ConfidenceTag>],
        vectors: &V,
    ) -> Vec<EngineResult<ImageEmbedding>>
    where
        V: WordVectors + ?Sized,
    {
        images
            .iter()
            .map(|tags| Self::embed(tags, vectors))
            .collect()
    }
}
