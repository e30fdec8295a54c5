//! Word vectors for labels and classifier terms.
//!
//! Terms are mapped into a shared semantic space by a pretrained word vector
//! model stored on disk as three companion files (see [`VectorStore`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use imtag_core::vectors::{VectorStore, WordVectors};
//!
//! let store = VectorStore::open(Path::new("./data/skipGram"))?;
//! let cat = store.vector("cat")?;
//! assert_eq!(cat.len(), store.dimension());
//! ```

mod store;

pub use store::{write_store, VectorStore, DATA_FILE, ID_FILE, SHAPE_FILE};

use crate::error::EngineResult;

/// A source of fixed-length term vectors.
///
/// The image embedder and label embedding are written against this trait so
/// the word vector model can be swapped without touching them.
pub trait WordVectors: Send + Sync {
    /// Length of every vector this source returns.
    fn dimension(&self) -> usize;

    /// Look up the vector for `term`.
    ///
    /// Fails with [`EngineError::TermNotFound`](crate::error::EngineError::TermNotFound)
    /// for unknown terms.
    fn vector(&self, term: &str) -> EngineResult<Vec<f32>>;
}

impl WordVectors for VectorStore {
    fn dimension(&self) -> usize {
        VectorStore::dimension(self)
    }

    fn vector(&self, term: &str) -> EngineResult<Vec<f32>> {
        self.lookup(term)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::WordVectors;
    use crate::error::{EngineError, EngineResult};

    /// In-memory vectors for unit tests.
    pub struct MemoryVectors {
        pub dim: usize,
        pub vectors: HashMap<String, Vec<f32>>,
    }

    impl MemoryVectors {
        pub fn new(dim: usize, entries: &[(&str, &[f32])]) -> Self {
            Self {
                dim,
                vectors: entries
                    .iter()
                    .map(|(t, v)| (t.to_string(), v.to_vec()))
                    .collect(),
            }
        }
    }

    impl WordVectors for MemoryVectors {
        fn dimension(&self) -> usize {
            self.dim
        }

        fn vector(&self, term: &str) -> EngineResult<Vec<f32>> {
            self.vectors
                .get(term)
                .cloned()
                .ok_or_else(|| EngineError::TermNotFound(term.to_string()))
        }
    }
}
