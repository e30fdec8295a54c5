//! Nearest-neighbor retrieval of registered labels.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imtag_core::retrieval::{nearest_labels, DistanceMetric};
//!
//! let results = nearest_labels(&labels, &[embedding.vector], 5, DistanceMetric::Cosine)?;
//! for neighbor in &results[0] {
//!     println!("{} {:.3}", neighbor.label.term, neighbor.distance);
//! }
//! ```

mod knn;
mod metric;

pub use knn::{nearest_labels, Neighbor};
pub use metric::DistanceMetric;
