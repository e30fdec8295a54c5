//! Brute-force k-nearest-neighbor search over embedded labels.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::error::EngineResult;
use crate::types::Label;

use super::metric::DistanceMetric;

/// A candidate label and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub label: &'a Label,
    pub distance: f32,
}

/// Find the `k` closest candidates for every query.
///
/// Each query is compared against every candidate. Results are ordered by
/// ascending distance; equal distances keep candidate order and NaN
/// distances sort last. At most `min(k, candidates.len())` neighbors are
/// returned per query, so `k == 0` yields empty lists. Queries run in
/// parallel and the output keeps query order.
pub fn nearest_labels<'a, Q>(
    candidates: &'a [Label],
    queries: &[Q],
    k: usize,
    metric: DistanceMetric,
) -> EngineResult<Vec<Vec<Neighbor<'a>>>>
where
    Q: AsRef<[f32]> + Sync,
{
    if k == 0 {
        return Ok(queries.iter().map(|_| Vec::new()).collect());
    }

    queries
        .par_iter()
        .map(|q| nearest_for_query(candidates, q.as_ref(), k, metric))
        .collect()
}

fn nearest_for_query<'a>(
    candidates: &'a [Label],
    query: &[f32],
    k: usize,
    metric: DistanceMetric,
) -> EngineResult<Vec<Neighbor<'a>>> {
    let mut neighbors = candidates
        .iter()
        .map(|label| {
            Ok(Neighbor {
                label,
                distance: metric.distance(query, &label.vector)?,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    // stable: ties keep candidate order
    neighbors.sort_by(|a, b| compare_distance(a.distance, b.distance));
    neighbors.truncate(k);
    Ok(neighbors)
}

/// Total order on distances with every NaN after every number.
fn compare_distance(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
