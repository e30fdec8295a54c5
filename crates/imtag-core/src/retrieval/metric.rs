//! Distance metrics over embedding vectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::math::{dot, l2_norm};

/// Named distance functions. Smaller is closer for every metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cos(x, y)`
    #[default]
    Cosine,
    /// L2 distance
    Euclidean,
    /// L1 distance
    Manhattan,
    /// `Σ (x - y)² / (x + y) / 2`, for non-negative histogram-like vectors
    ChiSquared,
}

impl DistanceMetric {
    /// All metrics, in declaration order.
    pub const ALL: [DistanceMetric; 4] = [
        Self::Cosine,
        Self::Euclidean,
        Self::Manhattan,
        Self::ChiSquared,
    ];

    /// Distance between two vectors of the same length.
    ///
    /// Zero vectors under cosine and bins with `x + y == 0` under chi-squared
    /// produce NaN or infinity; callers keep such vectors out.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> EngineResult<f32> {
        if a.len() != b.len() {
            return Err(EngineError::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        let d = match self {
            Self::Cosine => 1.0 - dot(a, b) / (l2_norm(a) * l2_norm(b)),
            Self::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Self::ChiSquared => {
                a.iter()
                    .zip(b)
                    .map(|(x, y)| (x - y) * (x - y) / (x + y))
                    .sum::<f32>()
                    / 2.0
            }
        };
        Ok(d)
    }

    /// Canonical name, as used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::ChiSquared => "chi_squared",
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" | "cos" => Ok(Self::Cosine),
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            "chi2" | "chi-squared" | "chi_squared" => Ok(Self::ChiSquared),
            _ => Err(format!(
                "unknown distance metric '{}' (expected cosine, euclidean, manhattan or chi2)",
                s
            )),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_cosine() {
        let m = DistanceMetric::Cosine;
        assert!(close(m.distance(&[1.0, 0.0], &[2.0, 0.0]).unwrap(), 0.0));
        assert!(close(m.distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 1.0));
        assert!(close(m.distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 2.0));
    }

    #[test]
    fn test_cosine_zero_vector_is_nan() {
        let d = DistanceMetric::Cosine
            .distance(&[0.0, 0.0], &[1.0, 0.0])
            .unwrap();
        assert!(d.is_nan());
    }

    #[test]
    fn test_euclidean() {
        let d = DistanceMetric::Euclidean
            .distance(&[0.0, 0.0], &[3.0, 4.0])
            .unwrap();
        assert!(close(d, 5.0));
    }

    #[test]
    fn test_manhattan() {
        let d = DistanceMetric::Manhattan
            .distance(&[1.0, -1.0], &[3.0, 2.0])
            .unwrap();
        assert!(close(d, 5.0));
    }

    #[test]
    fn test_chi_squared() {
        // ((1-3)²/4 + (2-2)²/4) / 2 = 0.5
        let d = DistanceMetric::ChiSquared
            .distance(&[1.0, 2.0], &[3.0, 2.0])
            .unwrap();
        assert!(close(d, 0.5));
    }

    #[test]
    fn test_identical_vectors_are_zero() {
        let v = [0.2, 0.3, 0.5];
        for m in DistanceMetric::ALL {
            assert!(close(m.distance(&v, &v).unwrap(), 0.0), "{}", m);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        for m in DistanceMetric::ALL {
            let err = m.distance(&[1.0, 2.0], &[1.0]).unwrap_err();
            assert!(matches!(
                err,
                EngineError::DimensionMismatch {
                    expected: 2,
                    actual: 1
                }
            ));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("COSINE".parse::<DistanceMetric>(), Ok(DistanceMetric::Cosine));
        assert_eq!("l2".parse::<DistanceMetric>(), Ok(DistanceMetric::Euclidean));
        assert_eq!("l1".parse::<DistanceMetric>(), Ok(DistanceMetric::Manhattan));
        assert_eq!("chi2".parse::<DistanceMetric>(), Ok(DistanceMetric::ChiSquared));
        assert_eq!("chi-squared".parse::<DistanceMetric>(), Ok(DistanceMetric::ChiSquared));
        assert!("hamming".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for m in DistanceMetric::ALL {
            assert_eq!(m.name().parse::<DistanceMetric>(), Ok(m));
        }
    }

    #[test]
    fn test_serde_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            metric: DistanceMetric,
        }
        let w: Wrapper = toml::from_str("metric = \"chi_squared\"").unwrap();
        assert_eq!(w.metric, DistanceMetric::ChiSquared);
    }
}
