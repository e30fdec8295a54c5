//! Command implementations.

pub mod classifiers;
pub mod config;
pub mod labels;
pub mod lookup;
pub mod tag;

use std::path::Path;

use imtag_core::Config;

/// Load the config from `path`, or from the default location.
///
/// An explicit path must exist; the default location may be absent.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Ok(Config::load_from(path)?)
        }
        None => Ok(Config::load()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_config_fails() {
        let err = load_config(Some(Path::new("/nonexistent/imtag.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_explicit_config_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\nk = 3\nmetric = \"euclidean\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.tagging.k, 3);
        assert_eq!(config.tagging.metric, imtag_core::DistanceMetric::Euclidean);
    }
}
