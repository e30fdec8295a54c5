//! Finding image files to tag.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{Result, TaggerError};

/// Finds supported image files under a path.
pub struct FileDiscovery {
    extensions: Vec<String>,
}

/// A file selected for tagging.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            extensions: config
                .supported_formats
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Discover images at `path`.
    ///
    /// A file is returned as-is when its extension is supported. A directory
    /// is walked recursively (following links) and the results are sorted by
    /// path. Anything else is an [`TaggerError::InvalidInput`].
    pub fn discover(&self, path: &Path) -> Result<Vec<DiscoveredFile>> {
        let invalid = |message: &str| TaggerError::InvalidInput {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        let meta = std::fs::metadata(path).map_err(|_| invalid("path does not exist"))?;

        if meta.is_file() {
            if !self.is_supported(path) {
                return Err(invalid("unsupported file extension"));
            }
            return Ok(vec![DiscoveredFile {
                path: path.to_path_buf(),
                size: meta.len(),
            }]);
        }
        if !meta.is_dir() {
            return Err(invalid("path is neither a file nor a directory"));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.is_supported(entry.path()) {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                files.push(DiscoveredFile {
                    path: entry.into_path(),
                    size: meta.len(),
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(&ProcessingConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let d = discovery();
        assert!(d.is_supported(Path::new("test.jpg")));
        assert!(d.is_supported(Path::new("test.JPG")));
        assert!(d.is_supported(Path::new("test.png")));
        assert!(!d.is_supported(Path::new("test.txt")));
        assert!(!d.is_supported(Path::new("noext")));
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"xy").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("sub").join("c.jpeg"), b"xyz").unwrap();

        let files = discovery().discover(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "sub/c.jpeg"]);
        assert_eq!(files[0].size, 2);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpg");
        std::fs::write(&path, b"abc").unwrap();
        let files = discovery().discover(&path).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 3);
    }

    #[test]
    fn test_discover_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"abc").unwrap();
        let err = discovery().discover(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discovery()
            .discover(Path::new("/nonexistent/photos"))
            .unwrap_err();
        assert!(matches!(err, TaggerError::InvalidInput { .. }));
    }
}
