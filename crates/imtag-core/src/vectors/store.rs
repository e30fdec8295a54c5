//! Random-access reader over a binary word vector table.
//!
//! A store lives in one directory holding three companion files:
//!
//! - `shape.txt`: `"<vocabulary size> <dim>"`, further tokens ignored
//! - `id.txt`: the terms, whitespace separated, in row order
//! - `feature.bin`: `vocabulary size × dim` little-endian f32, term-major
//!
//! Only the term index is held in memory. Each lookup reads one row straight
//! from `feature.bin` with a positioned read.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};
use crate::types::Label;

/// Shape descriptor filename.
pub const SHAPE_FILE: &str = "shape.txt";

/// Term list filename.
pub const ID_FILE: &str = "id.txt";

/// Vector data filename.
pub const DATA_FILE: &str = "feature.bin";

const F32_SIZE: usize = 4;

/// Read-only word vector store.
///
/// Lookups never move a shared file cursor, so one store can serve
/// concurrent readers behind an `Arc`.
pub struct VectorStore {
    data: File,
    data_path: PathBuf,
    dim: usize,
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl VectorStore {
    /// Open the store in directory `dir`.
    ///
    /// Fails with [`EngineError::StoreOpen`] if any companion file is missing
    /// or malformed, if the id list length disagrees with the shape, or if the
    /// data file is not exactly `vocabulary size × dim × 4` bytes.
    pub fn open(dir: &Path) -> EngineResult<Self> {
        let shape_path = dir.join(SHAPE_FILE);
        let shape = read_text(&shape_path)?;
        let (vocab_size, dim) = parse_shape(&shape).map_err(|message| EngineError::StoreOpen {
            path: shape_path.clone(),
            message,
        })?;

        let id_path = dir.join(ID_FILE);
        let terms: Vec<String> = read_text(&id_path)?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.len() != vocab_size {
            return Err(EngineError::StoreOpen {
                path: id_path,
                message: format!(
                    "id list has {} terms but shape declares {}",
                    terms.len(),
                    vocab_size
                ),
            });
        }

        let data_path = dir.join(DATA_FILE);
        let data = File::open(&data_path).map_err(|e| EngineError::StoreOpen {
            path: data_path.clone(),
            message: e.to_string(),
        })?;
        let actual_len = data
            .metadata()
            .map_err(|e| EngineError::StoreOpen {
                path: data_path.clone(),
                message: e.to_string(),
            })?
            .len();
        let expected_len = (vocab_size as u64) * (dim as u64) * F32_SIZE as u64;
        if actual_len != expected_len {
            return Err(EngineError::StoreOpen {
                path: data_path,
                message: format!(
                    "size mismatch: expected {} bytes ({} terms × {} dims), got {} bytes",
                    expected_len, vocab_size, dim, actual_len
                ),
            });
        }

        // First occurrence wins if the id list repeats a term.
        let mut index = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            index.entry(term.clone()).or_insert(i);
        }

        Ok(Self {
            data,
            data_path,
            dim,
            terms,
            index,
        })
    }

    /// Length of every vector in the store.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Number of terms in the store.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the store holds no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether `term` has a vector.
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// All terms in row order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Read the vector for `term`.
    ///
    /// Every call does its own positioned read of exactly `dim × 4` bytes at
    /// `row × dim × 4`. Unknown terms fail with [`EngineError::TermNotFound`].
    pub fn lookup(&self, term: &str) -> EngineResult<Vec<f32>> {
        let row = *self
            .index
            .get(term)
            .ok_or_else(|| EngineError::TermNotFound(term.to_string()))?;

        let row_bytes = self.dim * F32_SIZE;
        let offset = (row as u64) * (row_bytes as u64);
        let mut buf = vec![0u8; row_bytes];
        read_exact_at(&self.data, &mut buf, offset).map_err(|e| EngineError::StoreIo {
            path: self.data_path.clone(),
            message: format!("read of '{}' at offset {} failed: {}", term, offset, e),
        })?;

        Ok(decode_f32_le(&buf))
    }
}

/// Write a store for `labels` into directory `dir`, creating it if needed.
///
/// All vectors must share one length, and terms must not contain whitespace
/// since the id list is whitespace separated.
pub fn write_store(dir: &Path, labels: &[Label]) -> EngineResult<()> {
    let dim = labels.first().map(|l| l.vector.len()).unwrap_or(0);

    for label in labels {
        if label.vector.len() != dim {
            return Err(EngineError::DimensionMismatch {
                expected: dim,
                actual: label.vector.len(),
            });
        }
        if label.term.is_empty() || label.term.chars().any(char::is_whitespace) {
            return Err(EngineError::StoreIo {
                path: dir.join(ID_FILE),
                message: format!("term {:?} is empty or contains whitespace", label.term),
            });
        }
    }

    let io_err = |path: PathBuf| {
        move |e: io::Error| EngineError::StoreIo {
            path,
            message: e.to_string(),
        }
    };

    std::fs::create_dir_all(dir).map_err(io_err(dir.to_path_buf()))?;

    let shape_path = dir.join(SHAPE_FILE);
    std::fs::write(&shape_path, format!("{} {}\n", labels.len(), dim))
        .map_err(io_err(shape_path.clone()))?;

    let id_path = dir.join(ID_FILE);
    let ids: Vec<&str> = labels.iter().map(|l| l.term.as_str()).collect();
    std::fs::write(&id_path, ids.join(" ")).map_err(io_err(id_path.clone()))?;

    let data_path = dir.join(DATA_FILE);
    let bytes: Vec<u8> = labels
        .iter()
        .flat_map(|l| l.vector.iter().flat_map(|f| f.to_le_bytes()))
        .collect();
    std::fs::write(&data_path, bytes).map_err(io_err(data_path.clone()))?;

    Ok(())
}

fn read_text(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::StoreOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse `"<vocabulary size> <dim> ..."`.
fn parse_shape(content: &str) -> Result<(usize, usize), String> {
    let mut tokens = content.split_whitespace();
    let mut next = |what: &str| -> Result<usize, String> {
        let token = tokens
            .next()
            .ok_or_else(|| format!("missing {} in shape descriptor", what))?;
        token
            .parse::<u32>()
            .map(|v| v as usize)
            .map_err(|e| format!("invalid {} {:?}: {}", what, token, e))
    };
    let vocab_size = next("vocabulary size")?;
    let dim = next("dimension")?;
    Ok((vocab_size, dim))
}

fn decode_f32_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(F32_SIZE)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
