//! WordNet noun database loading.
//!
//! Reads `data.noun` from a WordNet 3.x `dict/` directory. Each non-header
//! line describes one synset:
//!
//! ```text
//! offset lex_filenum ss_type w_cnt {word lex_id}... p_cnt {symbol offset pos src/tgt}... | gloss
//! ```
//!
//! `w_cnt`, `lex_id` and `src/tgt` are hexadecimal. Hypernym (`@`) and
//! instance hypernym (`@i`) pointers to nouns become broader-concept
//! relations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};

use super::{BroaderConcept, LexicalHierarchy, NodeId};

/// Noun data filename inside a WordNet dictionary directory.
pub const NOUN_DATA_FILE: &str = "data.noun";

const HYPERNYM: &str = "@";
const INSTANCE_HYPERNYM: &str = "@i";

/// One WordNet synset.
#[derive(Debug, Clone)]
pub struct Synset {
    /// Synset id: part of speech + 8-digit offset (e.g. `n02084071`)
    pub id: String,
    /// Lemmas as written in the database (underscores for spaces)
    pub words: Vec<String>,
    /// Definition and example sentences
    pub gloss: String,
    /// Hypernym relations, in database order
    pub broader: Vec<BroaderConcept>,
}

/// A loaded WordNet noun hierarchy.
pub struct WordNet {
    synsets: Vec<Synset>,
    by_id: HashMap<String, NodeId>,
    by_lemma: HashMap<String, Vec<NodeId>>,
}

/// A hypernym pointer before offsets are resolved to arena indices.
struct RawPointer {
    offset: String,
    target: Option<usize>,
    line: usize,
}

impl WordNet {
    /// Load the noun hierarchy from a WordNet `dict/` directory.
    pub fn load(dict_dir: &Path) -> EngineResult<Self> {
        let path = noun_data_path(dict_dir);
        let content = std::fs::read_to_string(&path).map_err(|e| EngineError::Hierarchy {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path)
    }

    /// Parse `data.noun` content. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> EngineResult<Self> {
        let mut synsets = Vec::new();
        let mut pointers: Vec<Vec<RawPointer>> = Vec::new();
        let mut by_offset: HashMap<String, NodeId> = HashMap::new();

        for (line_no, line) in content.lines().enumerate() {
            // License header lines start with two spaces.
            if line.starts_with("  ") || line.trim().is_empty() {
                continue;
            }
            let (synset, raw) = parse_line(line, line_no + 1).map_err(|message| {
                EngineError::Hierarchy {
                    path: path.to_path_buf(),
                    message,
                }
            })?;
            let offset = synset.id[1..].to_string();
            by_offset.insert(offset, NodeId(synsets.len()));
            synsets.push(synset);
            pointers.push(raw);
        }

        for (node, raw) in pointers.into_iter().enumerate() {
            let mut broader = Vec::with_capacity(raw.len());
            for p in raw {
                let ancestor = *by_offset.get(&p.offset).ok_or_else(|| EngineError::Hierarchy {
                    path: path.to_path_buf(),
                    message: format!(
                        "line {}: hypernym points to unknown synset {}",
                        p.line, p.offset
                    ),
                })?;
                if let Some(t) = p.target {
                    if t >= synsets[ancestor.0].words.len() {
                        return Err(EngineError::Hierarchy {
                            path: path.to_path_buf(),
                            message: format!(
                                "line {}: target word {} out of range for synset {}",
                                p.line,
                                t + 1,
                                p.offset
                            ),
                        });
                    }
                }
                broader.push(BroaderConcept {
                    ancestor,
                    term: p.target,
                });
            }
            synsets[node].broader = broader;
        }

        let mut by_id = HashMap::with_capacity(synsets.len());
        let mut by_lemma: HashMap<String, Vec<NodeId>> = HashMap::new();
        for (i, synset) in synsets.iter().enumerate() {
            by_id.insert(synset.id.clone(), NodeId(i));
            for word in &synset.words {
                let nodes = by_lemma.entry(word.to_lowercase()).or_default();
                if !nodes.contains(&NodeId(i)) {
                    nodes.push(NodeId(i));
                }
            }
        }

        Ok(Self {
            synsets,
            by_id,
            by_lemma,
        })
    }

    /// Number of synsets.
    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    /// Whether no synsets were loaded.
    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }

    /// Get a synset by node.
    pub fn synset(&self, node: NodeId) -> &Synset {
        &self.synsets[node.0]
    }

    /// Whether `term` looks like a noun synset id (`n` + 8 digits).
    pub fn is_synset_id(term: &str) -> bool {
        term.len() == 9
            && term.starts_with('n')
            && term[1..].bytes().all(|b| b.is_ascii_digit())
    }
}

impl LexicalHierarchy for WordNet {
    fn resolve(&self, term: &str) -> Vec<NodeId> {
        let term = term.trim();
        if Self::is_synset_id(term) {
            return self.by_id.get(term).copied().into_iter().collect();
        }
        let key = term.to_lowercase().replace(' ', "_");
        self.by_lemma.get(&key).cloned().unwrap_or_default()
    }

    fn broader_concepts(&self, node: NodeId) -> &[BroaderConcept] {
        &self.synsets[node.0].broader
    }

    fn terms(&self, node: NodeId) -> &[String] {
        &self.synsets[node.0].words
    }

    fn node_id(&self, node: NodeId) -> &str {
        &self.synsets[node.0].id
    }

    fn gloss(&self, node: NodeId) -> Option<&str> {
        let gloss = self.synsets[node.0].gloss.as_str();
        (!gloss.is_empty()).then_some(gloss)
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<(Synset, Vec<RawPointer>), String> {
    let (data, gloss) = match line.split_once('|') {
        Some((d, g)) => (d, g.trim().to_string()),
        None => (line, String::new()),
    };
    let mut tokens = data.split_whitespace();
    let mut next = |what: &str| {
        tokens
            .next()
            .ok_or_else(|| format!("line {}: missing {}", line_no, what))
    };

    let offset = next("synset offset")?;
    if offset.len() != 8 || !offset.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("line {}: invalid synset offset {:?}", line_no, offset));
    }
    next("lexicographer file number")?;
    let ss_type = next("synset type")?;
    if ss_type != "n" {
        return Err(format!(
            "line {}: expected noun synset, got type {:?}",
            line_no, ss_type
        ));
    }

    let w_cnt = parse_hex(next("word count")?, line_no)?;
    let mut words = Vec::with_capacity(w_cnt);
    for _ in 0..w_cnt {
        words.push(next("word")?.to_string());
        next("lex id")?;
    }
    if words.is_empty() {
        return Err(format!("line {}: synset {} has no words", line_no, offset));
    }

    let p_cnt_token = next("pointer count")?;
    let p_cnt: usize = p_cnt_token
        .parse()
        .map_err(|_| format!("line {}: invalid pointer count {:?}", line_no, p_cnt_token))?;
    let mut pointers = Vec::new();
    for _ in 0..p_cnt {
        let symbol = next("pointer symbol")?;
        let target_offset = next("pointer offset")?;
        let pos = next("pointer part of speech")?;
        let source_target = next("pointer source/target")?;
        if (symbol == HYPERNYM || symbol == INSTANCE_HYPERNYM) && pos == "n" {
            pointers.push(RawPointer {
                offset: target_offset.to_string(),
                target: parse_target(source_target, line_no)?,
                line: line_no,
            });
        }
    }

    Ok((
        Synset {
            id: format!("n{}", offset),
            words,
            gloss,
            broader: Vec::new(),
        },
        pointers,
    ))
}

fn parse_hex(token: &str, line_no: usize) -> Result<usize, String> {
    usize::from_str_radix(token, 16)
        .map_err(|_| format!("line {}: invalid hex number {:?}", line_no, token))
}

/// Decode the `src/tgt` field: low byte is the 1-based target word, 0 = whole synset.
fn parse_target(token: &str, line_no: usize) -> Result<Option<usize>, String> {
    if token.len() != 4 || !token.is_ascii() {
        return Err(format!(
            "line {}: invalid source/target field {:?}",
            line_no, token
        ));
    }
    let target = parse_hex(&token[2..], line_no)?;
    Ok(target.checked_sub(1))
}

/// Location of `data.noun` inside a dictionary directory.
pub(crate) fn noun_data_path(dict_dir: &Path) -> PathBuf {
    dict_dir.join(NOUN_DATA_FILE)
}
