//! The tagger: wires word vectors, the lexical hierarchy, a classifier and
//! the label registry into the register/search/tag workflow.
//!
//! Registered labels are stored as hierarchy node ids (one per sense of the
//! registered word) and re-embedded through their terms on every tagging
//! run. Tagging an image classifies it, embeds the classifier's tags as a
//! confidence-weighted centroid and returns the nearest registered labels.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::classifier::{ClassifierRegistry, ImageClassifier};
use crate::config::Config;
use crate::discovery::{DiscoveredFile, FileDiscovery};
use crate::embedding::ImageEmbedder;
use crate::error::{EngineError, Result, TaggerError};
use crate::hierarchy::{HierarchyExpander, LexicalHierarchy, WordNet};
use crate::registry::LabelRegistry;
use crate::retrieval::nearest_labels;
use crate::types::{ConfidenceTag, Label, LabelHierarchyEntry, Tag, TaggedImage, TaggingStats};
use crate::vectors::{VectorStore, WordVectors};

type Hierarchy = dyn LexicalHierarchy + Send + Sync;

/// One sense recorded by [`Tagger::register`].
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredSense {
    /// Registry entry (a node id, or the word itself without a hierarchy)
    pub id: String,
    /// Terms the entry can be embedded through
    pub terms: Vec<String>,
    /// Broader terms implied by this sense, nearest first
    pub ancestors: Vec<String>,
    /// Whether any of `terms` has a word vector
    pub has_vector: bool,
    /// False when the entry was already registered
    pub newly_added: bool,
}

/// Outcome of registering one word.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub word: String,
    pub senses: Vec<RegisteredSense>,
}

/// One hierarchy sense of a searched word.
#[derive(Debug, Clone, Serialize)]
pub struct Sense {
    pub id: String,
    pub terms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gloss: Option<String>,
}

/// What the engine knows about a word.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub word: String,
    /// Whether the word has a word vector
    pub in_vectors: bool,
    /// Hierarchy senses; empty when the hierarchy is disabled or lacks the word
    pub senses: Vec<Sense>,
}

/// Leveled ancestors of one sense.
#[derive(Debug, Clone, Serialize)]
pub struct SenseHierarchy {
    pub id: String,
    pub terms: Vec<String>,
    pub ancestors: Vec<LabelHierarchyEntry>,
}

/// Registered labels resolved to vectors for one tagging run.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    /// Candidate points, in registry order
    pub labels: Vec<Label>,
    /// Registry entry each label term came from
    pub entries: HashMap<String, String>,
    /// Registry entries none of whose terms has a vector
    pub skipped: Vec<String>,
}

impl LabelSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Registry entry the label with `term` was embedded from.
    pub fn entry_for(&self, term: &str) -> Option<&str> {
        self.entries.get(term).map(String::as_str)
    }
}

/// Results of tagging every image under a path.
#[derive(Debug, Clone)]
pub struct TagRun {
    pub images: Vec<TaggedImage>,
    pub stats: TaggingStats,
}

/// The label embedding and retrieval engine behind the CLI.
pub struct Tagger {
    config: Config,
    vectors: Box<dyn WordVectors>,
    hierarchy: Option<Box<Hierarchy>>,
    classifier: Option<Box<dyn ImageClassifier>>,
}

impl Tagger {
    /// A tagger over `vectors`, with no hierarchy and no classifier.
    pub fn new(config: Config, vectors: Box<dyn WordVectors>) -> Self {
        Self {
            config,
            vectors,
            hierarchy: None,
            classifier: None,
        }
    }

    /// Open the configured vector store and, if enabled, WordNet.
    ///
    /// The classifier is loaded separately with [`Tagger::load_classifier`]
    /// since only tagging needs it.
    pub fn load(config: Config) -> Result<Self> {
        let vectors_dir = config.vectors_dir();
        let start = Instant::now();
        let store = VectorStore::open(&vectors_dir)?;
        tracing::info!(
            "Loaded {} word vectors ({} dims) from {:?} in {:?}",
            store.len(),
            store.dimension(),
            vectors_dir,
            start.elapsed()
        );

        let mut tagger = Self::new(config, Box::new(store));

        if tagger.config.hierarchy.enabled {
            let dict_dir = tagger.config.wordnet_dir();
            let start = Instant::now();
            let wordnet = WordNet::load(&dict_dir)?;
            tracing::info!(
                "Loaded {} WordNet noun synsets from {:?} in {:?}",
                wordnet.len(),
                dict_dir,
                start.elapsed()
            );
            tagger = tagger.with_hierarchy(Box::new(wordnet));
        } else {
            tracing::debug!("Hierarchy disabled, labels are registered verbatim");
        }

        Ok(tagger)
    }

    pub fn with_hierarchy(mut self, hierarchy: Box<Hierarchy>) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn ImageClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Load the classifier named in the config from `registry`.
    pub fn load_classifier(&mut self, registry: &ClassifierRegistry) -> Result<()> {
        let descriptor = registry.get(&self.config.classifier.name)?;
        let start = Instant::now();
        let classifier = descriptor.instantiate(&self.config.data_dir())?;
        tracing::info!(
            "Loaded classifier {} in {:?}",
            classifier.name(),
            start.elapsed()
        );
        self.classifier = Some(classifier);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the loaded classifier, if any.
    pub fn classifier_name(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.name())
    }

    /// Open the configured label registry.
    pub fn open_registry(&self) -> Result<LabelRegistry> {
        LabelRegistry::open(&self.config.registry_path())
    }

    // --- Registration ---

    /// Register `word` and save the registry.
    pub fn add_label(&self, word: &str) -> Result<Registration> {
        let mut registry = self.open_registry()?;
        let registration = self.register(&mut registry, word)?;
        registry.save()?;
        Ok(registration)
    }

    /// Register `word` into `registry` without saving it.
    ///
    /// With a hierarchy, every sense of the word is stored by node id; a
    /// word that already is a node id registers exactly that node. Without
    /// one, the word itself is stored. Fails with
    /// [`EngineError::TermNotFound`] when the hierarchy does not know the
    /// word.
    pub fn register(&self, registry: &mut LabelRegistry, word: &str) -> Result<Registration> {
        let word = word.trim();
        if word.is_empty() {
            return Err(EngineError::TermNotFound(String::new()).into());
        }

        let Some(hierarchy) = self.hierarchy.as_deref() else {
            let has_vector = self.has_vector(word)?;
            if !has_vector {
                tracing::warn!("Label {:?} has no word vector and will not be matched", word);
            }
            let newly_added = registry.insert(word);
            return Ok(Registration {
                word: word.to_string(),
                senses: vec![RegisteredSense {
                    id: word.to_string(),
                    terms: vec![word.to_string()],
                    ancestors: Vec::new(),
                    has_vector,
                    newly_added,
                }],
            });
        };

        let nodes = HierarchyExpander::resolve_seed(hierarchy, word)?;
        if nodes.len() > 1 {
            tracing::info!("{:?} has {} senses, registering all of them", word, nodes.len());
        }

        let mut senses = Vec::with_capacity(nodes.len());
        for node in nodes {
            let id = hierarchy.node_id(node).to_string();
            let terms = hierarchy.terms(node).to_vec();
            let mut has_vector = false;
            for term in &terms {
                if self.has_vector(term)? {
                    has_vector = true;
                    break;
                }
            }
            if !has_vector {
                tracing::warn!(
                    "No term of {} ({}) has a word vector; it will not be matched",
                    id,
                    terms.join(", ")
                );
            }
            let newly_added = registry.insert(id.clone());
            senses.push(RegisteredSense {
                ancestors: HierarchyExpander::ancestor_terms(hierarchy, node),
                id,
                terms,
                has_vector,
                newly_added,
            });
        }

        Ok(Registration {
            word: word.to_string(),
            senses,
        })
    }

    /// Register every non-empty line of a label file.
    ///
    /// Words the hierarchy does not know are logged and left out; other
    /// errors abort. The registry is saved once at the end.
    pub fn add_labels_from_file(&self, path: &Path) -> Result<Vec<Registration>> {
        let content = std::fs::read_to_string(path).map_err(|e| TaggerError::InvalidInput {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut registry = self.open_registry()?;
        let mut registrations = Vec::new();
        for word in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.register(&mut registry, word) {
                Ok(r) => registrations.push(r),
                Err(TaggerError::Engine(e)) if e.is_recoverable() => {
                    tracing::warn!("Skipping {:?}: {}", word, e);
                }
                Err(e) => return Err(e),
            }
        }
        registry.save()?;
        Ok(registrations)
    }

    /// Remove a registry entry. Returns `false` if it was not registered.
    pub fn remove_label(&self, entry: &str) -> Result<bool> {
        let mut registry = self.open_registry()?;
        let removed = registry.remove(entry.trim());
        if removed {
            registry.save()?;
        }
        Ok(removed)
    }

    /// Registered entries, sorted.
    pub fn labels(&self) -> Result<Vec<String>> {
        Ok(self.open_registry()?.labels().map(String::from).collect())
    }

    // --- Lookup ---

    /// Report whether `word` has a word vector and which senses it has.
    pub fn search(&self, word: &str) -> Result<SearchReport> {
        let word = word.trim();
        let in_vectors = self.has_vector(word)?;
        let senses = match self.hierarchy.as_deref() {
            Some(h) => h
                .resolve(word)
                .into_iter()
                .map(|node| Sense {
                    id: h.node_id(node).to_string(),
                    terms: h.terms(node).to_vec(),
                    gloss: h.gloss(node).map(String::from),
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(SearchReport {
            word: word.to_string(),
            in_vectors,
            senses,
        })
    }

    /// Leveled ancestors for each sense of `word`.
    pub fn label_hierarchy(&self, word: &str) -> Result<Vec<SenseHierarchy>> {
        let hierarchy = self
            .hierarchy
            .as_deref()
            .ok_or(TaggerError::HierarchyDisabled)?;
        let nodes = HierarchyExpander::resolve_seed(hierarchy, word.trim())?;
        Ok(nodes
            .into_iter()
            .map(|node| SenseHierarchy {
                id: hierarchy.node_id(node).to_string(),
                terms: hierarchy.terms(node).to_vec(),
                ancestors: HierarchyExpander::ancestor_hierarchy(hierarchy, node),
            })
            .collect())
    }

    // --- Tagging ---

    /// Resolve the registered labels to vectors.
    pub fn prepare_labels(&self) -> Result<LabelSet> {
        let registry = self.open_registry()?;
        let set = self.embed_labels(registry.labels())?;
        if set.is_empty() {
            tracing::warn!("No registered label has a word vector; images will get no tags");
        } else {
            tracing::debug!("Prepared {} labels", set.len());
        }
        Ok(set)
    }

    /// Embed registry entries.
    ///
    /// A node id is embedded through the first of its terms that has a
    /// vector; anything else through itself. A term reached from two entries
    /// is kept once, for the first entry.
    pub fn embed_labels<'a>(&self, entries: impl IntoIterator<Item = &'a str>) -> Result<LabelSet> {
        let mut set = LabelSet::default();
        for entry in entries {
            match self.embed_entry(entry)? {
                Some(label) => {
                    if !set.entries.contains_key(&label.term) {
                        set.entries.insert(label.term.clone(), entry.to_string());
                        set.labels.push(label);
                    } else {
                        tracing::debug!("{} duplicates term {:?}, skipping", entry, label.term);
                    }
                }
                None => {
                    tracing::warn!("Label {} has no word vector, skipping", entry);
                    set.skipped.push(entry.to_string());
                }
            }
        }

        Ok(set)
    }

    fn embed_entry(&self, entry: &str) -> Result<Option<Label>> {
        let node = self.hierarchy.as_deref().and_then(|h| {
            h.resolve(entry)
                .into_iter()
                .find(|&n| h.node_id(n) == entry)
                .map(|n| (h, n))
        });

        let Some((hierarchy, node)) = node else {
            return Ok(self.lookup(entry)?.map(|v| Label::new(entry, v)));
        };

        for term in hierarchy.terms(node) {
            if let Some(vector) = self.lookup(term)? {
                return Ok(Some(Label::new(term.clone(), vector)));
            }
        }
        Ok(None)
    }

    /// Tag one encoded image against `labels`.
    pub fn tag_bytes(&self, path: &Path, bytes: &[u8], labels: &LabelSet) -> Result<TaggedImage> {
        let classifier = self.classifier.as_deref().ok_or(TaggerError::NoClassifier)?;
        let start = Instant::now();

        let classifier_tags = self.filter_classifier_tags(classifier.classify(bytes)?);
        tracing::trace!("  Classify: {:?}", start.elapsed());

        let content_hash = blake3::hash(bytes).to_hex().to_string();

        if self.config.tagging.raw_results {
            return Ok(TaggedImage {
                file_path: path.to_path_buf(),
                content_hash,
                classifier_tags,
                tags: Vec::new(),
            });
        }

        let embedding = ImageEmbedder::embed(&classifier_tags, self.vectors.as_ref())?;
        if !embedding.skipped.is_empty() {
            tracing::debug!(
                "{:?}: no word vector for classifier tags {:?}",
                path,
                embedding.skipped
            );
        }

        let neighbors = nearest_labels(
            &labels.labels,
            &[embedding.vector],
            self.config.tagging.k,
            self.config.tagging.metric,
        )?;
        let tags = neighbors
            .into_iter()
            .flatten()
            .map(|n| {
                let tag = Tag::new(n.label.term.clone(), n.distance);
                match labels.entry_for(&n.label.term) {
                    Some(id) if id != n.label.term => tag.with_label_id(id),
                    _ => tag,
                }
            })
            .collect();

        tracing::debug!("Tagged {:?} in {:?}", path, start.elapsed());

        Ok(TaggedImage {
            file_path: path.to_path_buf(),
            content_hash,
            classifier_tags,
            tags,
        })
    }

    /// Read and tag one discovered file, enforcing the size limit.
    pub fn tag_file(&self, file: &DiscoveredFile, labels: &LabelSet) -> Result<TaggedImage> {
        let max_bytes = self.config.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if file.size > max_bytes {
            return Err(TaggerError::InvalidInput {
                path: file.path.clone(),
                message: format!(
                    "file is {} MB, limit is {} MB",
                    file.size / (1024 * 1024),
                    self.config.limits.max_file_size_mb
                ),
            });
        }
        let bytes = std::fs::read(&file.path)?;
        self.tag_bytes(&file.path, &bytes, labels)
    }

    /// Find the images at `path` (a file or a directory).
    pub fn discover(&self, path: &Path) -> Result<Vec<DiscoveredFile>> {
        FileDiscovery::new(&self.config.processing).discover(path)
    }

    /// Tag a single image or every image under a directory.
    ///
    /// Images that fail are logged and counted; the run continues.
    pub fn tag_path(&self, path: &Path) -> Result<TagRun> {
        if self.classifier.is_none() {
            return Err(TaggerError::NoClassifier);
        }
        let files = self.discover(path)?;
        let labels = if self.config.tagging.raw_results {
            LabelSet::default()
        } else {
            self.prepare_labels()?
        };

        let start = Instant::now();
        let mut images = Vec::with_capacity(files.len());
        let mut stats = TaggingStats::default();

        for file in &files {
            match self.tag_file(file, &labels) {
                Ok(image) => {
                    images.push(image);
                    stats.succeeded += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to tag {:?}: {}", file.path, e);
                    stats.failed += 1;
                }
            }
        }

        stats.total_seconds = start.elapsed().as_secs_f64();
        if stats.total_seconds > 0.0 {
            stats.images_per_second = stats.succeeded as f64 / stats.total_seconds;
        }

        Ok(TagRun { images, stats })
    }

    /// Apply the confidence floor and per-image tag limit (0 keeps all).
    fn filter_classifier_tags(&self, mut tags: Vec<ConfidenceTag>) -> Vec<ConfidenceTag> {
        let cfg = &self.config.classifier;
        tags.retain(|t| t.confidence >= cfg.min_confidence);
        if cfg.top_k > 0 {
            tags.truncate(cfg.top_k);
        }
        tags
    }

    fn lookup(&self, term: &str) -> Result<Option<Vec<f32>>> {
        match self.vectors.vector(term) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_recoverable() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn has_vector(&self, term: &str) -> Result<bool> {
        Ok(self.lookup(term)?.is_some())
    }
}
