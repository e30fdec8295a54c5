//! Lexical hierarchy access and ancestor expansion.
//!
//! The hierarchy is an externally owned, possibly reconverging graph of
//! concepts (WordNet synsets) linked by "broader concept" (hypernym)
//! relations. It is modelled as an arena addressed by [`NodeId`]; traversal
//! state lives in the expander call and the graph itself is never mutated.

mod expand;
pub(crate) mod wordnet;

pub use expand::HierarchyExpander;
pub use wordnet::{Synset, WordNet, NOUN_DATA_FILE};

/// Index of a node in a hierarchy arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A "broader concept" relation from one node to an ancestor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroaderConcept {
    /// The more general node.
    pub ancestor: NodeId,

    /// Index into the ancestor's terms when the relation names one specific
    /// term. `None` means the relation holds for the whole ancestor node.
    pub term: Option<usize>,
}

/// Read-only view of a lexical hierarchy.
pub trait LexicalHierarchy {
    /// Candidate nodes (senses) for a word or a node id.
    fn resolve(&self, term: &str) -> Vec<NodeId>;

    /// Direct broader-concept relations of `node`.
    fn broader_concepts(&self, node: NodeId) -> &[BroaderConcept];

    /// Terms naming `node`, canonical term first.
    fn terms(&self, node: NodeId) -> &[String];

    /// Durable identifier of `node` (e.g. `n02084071`).
    fn node_id(&self, node: NodeId) -> &str;

    /// Human-readable definition, if the hierarchy carries one.
    fn gloss(&self, _node: NodeId) -> Option<&str> {
        None
    }
}
