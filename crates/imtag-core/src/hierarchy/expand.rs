//! Breadth-first ancestor expansion over a lexical hierarchy.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{EngineError, EngineResult};
use crate::types::LabelHierarchyEntry;

use super::{BroaderConcept, LexicalHierarchy, NodeId};

/// Discovers the broader-concept ancestors of a seed node.
pub struct HierarchyExpander;

impl HierarchyExpander {
    /// Resolve a word or node id to its candidate senses.
    ///
    /// Fails with [`EngineError::TermNotFound`] when nothing matches.
    pub fn resolve_seed<H>(graph: &H, term: &str) -> EngineResult<Vec<NodeId>>
    where
        H: LexicalHierarchy + ?Sized,
    {
        let nodes = graph.resolve(term);
        if nodes.is_empty() {
            return Err(EngineError::TermNotFound(term.to_string()));
        }
        Ok(nodes)
    }

    /// Ancestor terms of `seed` with their shortest hop distance.
    ///
    /// Every term reached along any path is reported once, at the smallest
    /// level it was found on. The output is sorted by level; terms on the
    /// same level keep the order they were first encountered in.
    pub fn ancestor_hierarchy<H>(graph: &H, seed: NodeId) -> Vec<LabelHierarchyEntry>
    where
        H: LexicalHierarchy + ?Sized,
    {
        let mut entries: Vec<LabelHierarchyEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        Self::walk(graph, seed, |relation, level| {
            for term in Self::implied_terms(graph, relation) {
                match positions.get(term) {
                    Some(&pos) => {
                        if entries[pos].level > level {
                            entries[pos].level = level;
                        }
                    }
                    None => {
                        positions.insert(term.clone(), entries.len());
                        entries.push(LabelHierarchyEntry {
                            level,
                            label: term.clone(),
                        });
                    }
                }
            }
        });

        entries.sort_by_key(|e| e.level);
        entries
    }

    /// Flat, deduplicated ancestor terms of `seed` in encounter order.
    ///
    /// Each relation contributes the term it names, or the ancestor's
    /// canonical term when it names none.
    pub fn ancestor_terms<H>(graph: &H, seed: NodeId) -> Vec<String>
    where
        H: LexicalHierarchy + ?Sized,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut terms = Vec::new();

        Self::walk(graph, seed, |relation, _| {
            let ancestor_terms = graph.terms(relation.ancestor);
            let term = match relation.term {
                Some(i) => ancestor_terms.get(i),
                None => ancestor_terms.first(),
            };
            if let Some(term) = term {
                if seen.insert(term.clone()) {
                    terms.push(term.clone());
                }
            }
        });

        terms
    }

    /// Visit every broader-concept relation reachable from `seed`, breadth
    /// first, with the level of the ancestor it points to.
    ///
    /// A node is expanded at most once. Its first dequeue carries its
    /// shortest level since levels never decrease along the queue.
    fn walk<H, F>(graph: &H, seed: NodeId, mut visit: F)
    where
        H: LexicalHierarchy + ?Sized,
        F: FnMut(&BroaderConcept, usize),
    {
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(seed, 0)]);
        let mut expanded: HashSet<NodeId> = HashSet::new();

        while let Some((node, level)) = queue.pop_front() {
            if !expanded.insert(node) {
                continue;
            }
            let ancestor_level = level + 1;
            for relation in graph.broader_concepts(node) {
                queue.push_back((relation.ancestor, ancestor_level));
                visit(relation, ancestor_level);
            }
        }
    }

    fn implied_terms<'g, H>(graph: &'g H, relation: &BroaderConcept) -> &'g [String]
    where
        H: LexicalHierarchy + ?Sized,
    {
        let terms = graph.terms(relation.ancestor);
        match relation.term {
            Some(i) => terms.get(i).map(std::slice::from_ref).unwrap_or(&[]),
            None => terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::wordnet::fixtures::DATA_NOUN;
    use crate::hierarchy::WordNet;
    use std::path::Path;

    /// Minimal arena graph for shape-specific tests.
    struct TestGraph {
        terms: Vec<Vec<String>>,
        broader: Vec<Vec<BroaderConcept>>,
        ids: Vec<String>,
    }

    impl TestGraph {
        fn new(nodes: &[&[&str]]) -> Self {
            Self {
                terms: nodes
                    .iter()
                    .map(|ts| ts.iter().map(|t| t.to_string()).collect())
                    .collect(),
                broader: vec![Vec::new(); nodes.len()],
                ids: (0..nodes.len()).map(|i| format!("t{}", i)).collect(),
            }
        }

        fn link(mut self, from: usize, to: usize, term: Option<usize>) -> Self {
            self.broader[from].push(BroaderConcept {
                ancestor: NodeId(to),
                term,
            });
            self
        }
    }

    impl LexicalHierarchy for TestGraph {
        fn resolve(&self, term: &str) -> Vec<NodeId> {
            (0..self.terms.len())
                .filter(|&i| self.terms[i].iter().any(|t| t == term))
                .map(NodeId)
                .collect()
        }

        fn broader_concepts(&self, node: NodeId) -> &[BroaderConcept] {
            &self.broader[node.0]
        }

        fn terms(&self, node: NodeId) -> &[String] {
            &self.terms[node.0]
        }

        fn node_id(&self, node: NodeId) -> &str {
            &self.ids[node.0]
        }
    }

    fn wordnet() -> WordNet {
        WordNet::parse(DATA_NOUN, Path::new("data.noun")).unwrap()
    }

    fn level_of(entries: &[LabelHierarchyEntry], label: &str) -> Option<usize> {
        entries.iter().find(|e| e.label == label).map(|e| e.level)
    }

    // ── resolve_seed tests ──

    #[test]
    fn test_resolve_seed_unknown_word() {
        let wn = wordnet();
        let err = HierarchyExpander::resolve_seed(&wn, "unicorn").unwrap_err();
        assert!(matches!(err, EngineError::TermNotFound(ref t) if t == "unicorn"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_resolve_seed_known_word() {
        let wn = wordnet();
        let nodes = HierarchyExpander::resolve_seed(&wn, "dog").unwrap();
        assert_eq!(wn.node_id(nodes[0]), "n02084071");
    }

    // ── ancestor_hierarchy tests ──

    #[test]
    fn test_shortest_path_wins() {
        // dog → mammal directly, and dog → canine → carnivore → mammal
        let wn = wordnet();
        let dog = wn.resolve("dog")[0];
        let entries = HierarchyExpander::ancestor_hierarchy(&wn, dog);
        assert_eq!(level_of(&entries, "mammal"), Some(1));
        assert_eq!(level_of(&entries, "carnivore"), Some(2));
        assert_eq!(level_of(&entries, "entity"), Some(2));
    }

    #[test]
    fn test_reconverging_paths_keep_shortest() {
        // 0 → 1 → 2 → 3(x) and 0 → 4 → 3(x)
        let graph = TestGraph::new(&[&["seed"], &["a"], &["b"], &["x"], &["c"]])
            .link(0, 1, None)
            .link(1, 2, None)
            .link(2, 3, None)
            .link(0, 4, None)
            .link(4, 3, None);
        let entries = HierarchyExpander::ancestor_hierarchy(&graph, NodeId(0));
        assert_eq!(level_of(&entries, "x"), Some(2));
    }

    #[test]
    fn test_one_entry_per_label() {
        let wn = wordnet();
        let dog = wn.resolve("dog")[0];
        let entries = HierarchyExpander::ancestor_hierarchy(&wn, dog);
        let mut labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        let total = labels.len();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), total);
    }

    #[test]
    fn test_sorted_by_level_in_encounter_order() {
        let wn = wordnet();
        let dog = wn.resolve("dog")[0];
        let entries = HierarchyExpander::ancestor_hierarchy(&wn, dog);
        let got: Vec<(usize, &str)> = entries
            .iter()
            .map(|e| (e.level, e.label.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (1, "canine"),
                (1, "domestic_animal"),
                (1, "domesticated_animal"),
                (1, "mammal"),
                (2, "carnivore"),
                (2, "Carnivora"),
                (2, "entity"),
            ]
        );
    }

    #[test]
    fn test_named_term_only() {
        // toy_dog's hypernym pointer names the second word of dog
        let wn = wordnet();
        let toy_dog = wn.resolve("toy_dog")[0];
        let entries = HierarchyExpander::ancestor_hierarchy(&wn, toy_dog);
        assert_eq!(level_of(&entries, "domestic_dog"), Some(1));
        assert_eq!(level_of(&entries, "dog"), None);
        assert_eq!(level_of(&entries, "Canis_familiaris"), None);
        // expansion still continues through dog
        assert_eq!(level_of(&entries, "canine"), Some(2));
    }

    #[test]
    fn test_root_has_no_ancestors() {
        let wn = wordnet();
        let entity = wn.resolve("entity")[0];
        assert!(HierarchyExpander::ancestor_hierarchy(&wn, entity).is_empty());
        assert!(HierarchyExpander::ancestor_terms(&wn, entity).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = TestGraph::new(&[&["a"], &["b"], &["c"]])
            .link(0, 1, None)
            .link(1, 2, None)
            .link(2, 0, None);
        let entries = HierarchyExpander::ancestor_hierarchy(&graph, NodeId(0));
        assert_eq!(level_of(&entries, "b"), Some(1));
        assert_eq!(level_of(&entries, "c"), Some(2));
        // the seed is its own ancestor through the cycle
        assert_eq!(level_of(&entries, "a"), Some(3));
    }

    #[test]
    fn test_graph_is_not_mutated() {
        let wn = wordnet();
        let dog = wn.resolve("dog")[0];
        let first = HierarchyExpander::ancestor_hierarchy(&wn, dog);
        let second = HierarchyExpander::ancestor_hierarchy(&wn, dog);
        assert_eq!(first, second);
    }

    // ── ancestor_terms tests ──

    #[test]
    fn test_flat_uses_canonical_term() {
        let wn = wordnet();
        let dog = wn.resolve("dog")[0];
        let terms = HierarchyExpander::ancestor_terms(&wn, dog);
        assert_eq!(
            terms,
            vec!["canine", "domestic_animal", "mammal", "carnivore", "entity"]
        );
    }

    #[test]
    fn test_flat_uses_named_term() {
        let wn = wordnet();
        let house_cat = wn.resolve("house_cat")[0];
        let terms = HierarchyExpander::ancestor_terms(&wn, house_cat);
        assert_eq!(terms[0], "cat");
        assert!(!terms.contains(&"true_cat".to_string()));
    }

    #[test]
    fn test_flat_named_term_out_of_range_is_skipped() {
        let graph = TestGraph::new(&[&["a"], &["b"]]).link(0, 1, Some(5));
        assert!(HierarchyExpander::ancestor_terms(&graph, NodeId(0)).is_empty());
        assert!(HierarchyExpander::ancestor_hierarchy(&graph, NodeId(0)).is_empty());
    }
}
