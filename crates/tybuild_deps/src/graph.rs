//! Dependency graph construction and reachability.
//!
//! Nodes are cache keys. Two kinds of edge exist: an explicit edge for every
//! resolved include, and an implied edge from each header to the source file
//! with the same stem in the same directory, since a file that includes
//! `Net.h` needs `Net.cpp` linked in. The graph is rebuilt for every query
//! and may contain cycles.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tybuild_common::{posix_parent, posix_stem};

use crate::cache::DependencyCache;
use crate::kind::FileKind;

/// Why an edge exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// The source file has an `#include` of the target.
    Include,
    /// The source is a header and the target its same-stem `.cpp`.
    Implied,
}

/// Directed graph over cache keys.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, EdgeKind>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `key`, adding it if needed.
    pub fn node(&mut self, key: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(key.to_string());
        self.index.insert(key.to_string(), idx);
        idx
    }

    /// Adds an edge `from -> to` unless one already exists.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) {
        let a = self.node(from);
        let b = self.node(to);
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, kind);
        }
    }

    /// Returns `true` if `key` is a node.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns `true` if the edge `from -> to` exists.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Direct successors of `key`, sorted.
    pub fn successors(&self, key: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every node reachable from `start`, excluding `start` itself.
    ///
    /// Empty if `start` is not in the graph.
    pub fn transitive_reachable(&self, start: &str) -> BTreeSet<String> {
        let Some(&origin) = self.index.get(start) else {
            return BTreeSet::new();
        };
        let mut dfs = Dfs::new(&self.graph, origin);
        let mut reached = BTreeSet::new();
        while let Some(node) = dfs.next(&self.graph) {
            if node != origin {
                reached.insert(self.graph[node].clone());
            }
        }
        reached
    }
}

/// Builds the explicit include graph: one node per key, one edge per include.
pub fn build_graph(cache: &DependencyCache) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (key, entry) in cache.iter() {
        graph.node(key);
        for target in &entry.includes {
            graph.add_edge(key, target, EdgeKind::Include);
        }
    }
    graph
}

/// Pairs every header with the source of the same stem in the same directory.
///
/// Returns `(header, source)` tuples sorted by header.
pub fn build_implicit_pairs(cache: &DependencyCache) -> Vec<(String, String)> {
    let mut groups: BTreeMap<(&str, &str), (Option<&str>, Option<&str>)> = BTreeMap::new();
    for key in cache.keys() {
        let slot = groups
            .entry((posix_parent(key), posix_stem(key)))
            .or_default();
        match FileKind::of(key) {
            Some(FileKind::Header) => slot.0 = Some(key),
            Some(FileKind::Source) => slot.1 = Some(key),
            None => {}
        }
    }
    let mut pairs: Vec<(String, String)> = groups
        .into_values()
        .filter_map(|pair| match pair {
            (Some(h), Some(cpp)) => Some((h.to_string(), cpp.to_string())),
            _ => None,
        })
        .collect();
    pairs.sort();
    pairs
}

/// Builds the full dependency graph: include edges plus implied `h -> cpp` edges.
pub fn build_dependency_graph(cache: &DependencyCache) -> DependencyGraph {
    let mut graph = build_graph(cache);
    for (header, source) in build_implicit_pairs(cache) {
        graph.add_edge(&header, &source, EdgeKind::Implied);
    }
    graph
}

/// Free-function form of [`DependencyGraph::transitive_reachable`].
pub fn transitive_reachable(graph: &DependencyGraph, start: &str) -> BTreeSet<String> {
    graph.transitive_reachable(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use tybuild_common::FileIdentity;

    fn cache(entries: &[(&str, &[&str])]) -> DependencyCache {
        let mut cache = DependencyCache::new();
        for (key, includes) in entries {
            cache.insert(
                key.to_string(),
                CacheEntry::new(
                    FileIdentity::default(),
                    includes.iter().map(|s| s.to_string()).collect(),
                ),
            );
        }
        cache
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_edges() {
        let g = build_graph(&cache(&[("a.cpp", &["b.h"]), ("b.h", &[])]));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge("a.cpp", "b.h"));
        assert!(!g.has_edge("b.h", "a.cpp"));
    }

    #[test]
    fn edge_only_target_gets_node() {
        let g = build_graph(&cache(&[("a.cpp", &["gen/Out.h"])]));
        assert!(g.contains("gen/Out.h"));
        assert!(g.successors("gen/Out.h").is_empty());
    }

    #[test]
    fn pairs_require_same_dir_and_stem() {
        let c = cache(&[
            ("core/Net.h", &[]),
            ("core/Net.cpp", &[]),
            ("core/Log.h", &[]),
            ("app/Log.cpp", &[]),
            ("Top.cpp", &[]),
            ("Top.h", &[]),
        ]);
        assert_eq!(
            build_implicit_pairs(&c),
            vec![
                ("Top.h".to_string(), "Top.cpp".to_string()),
                ("core/Net.h".to_string(), "core/Net.cpp".to_string()),
            ]
        );
    }

    #[test]
    fn dependency_graph_adds_implied_edges() {
        let g = build_dependency_graph(&cache(&[
            ("Main.cpp", &["Net.h"]),
            ("Net.h", &[]),
            ("Net.cpp", &["Net.h"]),
        ]));
        assert!(g.has_edge("Net.h", "Net.cpp"));
        assert_eq!(g.successors("Net.h"), vec!["Net.cpp"]);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = DependencyGraph::new();
        g.add_edge("a.h", "a.cpp", EdgeKind::Include);
        g.add_edge("a.h", "a.cpp", EdgeKind::Implied);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn reachability_excludes_start() {
        let g = build_graph(&cache(&[("a.cpp", &["b.h"]), ("b.h", &["c.h"]), ("c.h", &[])]));
        assert_eq!(transitive_reachable(&g, "a.cpp"), set(&["b.h", "c.h"]));
        assert_eq!(transitive_reachable(&g, "c.h"), set(&[]));
    }

    #[test]
    fn reachability_tolerates_cycles() {
        let g = build_graph(&cache(&[("A.h", &["B.h"]), ("B.h", &["A.h"])]));
        assert_eq!(transitive_reachable(&g, "A.h"), set(&["B.h"]));
    }

    #[test]
    fn self_include_excluded() {
        let g = build_graph(&cache(&[("A.cpp", &["A.cpp", "B.h"]), ("B.h", &[])]));
        assert_eq!(transitive_reachable(&g, "A.cpp"), set(&["B.h"]));
    }

    #[test]
    fn unknown_start_is_empty() {
        let g = build_graph(&cache(&[("a.cpp", &[])]));
        assert!(transitive_reachable(&g, "missing.cpp").is_empty());
    }
}
