use super::liveness::Liveness;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected graph over the variables competing for registers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterferenceGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl InterferenceGraph {
    /// One node per allocatable variable; an edge joins every two of them
    /// found together in `def ∪ live_out` of some instruction
    pub fn build<'v>(variables: impl IntoIterator<Item = &'v str>, liveness: &Liveness) -> Self {
        let mut graph = Self::default();
        for name in variables {
            graph.add_node(name);
        }

        for index in 0..liveness.len() {
            let together: Vec<&String> = liveness.defs[index]
                .union(&liveness.live_out[index])
                .filter(|name| graph.contains(name.as_str()))
                .collect();
            for (i, a) in together.iter().enumerate() {
                for b in &together[i + 1..] {
                    graph.add_edge(a, b);
                }
            }
        }
        graph
    }

    pub fn add_node(&mut self, name: &str) {
        self.adjacency.entry(name.to_string()).or_default();
    }

    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.adjacency.entry(a.to_string()).or_default().insert(b.to_string());
        self.adjacency.entry(b.to_string()).or_default().insert(a.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
    }

    pub fn interferes(&self, a: &str, b: &str) -> bool {
        self.adjacency.get(a).map(|n| n.contains(b)).unwrap_or(false)
    }

    pub fn neighbours(&self, name: &str) -> impl Iterator<Item = &str> {
        self.adjacency.get(name).into_iter().flatten().map(String::as_str)
    }

    pub fn degree(&self, name: &str) -> usize {
        self.adjacency.get(name).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Drop a node and every edge touching it
    pub fn remove(&mut self, name: &str) {
        if let Some(neighbours) = self.adjacency.remove(name) {
            for other in neighbours {
                if let Some(set) = self.adjacency.get_mut(&other) {
                    set.remove(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_symmetric() {
        let mut graph = InterferenceGraph::default();
        graph.add_edge("a", "b");
        graph.add_edge("a", "a");
        graph.add_node("c");

        assert!(graph.interferes("a", "b"));
        assert!(graph.interferes("b", "a"));
        assert!(!graph.interferes("a", "a"));
        assert_eq!(graph.degree("c"), 0);
        assert_eq!(graph.len(), 3);

        graph.remove("a");
        assert_eq!(graph.degree("b"), 0);
    }
}
