//! Per-search statistics table: node priors/visits and edge Q/N.
//!
//! One table is owned by exactly one `Mcts` instance and lives for one
//! episode's searches. Invariants:
//! - a node record exists iff the node has been expanded (priors computed);
//! - an edge record exists iff the edge has been traversed at least once.

use mz_core::NodeKey;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy)]
pub struct EdgeStats {
    /// Running mean of backed-up values through this edge.
    pub q: f32,
    /// Traversal count.
    pub n: u32,
}

#[derive(Debug, Clone)]
pub struct NodeStats {
    /// Prior action probabilities, masked and renormalized over legal actions.
    /// Produced once at expansion, never recomputed.
    pub p: Vec<f32>,
    /// Node visit count (number of edge traversals out of this node).
    pub n: u32,
    edges: FxHashMap<usize, EdgeStats>,
}

impl NodeStats {
    pub fn edge(&self, action: usize) -> Option<&EdgeStats> {
        self.edges.get(&action)
    }
}

#[derive(Debug, Default)]
pub struct StatsTable {
    nodes: FxHashMap<NodeKey, NodeStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<&NodeStats> {
        self.nodes.get(key)
    }

    /// Record the priors of a freshly expanded leaf. Visits start at zero.
    pub fn expand(&mut self, key: NodeKey, priors: Vec<f32>) {
        debug_assert!(!self.nodes.contains_key(&key), "node expanded twice");
        self.nodes.insert(
            key,
            NodeStats {
                p: priors,
                n: 0,
                edges: FxHashMap::default(),
            },
        );
    }

    /// Back up one traversal of `(key, action)` carrying `value`.
    ///
    /// Q becomes the running mean of all values backed up through the edge;
    /// both the edge and the node visit counts increment by one.
    pub fn record_visit(&mut self, key: &str, action: usize, value: f32) {
        let node = self
            .nodes
            .get_mut(key)
            .expect("record_visit on unexpanded node");
        match node.edges.get_mut(&action) {
            Some(e) => {
                e.q = (e.n as f32 * e.q + value) / (e.n as f32 + 1.0);
                e.n += 1;
            }
            None => {
                node.edges.insert(action, EdgeStats { q: value, n: 1 });
            }
        }
        node.n += 1;
    }

    /// Edge visit counts at `key`, zero-filled over the whole action space.
    pub fn visit_counts(&self, key: &str, action_count: usize) -> Vec<u32> {
        let mut counts = vec![0u32; action_count];
        if let Some(node) = self.nodes.get(key) {
            for (&a, e) in &node.edges {
                if a < action_count {
                    counts[a] = e.n;
                }
            }
        }
        counts
    }
}
