//! Tanner-subgraph diagnostics for a [`Cluster`].
//!
//! The teacher's `graphs.rs` built a `petgraph::UnGraph` over an entire BIKE
//! key's Tanner graph for absorbing-set analysis. The decoder core has no use
//! for that analysis, but the same tool — an undirected bit/check incidence
//! graph, fed to `petgraph`'s connectivity routines — is exactly what you
//! want when inspecting or testing a single cluster's shape: is it a tree
//! (peelable), does it have a cycle, is it actually one connected piece.

use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

use crate::cluster::Cluster;
use crate::pcm::ParityCheckMatrix;

/// The induced Tanner subgraph of a cluster: one node per bit and per check
/// currently owned by it, one edge per incidence recorded in `H`. Bits and
/// checks share the same node-index space; [`ClusterGraph::bit_node`] and
/// [`ClusterGraph::check_node`] recover which side a given node came from.
pub struct ClusterGraph {
    graph: UnGraph<(), ()>,
    bit_nodes: HashMap<usize, NodeIndex>,
    check_nodes: HashMap<usize, NodeIndex>,
}

impl ClusterGraph {
    /// Builds the subgraph from a cluster's current bit/check sets. Edges are
    /// restricted to incidences where both endpoints are already in the
    /// cluster, matching `local_pcm`'s invariant that every recorded column
    /// entry resolves to a row inside `checks`.
    pub fn build(cluster: &Cluster, h: &ParityCheckMatrix) -> Self {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let mut bit_nodes = HashMap::with_capacity(cluster.bits().len());
        let mut check_nodes = HashMap::with_capacity(cluster.checks().len());
        for &bit in cluster.bits() {
            bit_nodes.insert(bit, graph.add_node(()));
        }
        for &check in cluster.checks() {
            check_nodes.insert(check, graph.add_node(()));
        }
        for &bit in cluster.bits() {
            let bit_node = bit_nodes[&bit];
            for &check in h.bit_checks(bit) {
                if let Some(&check_node) = check_nodes.get(&check) {
                    graph.add_edge(bit_node, check_node, ());
                }
            }
        }
        Self { graph, bit_nodes, check_nodes }
    }

    pub fn bit_node(&self, bit: usize) -> Option<NodeIndex> {
        self.bit_nodes.get(&bit).copied()
    }

    pub fn check_node(&self, check: usize) -> Option<NodeIndex> {
        self.check_nodes.get(&check).copied()
    }

    /// Number of distinct connected pieces. A cluster is, by construction,
    /// grown outward from a single seed, so a healthy cluster's subgraph has
    /// exactly one component; more than one indicates bits/checks were
    /// absorbed by a merge without an edge actually relating them to the
    /// seed side, which [`Cluster::absorb`] should never produce.
    pub fn components(&self) -> usize {
        connected_components(&self.graph)
    }

    /// True if the induced subgraph contains a cycle. Mirrors the condition
    /// [`Cluster::peel_decode`] rejects: weight-2-column codes peel exactly
    /// when this is false and the graph is one component.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_undirected(&self.graph)
    }

    /// True iff the cluster's induced subgraph is a single tree: connected,
    /// acyclic, and with the edge count a tree on this many nodes requires.
    pub fn is_tree(&self) -> bool {
        self.components() == 1 && !self.has_cycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> ParityCheckMatrix {
        let rows: Vec<Vec<usize>> = (0..n).map(|c| vec![c, c + 1]).collect();
        ParityCheckMatrix::from_rows(n + 1, rows).unwrap()
    }

    #[test]
    fn tree_cluster_has_one_component_and_no_cycle() {
        let h = chain(3);
        let syndrome = vec![true, false, true];
        let mut cluster = Cluster::seed(crate::cluster::ClusterId::from_raw(0), 0, &syndrome);
        cluster.add_bit(0, &h);
        cluster.add_bit(1, &h);
        cluster.add_check(1, &h, &syndrome);
        cluster.add_bit(2, &h);
        cluster.add_check(2, &h, &syndrome);
        cluster.add_bit(3, &h);

        let graph = ClusterGraph::build(&cluster, &h);
        assert_eq!(graph.components(), 1);
        assert!(graph.is_tree());
    }

    #[test]
    fn four_cycle_cluster_has_cycle() {
        let rows = vec![vec![0, 3], vec![0, 1], vec![1, 2], vec![2, 3]];
        let h = ParityCheckMatrix::from_rows(4, rows).unwrap();
        let syndrome = vec![true, false, true, false];
        let mut cluster = Cluster::seed(crate::cluster::ClusterId::from_raw(0), 0, &syndrome);
        for check in [1, 2, 3] {
            cluster.add_check(check, &h, &syndrome);
        }
        for bit in 0..4 {
            cluster.add_bit(bit, &h);
        }
        let graph = ClusterGraph::build(&cluster, &h);
        assert_eq!(graph.components(), 1);
        assert!(graph.has_cycle());
        assert!(!graph.is_tree());
    }
}
