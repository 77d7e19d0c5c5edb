//! The read-only graph contract consumed by the engine, plus a CSR implementation.
//!
//! Node ids are dense integers in `[0, node_count)`. The topology is immutable for
//! the duration of a run and is shared across all partitions without locking,
//! hence the `Sync` bound.

pub mod csr_graph;

pub use csr_graph::CsrGraph;

/// Read-only graph topology.
///
/// Implementations panic when handed a node id outside `[0, node_count)`.
pub trait Graph: Sync {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of relationships (directed edges).
    fn relationship_count(&self) -> usize;

    /// Out-degree of `node`.
    fn degree(&self, node: usize) -> usize;

    /// Whether relationships carry a weight property.
    fn has_relationship_weights(&self) -> bool {
        false
    }

    /// Calls `f(target, weight)` for every outgoing relationship of `node`.
    ///
    /// Unweighted graphs report a weight of `1.0`.
    fn for_each_relationship<F: FnMut(usize, f64)>(&self, node: usize, f: F);

    /// Calls `f(target)` for every outgoing relationship of `node`.
    fn for_each_neighbor<F: FnMut(usize)>(&self, node: usize, mut f: F) {
        self.for_each_relationship(node, |target, _| f(target));
    }

    /// Calls `f(target)` once per distinct target of `node`, in ascending order.
    fn for_each_distinct_neighbor<F: FnMut(usize)>(&self, node: usize, mut f: F) {
        let mut targets = Vec::with_capacity(self.degree(node));
        self.for_each_neighbor(node, |t| targets.push(t));
        targets.sort_unstable();
        targets.dedup();
        targets.into_iter().for_each(&mut f);
    }
}

impl<G: Graph> Graph for &G {
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn relationship_count(&self) -> usize {
        (**self).relationship_count()
    }

    fn degree(&self, node: usize) -> usize {
        (**self).degree(node)
    }

    fn has_relationship_weights(&self) -> bool {
        (**self).has_relationship_weights()
    }

    fn for_each_relationship<F: FnMut(usize, f64)>(&self, node: usize, f: F) {
        (**self).for_each_relationship(node, f);
    }

    fn for_each_neighbor<F: FnMut(usize)>(&self, node: usize, f: F) {
        (**self).for_each_neighbor(node, f);
    }

    fn for_each_distinct_neighbor<F: FnMut(usize)>(&self, node: usize, f: F) {
        (**self).for_each_distinct_neighbor(node, f);
    }
}
