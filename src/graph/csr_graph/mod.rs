//! A compact CSR (compressed sparse row) graph with optional relationship weights.
//!
//! Memory layout:
//! - `offsets`: `Vec<usize>` of length `n + 1` (row offsets)
//! - `targets`: contiguous `usize` targets, ascending within each row
//! - `weights`: `Option<Vec<f64>>`, parallel to `targets`

use super::Graph;

/// An immutable CSR graph.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_adjacency` | \(O(n + m \log d)\) | Sorts each row |
/// | `neighbors` | \(O(1)\) | Returns an iterator over outgoing targets |
/// | `degree` | \(O(1)\) | Row length |
/// | `for_each_distinct_neighbor` | \(O(d)\) | Rows are sorted, duplicates are adjacent |
#[derive(Debug, Clone)]
pub struct CsrGraph {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Option<Vec<f64>>,
}

impl CsrGraph {
    /// Builds a CSR graph from an adjacency list.
    ///
    /// # Panics
    ///
    /// Panics if any edge references a node index out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);

        let mut total_edges = 0usize;
        for nbrs in adjacency {
            total_edges = total_edges.saturating_add(nbrs.len());
            offsets.push(total_edges);
        }

        let mut targets = Vec::with_capacity(total_edges);
        for (u, nbrs) in adjacency.iter().enumerate() {
            let row_start = targets.len();
            for &v in nbrs {
                assert!(v < n, "edge {u}->{v} is out of bounds for n={n}");
                targets.push(v);
            }
            targets[row_start..].sort_unstable();
        }

        Self {
            offsets,
            targets,
            weights: None,
        }
    }

    /// Builds an unweighted graph with `node_count` nodes from directed `(source, target)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if any endpoint is out of bounds.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![Vec::new(); node_count];
        for &(u, v) in edges {
            assert!(u < node_count, "source {u} is out of bounds for n={node_count}");
            adjacency[u].push(v);
        }
        Self::from_adjacency(&adjacency)
    }

    /// Builds a weighted graph with `node_count` nodes from directed `(source, target, weight)` triples.
    ///
    /// # Panics
    ///
    /// Panics if any endpoint is out of bounds.
    pub fn from_weighted_edges(node_count: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        for &(u, v, w) in edges {
            assert!(u < node_count, "source {u} is out of bounds for n={node_count}");
            assert!(v < node_count, "edge {u}->{v} is out of bounds for n={node_count}");
            rows[u].push((v, w));
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut targets = Vec::with_capacity(edges.len());
        let mut weights = Vec::with_capacity(edges.len());
        for mut row in rows {
            // Stable so parallel edges keep their insertion order.
            row.sort_by_key(|&(t, _)| t);
            for (t, w) in row {
                targets.push(t);
                weights.push(w);
            }
            offsets.push(targets.len());
        }

        Self {
            offsets,
            targets,
            weights: Some(weights),
        }
    }

    /// Builds an undirected view: every edge is stored in both directions.
    pub fn undirected_from_edges(node_count: usize, edges: &[(usize, usize)]) -> Self {
        let both: Vec<_> = edges
            .iter()
            .flat_map(|&(u, v)| [(u, v), (v, u)])
            .collect();
        Self::from_edges(node_count, &both)
    }

    /// Returns the out-neighbors of `node` in ascending order.
    ///
    /// This returns an iterator to avoid allocating a `Vec`.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.targets[self.row(node)].iter().copied()
    }

    /// Checks if an edge exists from `from` to `to`.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        assert!(to < self.node_count(), "to vertex {to} out of bounds");
        self.targets[self.row(from)].binary_search(&to).is_ok()
    }

    #[inline]
    fn row(&self, node: usize) -> core::ops::Range<usize> {
        assert!(node < self.node_count(), "node {node} out of bounds");
        self.offsets[node]..self.offsets[node + 1]
    }
}

impl Graph for CsrGraph {
    fn node_count(&self) -> usize {
        // `offsets` is length `n + 1` by construction.
        self.offsets.len().saturating_sub(1)
    }

    fn relationship_count(&self) -> usize {
        self.targets.len()
    }

    fn degree(&self, node: usize) -> usize {
        self.row(node).len()
    }

    fn has_relationship_weights(&self) -> bool {
        self.weights.is_some()
    }

    fn for_each_relationship<F: FnMut(usize, f64)>(&self, node: usize, mut f: F) {
        let row = self.row(node);
        match &self.weights {
            Some(weights) => {
                for (&t, &w) in self.targets[row.clone()].iter().zip(&weights[row]) {
                    f(t, w);
                }
            }
            None => {
                for &t in &self.targets[row] {
                    f(t, 1.0);
                }
            }
        }
    }

    fn for_each_neighbor<F: FnMut(usize)>(&self, node: usize, mut f: F) {
        for &t in &self.targets[self.row(node)] {
            f(t);
        }
    }

    fn for_each_distinct_neighbor<F: FnMut(usize)>(&self, node: usize, mut f: F) {
        let mut prev = None;
        for &t in &self.targets[self.row(node)] {
            if prev != Some(t) {
                f(t);
                prev = Some(t);
            }
        }
    }
}
