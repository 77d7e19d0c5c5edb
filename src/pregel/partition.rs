//! Splitting node ids into disjoint partitions.
//!
//! Every strategy yields partitions that are pairwise disjoint, cover
//! `[0, node_count)`, and enumerate their nodes in ascending id order. Disjointness
//! is what lets compute steps write node values and vote bits without locks.

use core::iter::StepBy;
use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// How node ids are assigned to fixed partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Partitioning {
    /// Contiguous slices of (almost) equal node count.
    #[default]
    Range,
    /// Contiguous slices of (almost) equal degree sum.
    Degree,
    /// Partition `k` owns ids `k, k + c, k + 2c, ...`.
    Interleaved,
}

/// A set of node ids owned by one compute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Ids `start..end`.
    Range {
        /// First id.
        start: usize,
        /// One past the last id.
        end: usize,
    },
    /// Ids `offset, offset + stride, ...` below `end`.
    Interleaved {
        /// First id.
        offset: usize,
        /// Distance between ids.
        stride: usize,
        /// Exclusive upper bound.
        end: usize,
    },
}

impl Partition {
    /// A contiguous partition.
    pub fn range(start: usize, end: usize) -> Self {
        assert!(start <= end, "partition start {start} exceeds end {end}");
        Self::Range { start, end }
    }

    /// Node ids in ascending order.
    #[inline]
    pub fn nodes(&self) -> StepBy<Range<usize>> {
        match *self {
            Self::Range { start, end } => (start..end).step_by(1),
            Self::Interleaved { offset, stride, end } => (offset..end).step_by(stride),
        }
    }

    /// Number of node ids.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Whether `node` belongs to this partition.
    pub fn contains(&self, node: usize) -> bool {
        match *self {
            Self::Range { start, end } => (start..end).contains(&node),
            Self::Interleaved { offset, stride, end } => {
                node >= offset && node < end && (node - offset) % stride == 0
            }
        }
    }
}

impl Partitioning {
    /// Splits the nodes of `graph` into at most `concurrency` non-empty partitions.
    ///
    /// # Panics
    /// Panics if `concurrency == 0`.
    pub fn split<G: Graph>(self, graph: &G, concurrency: usize) -> Vec<Partition> {
        assert!(concurrency != 0, "concurrency must be > 0");
        let n = graph.node_count();
        if n == 0 {
            return Vec::new();
        }
        let parts = concurrency.min(n);
        match self {
            Self::Range => {
                let batch = n.div_ceil(parts);
                (0..n)
                    .step_by(batch)
                    .map(|start| Partition::range(start, (start + batch).min(n)))
                    .collect()
            }
            Self::Interleaved => (0..parts)
                .map(|offset| Partition::Interleaved {
                    offset,
                    stride: parts,
                    end: n,
                })
                .collect(),
            Self::Degree => degree_partitions(graph, parts),
        }
    }
}

/// Cuts contiguous slices whose `degree + 1` sums approach `total / parts`.
///
/// The `+ 1` keeps isolated nodes from collapsing into a single partition.
fn degree_partitions<G: Graph>(graph: &G, parts: usize) -> Vec<Partition> {
    let n = graph.node_count();
    let total: usize = (0..n).map(|v| graph.degree(v) + 1).sum();
    let target = total.div_ceil(parts);

    let mut partitions = Vec::with_capacity(parts);
    let mut start = 0;
    let mut acc = 0;
    for v in 0..n {
        acc += graph.degree(v) + 1;
        if acc >= target && partitions.len() + 1 < parts {
            partitions.push(Partition::range(start, v + 1));
            start = v + 1;
            acc = 0;
        }
    }
    if start < n {
        partitions.push(Partition::range(start, n));
    }
    partitions
}
