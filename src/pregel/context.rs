//! Views handed to the user computation.
//!
//! [`InitContext`] and [`ComputeContext`] are bound to one node of the calling
//! partition and can only read or write that node's values. Getters borrow the
//! context and setters take it mutably, so an array borrowed from a getter can
//! never be alive across a write. [`MasterComputeContext`] runs after the barrier
//! with exclusive access to all values.

use crate::config::PregelConfig;
use crate::graph::Graph;

use super::compute_step::ComputeShared;
use super::computation::PregelComputation;
use super::node_value::NodeValue;
use super::schema::ColumnKey;

macro_rules! own_node_accessors {
    () => {
        /// `i64` value of the current node.
        #[inline]
        pub fn long_value<K: ColumnKey<i64> + ?Sized>(&self, key: &K) -> i64 {
            self.shared.node_values.long_value(key, self.node_id)
        }

        /// `f64` value of the current node.
        #[inline]
        pub fn double_value<K: ColumnKey<f64> + ?Sized>(&self, key: &K) -> f64 {
            self.shared.node_values.double_value(key, self.node_id)
        }

        /// `i64` array of the current node.
        #[inline]
        pub fn long_array_value<K: ColumnKey<Vec<i64>> + ?Sized>(&self, key: &K) -> &[i64] {
            self.shared.node_values.long_array_value(key, self.node_id)
        }

        /// `f64` array of the current node.
        #[inline]
        pub fn double_array_value<K: ColumnKey<Vec<f64>> + ?Sized>(&self, key: &K) -> &[f64] {
            self.shared.node_values.double_array_value(key, self.node_id)
        }

        /// Sets the `i64` value of the current node.
        #[inline]
        pub fn set_long<K: ColumnKey<i64> + ?Sized>(&mut self, key: &K, value: i64) {
            self.shared.node_values.set_long_owned(key, self.node_id, value);
        }

        /// Sets the `f64` value of the current node.
        #[inline]
        pub fn set_double<K: ColumnKey<f64> + ?Sized>(&mut self, key: &K, value: f64) {
            self.shared.node_values.set_double_owned(key, self.node_id, value);
        }

        /// Sets the `i64` array of the current node.
        #[inline]
        pub fn set_long_array<K: ColumnKey<Vec<i64>> + ?Sized>(&mut self, key: &K, value: Vec<i64>) {
            // SAFETY: the partition running this context owns `node_id`, and `&mut self`
            // rules out outstanding borrows from the getters.
            unsafe {
                self.shared
                    .node_values
                    .set_long_array_owned(key, self.node_id, value);
            }
        }

        /// Sets the `f64` array of the current node.
        #[inline]
        pub fn set_double_array<K: ColumnKey<Vec<f64>> + ?Sized>(&mut self, key: &K, value: Vec<f64>) {
            // SAFETY: as in `set_long_array`.
            unsafe {
                self.shared
                    .node_values
                    .set_double_array_owned(key, self.node_id, value);
            }
        }

        /// Id of the current node.
        #[inline]
        pub fn node_id(&self) -> usize {
            self.node_id
        }

        /// Number of nodes in the graph.
        #[inline]
        pub fn node_count(&self) -> usize {
            self.shared.graph.node_count()
        }

        /// Out-degree of the current node.
        #[inline]
        pub fn degree(&self) -> usize {
            self.shared.graph.degree(self.node_id)
        }

        /// The run's configuration.
        #[inline]
        pub fn config(&self) -> &PregelConfig<C::Params> {
            self.shared.config
        }
    };
}

/// One-time setup view of a node in superstep 0.
pub struct InitContext<'a, G: Graph, C: PregelComputation> {
    shared: &'a ComputeShared<'a, G, C>,
    node_id: usize,
}

impl<'a, G: Graph, C: PregelComputation> InitContext<'a, G, C> {
    pub(crate) fn new(shared: &'a ComputeShared<'a, G, C>, node_id: usize) -> Self {
        Self { shared, node_id }
    }

    own_node_accessors!();
}

/// Per-node view during a superstep.
pub struct ComputeContext<'a, G: Graph, C: PregelComputation> {
    shared: &'a ComputeShared<'a, G, C>,
    node_id: usize,
    superstep: usize,
    messages_sent: usize,
    voted_to_halt: usize,
}

impl<'a, G: Graph, C: PregelComputation> ComputeContext<'a, G, C> {
    pub(crate) fn new(shared: &'a ComputeShared<'a, G, C>, superstep: usize) -> Self {
        Self {
            shared,
            node_id: 0,
            superstep,
            messages_sent: 0,
            voted_to_halt: 0,
        }
    }

    #[inline]
    pub(crate) fn bind(&mut self, node_id: usize) {
        self.node_id = node_id;
    }

    pub(crate) fn messages_sent(&self) -> usize {
        self.messages_sent
    }

    pub(crate) fn voted_to_halt(&self) -> usize {
        self.voted_to_halt
    }

    own_node_accessors!();

    /// Index of the running superstep, starting at 0.
    #[inline]
    pub fn superstep(&self) -> usize {
        self.superstep
    }

    /// Whether this is superstep 0.
    #[inline]
    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    /// Number of relationships in the graph.
    #[inline]
    pub fn relationship_count(&self) -> usize {
        self.shared.graph.relationship_count()
    }

    /// Calls `f` for every outgoing neighbor of the current node.
    #[inline]
    pub fn for_each_neighbor(&self, f: impl FnMut(usize)) {
        self.shared.graph.for_each_neighbor(self.node_id, f);
    }

    /// Calls `f` once per distinct outgoing neighbor of the current node.
    #[inline]
    pub fn for_each_distinct_neighbor(&self, f: impl FnMut(usize)) {
        self.shared.graph.for_each_distinct_neighbor(self.node_id, f);
    }

    /// Sends `message` along every outgoing relationship.
    ///
    /// On weighted graphs each copy is first passed through
    /// [`PregelComputation::apply_relationship_weight`].
    pub fn send_to_neighbors(&mut self, message: f64) {
        let shared = self.shared;
        let mut sent = 0;
        if shared.graph.has_relationship_weights() {
            shared.graph.for_each_relationship(self.node_id, |target, weight| {
                let weighted = shared.computation.apply_relationship_weight(message, weight);
                shared.messenger.send_to(target, weighted);
                sent += 1;
            });
        } else {
            shared.graph.for_each_neighbor(self.node_id, |target| {
                shared.messenger.send_to(target, message);
                sent += 1;
            });
        }
        self.messages_sent += sent;
    }

    /// Sends `message` to an explicit `target`.
    ///
    /// # Panics
    /// Panics if `target` is not a node id.
    #[inline]
    pub fn send_to(&mut self, target: usize, message: f64) {
        self.shared.messenger.send_to(target, message);
        self.messages_sent += 1;
    }

    /// Marks the current node inactive from the next superstep on, unless a
    /// message reactivates it.
    #[inline]
    pub fn vote_to_halt(&mut self) {
        if self.shared.vote_bits.test_and_set(self.node_id) {
            self.voted_to_halt += 1;
        }
    }
}

/// Single-threaded, whole-graph view run after each superstep's barrier.
pub struct MasterComputeContext<'a, G: Graph, C: PregelComputation> {
    graph: &'a G,
    config: &'a PregelConfig<C::Params>,
    node_values: &'a mut NodeValue,
    superstep: usize,
}

impl<'a, G: Graph, C: PregelComputation> MasterComputeContext<'a, G, C> {
    pub(crate) fn new(
        graph: &'a G,
        config: &'a PregelConfig<C::Params>,
        node_values: &'a mut NodeValue,
        superstep: usize,
    ) -> Self {
        Self {
            graph,
            config,
            node_values,
            superstep,
        }
    }

    /// Index of the superstep that just finished.
    pub fn superstep(&self) -> usize {
        self.superstep
    }

    /// Whether the finished superstep was superstep 0.
    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Out-degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.graph.degree(node)
    }

    /// The graph.
    pub fn graph(&self) -> &G {
        self.graph
    }

    /// The run's configuration.
    pub fn config(&self) -> &PregelConfig<C::Params> {
        self.config
    }

    /// Calls `f` for node ids in ascending order until it returns `false`.
    pub fn for_each_node(&self, mut f: impl FnMut(usize) -> bool) {
        for node in 0..self.graph.node_count() {
            if !f(node) {
                break;
            }
        }
    }

    /// Read access to every node's values.
    pub fn node_values(&self) -> &NodeValue {
        self.node_values
    }

    /// Write access to every node's values.
    pub fn node_values_mut(&mut self) -> &mut NodeValue {
        self.node_values
    }

    /// `i64` value of `node`.
    pub fn long_value<K: ColumnKey<i64> + ?Sized>(&self, key: &K, node: usize) -> i64 {
        self.node_values.long_value(key, node)
    }

    /// `f64` value of `node`.
    pub fn double_value<K: ColumnKey<f64> + ?Sized>(&self, key: &K, node: usize) -> f64 {
        self.node_values.double_value(key, node)
    }

    /// `i64` array of `node`.
    pub fn long_array_value<K: ColumnKey<Vec<i64>> + ?Sized>(&self, key: &K, node: usize) -> &[i64] {
        self.node_values.long_array_value(key, node)
    }

    /// `f64` array of `node`.
    pub fn double_array_value<K: ColumnKey<Vec<f64>> + ?Sized>(&self, key: &K, node: usize) -> &[f64] {
        self.node_values.double_array_value(key, node)
    }

    /// Sets the `i64` value of `node`.
    pub fn set_long<K: ColumnKey<i64> + ?Sized>(&mut self, key: &K, node: usize, value: i64) {
        self.node_values.set_long(key, node, value);
    }

    /// Sets the `f64` value of `node`.
    pub fn set_double<K: ColumnKey<f64> + ?Sized>(&mut self, key: &K, node: usize, value: f64) {
        self.node_values.set_double(key, node, value);
    }

    /// Sets the `i64` array of `node`.
    pub fn set_long_array<K: ColumnKey<Vec<i64>> + ?Sized>(&mut self, key: &K, node: usize, value: Vec<i64>) {
        self.node_values.set_long_array(key, node, value);
    }

    /// Sets the `f64` array of `node`.
    pub fn set_double_array<K: ColumnKey<Vec<f64>> + ?Sized>(&mut self, key: &K, node: usize, value: Vec<f64>) {
        self.node_values.set_double_array(key, node, value);
    }
}
