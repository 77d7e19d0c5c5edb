//! The top-level superstep loop.

use std::sync::Arc;

use rayon::ThreadPool;

use crate::concurrency::AtomicBitSet;
use crate::config::PregelConfig;
use crate::error::{PregelError, Result};
use crate::graph::Graph;
use crate::mem::MemoryEstimation;

use super::computation::PregelComputation;
use super::compute_step::{ComputeShared, PartitionedComputeStep};
use super::computer::PregelComputer;
use super::context::MasterComputeContext;
use super::messenger::{Messenger, MessengerKind};
use super::node_value::NodeValue;
use super::schema::PregelSchema;

/// Outcome of a finished run.
#[derive(Debug)]
pub struct PregelResult {
    node_values: NodeValue,
    ran_iterations: usize,
    did_converge: bool,
}

impl PregelResult {
    /// Final values of every node.
    pub fn node_values(&self) -> &NodeValue {
        &self.node_values
    }

    /// Takes the values out of the result.
    pub fn into_node_values(self) -> NodeValue {
        self.node_values
    }

    /// Number of supersteps executed, including the converging one.
    pub fn ran_iterations(&self) -> usize {
        self.ran_iterations
    }

    /// Whether every node halted with no message pending, or master compute
    /// asked to stop before `max_iterations` was reached.
    pub fn did_converge(&self) -> bool {
        self.did_converge
    }
}

/// A configured Pregel run over `graph`.
///
/// Created with [`Pregel::create`], executed once with [`Pregel::run`].
pub struct Pregel<'g, G: Graph, C: PregelComputation> {
    graph: &'g G,
    config: PregelConfig<C::Params>,
    computation: C,
    node_values: NodeValue,
    messenger: Messenger,
    vote_bits: AtomicBitSet,
    computer: PregelComputer,
}

impl<'g, G: Graph, C: PregelComputation> Pregel<'g, G, C> {
    /// Validates `config` and allocates every structure of the run.
    ///
    /// # Errors
    /// [`PregelError::InvalidConcurrency`], [`PregelError::AsyncReducerConflict`]
    /// or [`PregelError::ThreadPool`]. No superstep runs when this fails.
    pub fn create(graph: &'g G, config: PregelConfig<C::Params>, computation: C) -> Result<Self> {
        Self::create_with_pool(graph, config, computation, None)
    }

    /// Like [`Pregel::create`], running parallel supersteps on `pool` instead of
    /// a dedicated pool.
    ///
    /// # Errors
    /// See [`Pregel::create`].
    pub fn create_with_pool(
        graph: &'g G,
        config: PregelConfig<C::Params>,
        computation: C,
        pool: Option<Arc<ThreadPool>>,
    ) -> Result<Self> {
        config.validate()?;
        let node_count = graph.node_count();
        let messenger = Messenger::new(node_count, computation.reducer(), config.is_asynchronous)?;
        let schema = computation.schema(&config);
        let node_values = NodeValue::new(schema, node_count);
        let computer = PregelComputer::new(graph, &config, pool)?;

        Ok(Self {
            graph,
            config,
            computation,
            node_values,
            messenger,
            vote_bits: AtomicBitSet::new(node_count),
            computer,
        })
    }

    /// Structural memory estimation of a run with `schema`.
    ///
    /// `is_queue_based` selects the queue messengers (`is_async` picks which
    /// one) over the reducing messenger.
    pub fn memory_estimation(
        schema: &PregelSchema,
        is_queue_based: bool,
        is_async: bool,
    ) -> MemoryEstimation {
        let kind = match (is_queue_based, is_async) {
            (false, _) => MessengerKind::Reducing,
            (true, true) => MessengerKind::AsyncQueue,
            (true, false) => MessengerKind::SyncQueue,
        };
        MemoryEstimation::builder("Pregel")
            .per_node_fn("vote bits", AtomicBitSet::memory_estimation)
            .per_thread("compute steps", core::mem::size_of::<PartitionedComputeStep>())
            .add(NodeValue::memory_estimation(schema))
            .add(Messenger::memory_estimation(kind))
            .build()
    }

    /// Values as they stand; all defaults before [`run`](Self::run).
    pub fn node_values(&self) -> &NodeValue {
        &self.node_values
    }

    /// Messenger strategy chosen for this run.
    pub fn messenger_kind(&self) -> MessengerKind {
        self.messenger.kind()
    }

    /// Runs supersteps until convergence or `max_iterations`.
    ///
    /// # Errors
    /// The first [`PregelError::Computation`] or [`PregelError::MasterCompute`]
    /// raised; the partial values are dropped.
    ///
    /// # Panics
    /// Panics raised by the computation are resumed on the calling thread.
    pub fn run(mut self) -> Result<PregelResult> {
        let node_count = self.graph.node_count();
        let max_iterations = self.config.max_iterations;
        let span = tracing::info_span!("pregel", node_count, max_iterations);
        let _guard = span.enter();

        if node_count == 0 {
            tracing::info!("empty graph, nothing to compute");
            return Ok(self.finish(0, true));
        }

        tracing::info!(
            concurrency = self.config.concurrency,
            messenger = ?self.messenger.kind(),
            fork_join = self.config.use_fork_join,
            "starting pregel run"
        );

        let mut ran_iterations = 0;
        let mut did_converge = false;

        for superstep in 0..max_iterations {
            self.computer.init_iteration(superstep);
            self.messenger.init_iteration(superstep);

            let shared = ComputeShared {
                graph: self.graph,
                computation: &self.computation,
                config: &self.config,
                node_values: &self.node_values,
                messenger: &self.messenger,
                vote_bits: &self.vote_bits,
            };
            self.computer.run_iteration(&shared)?;
            ran_iterations = superstep + 1;

            let mut master = MasterComputeContext::<G, C>::new(
                self.graph,
                &self.config,
                &mut self.node_values,
                superstep,
            );
            let stop = self
                .computation
                .master_compute(&mut master)
                .map_err(|source| PregelError::MasterCompute {
                    superstep,
                    source: source.into(),
                })?;

            let stats = self.computer.last_stats();
            tracing::debug!(
                superstep = stats.superstep,
                active = stats.computed_nodes,
                voted_to_halt = stats.voted_to_halt,
                messages = stats.messages_sent,
                "superstep finished"
            );

            if PregelComputer::has_converged(&self.vote_bits, &self.messenger) {
                did_converge = true;
                break;
            }
            // A master stop on the last allowed superstep is exhaustion, not convergence.
            if stop {
                did_converge = ran_iterations < max_iterations;
                break;
            }
        }

        tracing::info!(ran_iterations, did_converge, "pregel run finished");
        Ok(self.finish(ran_iterations, did_converge))
    }

    /// Drops an engine that will not be run.
    pub fn release(mut self) {
        self.messenger.release();
    }

    fn finish(mut self, ran_iterations: usize, did_converge: bool) -> PregelResult {
        self.messenger.release();
        PregelResult {
            node_values: self.node_values,
            ran_iterations,
            did_converge,
        }
    }
}
