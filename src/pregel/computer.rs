//! Superstep executors.
//!
//! A superstep either runs inline (one worker), as one pool task per fixed
//! partition, or as a fork-join recursion that halves the node range until a
//! piece is at most [`FORK_JOIN_THRESHOLD`] nodes. All three return only after
//! every node of the superstep was visited, which is the barrier.

use std::ops::Range;
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::concurrency::AtomicBitSet;
use crate::config::PregelConfig;
use crate::error::{PregelError, Result};
use crate::graph::Graph;

use super::computation::PregelComputation;
use super::compute_step::{run_nodes, ComputeShared, PartitionedComputeStep, StepStats};
use super::messenger::Messenger;

/// Largest node range a fork-join leaf computes without splitting further.
pub(crate) const FORK_JOIN_THRESHOLD: usize = 1_024;

/// Counters of the last finished superstep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct IterationStats {
    pub(crate) superstep: usize,
    pub(crate) computed_nodes: usize,
    /// Nodes that voted to halt and were not halted before.
    pub(crate) voted_to_halt: usize,
    pub(crate) messages_sent: usize,
}

impl IterationStats {
    fn new(superstep: usize, stats: StepStats) -> Self {
        Self {
            superstep,
            computed_nodes: stats.computed,
            voted_to_halt: stats.voted_to_halt,
            messages_sent: stats.messages_sent,
        }
    }
}

enum Mode {
    Inline,
    Partitioned(Vec<CachePadded<PartitionedComputeStep>>),
    ForkJoin,
}

/// Drives compute steps over the graph, one superstep at a time.
pub(crate) struct PregelComputer {
    pool: Option<Arc<ThreadPool>>,
    mode: Mode,
    node_count: usize,
    superstep: usize,
    last: IterationStats,
}

impl PregelComputer {
    /// Builds the executor for `config`. A supplied `pool` is used instead of a
    /// dedicated one.
    pub(crate) fn new<G: Graph, P>(
        graph: &G,
        config: &PregelConfig<P>,
        pool: Option<Arc<ThreadPool>>,
    ) -> Result<Self> {
        let node_count = graph.node_count();
        let parallel = config.concurrency > 1 && node_count > 1;

        let pool = match (parallel, pool) {
            (false, _) => None,
            (true, Some(pool)) => Some(pool),
            (true, None) => Some(Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(config.concurrency)
                    .thread_name(|i| format!("pregel-worker-{i}"))
                    .build()?,
            )),
        };

        let mode = if pool.is_none() {
            Mode::Inline
        } else if config.use_fork_join {
            Mode::ForkJoin
        } else {
            let steps: Vec<_> = config
                .partitioning
                .split(graph, config.concurrency)
                .into_iter()
                .map(|partition| CachePadded::new(PartitionedComputeStep::new(partition)))
                .collect();
            tracing::debug!(
                partitions = steps.len(),
                sizes = ?steps.iter().map(|s| s.partition().node_count()).collect::<Vec<_>>(),
                "partitioned node space"
            );
            Mode::Partitioned(steps)
        };

        Ok(Self {
            pool,
            mode,
            node_count,
            superstep: 0,
            last: IterationStats::default(),
        })
    }

    /// Sets the superstep index used by the next [`run_iteration`](Self::run_iteration).
    pub(crate) fn init_iteration(&mut self, superstep: usize) {
        self.superstep = superstep;
    }

    /// Runs one superstep over every node and waits for all of them.
    ///
    /// # Errors
    /// The first [`PregelError::Computation`] raised, in node-range order.
    pub(crate) fn run_iteration<G: Graph, C: PregelComputation>(
        &mut self,
        shared: &ComputeShared<'_, G, C>,
    ) -> Result<()> {
        let superstep = self.superstep;
        let (stats, error) = match (&mut self.mode, &self.pool) {
            (Mode::Partitioned(steps), Some(pool)) => {
                pool.scope(|scope| {
                    for step in steps.iter_mut() {
                        scope.spawn(move |_| step.run(shared, superstep));
                    }
                });
                let mut total = StepStats::default();
                let mut error = None;
                for step in steps.iter_mut() {
                    total += step.stats();
                    if let Some(e) = step.take_error() {
                        error.get_or_insert(e);
                    }
                }
                (total, error)
            }
            (Mode::ForkJoin, Some(pool)) => {
                pool.install(|| fork_join(shared, 0..self.node_count, superstep))
            }
            _ => {
                let mut error = None;
                let stats = run_nodes(shared, 0..self.node_count, superstep, &mut error);
                (stats, error)
            }
        };

        self.last = IterationStats::new(superstep, stats);
        error.map_or(Ok(()), Err)
    }

    /// A run converged when every node voted to halt and no message is left
    /// that would reactivate one.
    pub(crate) fn has_converged(vote_bits: &AtomicBitSet, messenger: &Messenger) -> bool {
        vote_bits.all_set() && !messenger.has_pending()
    }

    pub(crate) fn last_stats(&self) -> IterationStats {
        self.last
    }
}

fn fork_join<G: Graph, C: PregelComputation>(
    shared: &ComputeShared<'_, G, C>,
    nodes: Range<usize>,
    superstep: usize,
) -> (StepStats, Option<PregelError>) {
    if nodes.len() <= FORK_JOIN_THRESHOLD {
        let mut error = None;
        let stats = run_nodes(shared, nodes, superstep, &mut error);
        return (stats, error);
    }
    let mid = nodes.start + nodes.len() / 2;
    let ((mut stats, left), (right_stats, right)) = rayon::join(
        || fork_join(shared, nodes.start..mid, superstep),
        || fork_join(shared, mid..nodes.end, superstep),
    );
    stats += right_stats;
    (stats, left.or(right))
}
