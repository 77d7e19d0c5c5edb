//! Work unit of one partition for one superstep.

use crate::concurrency::AtomicBitSet;
use crate::config::PregelConfig;
use crate::error::PregelError;
use crate::graph::Graph;

use super::computation::PregelComputation;
use super::context::{ComputeContext, InitContext};
use super::messenger::{Messages, Messenger};
use super::node_value::NodeValue;
use super::partition::Partition;

/// State every partition reads during a superstep.
pub(crate) struct ComputeShared<'a, G: Graph, C: PregelComputation> {
    pub(crate) graph: &'a G,
    pub(crate) computation: &'a C,
    pub(crate) config: &'a PregelConfig<C::Params>,
    pub(crate) node_values: &'a NodeValue,
    pub(crate) messenger: &'a Messenger,
    pub(crate) vote_bits: &'a AtomicBitSet,
}

/// Counters of one partition's superstep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StepStats {
    pub(crate) computed: usize,
    pub(crate) voted_to_halt: usize,
    pub(crate) messages_sent: usize,
}

impl core::ops::AddAssign for StepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.computed += rhs.computed;
        self.voted_to_halt += rhs.voted_to_halt;
        self.messages_sent += rhs.messages_sent;
    }
}

/// Runs the computation over one partition.
#[derive(Debug)]
pub(crate) struct PartitionedComputeStep {
    partition: Partition,
    stats: StepStats,
    error: Option<PregelError>,
}

impl PartitionedComputeStep {
    pub(crate) fn new(partition: Partition) -> Self {
        Self {
            partition,
            stats: StepStats::default(),
            error: None,
        }
    }

    pub(crate) fn partition(&self) -> &Partition {
        &self.partition
    }

    pub(crate) fn stats(&self) -> StepStats {
        self.stats
    }

    pub(crate) fn take_error(&mut self) -> Option<PregelError> {
        self.error.take()
    }

    /// Visits the partition's nodes in ascending order and computes the active
    /// ones. Stops at the first failing node.
    pub(crate) fn run<G: Graph, C: PregelComputation>(
        &mut self,
        shared: &ComputeShared<'_, G, C>,
        superstep: usize,
    ) {
        self.stats = run_nodes(shared, self.partition.nodes(), superstep, &mut self.error);
    }
}

/// Computes every active node of `nodes`, recording the first failure in `error`.
pub(crate) fn run_nodes<G, C, I>(
    shared: &ComputeShared<'_, G, C>,
    nodes: I,
    superstep: usize,
    error: &mut Option<PregelError>,
) -> StepStats
where
    G: Graph,
    C: PregelComputation,
    I: Iterator<Item = usize>,
{
    let initial = superstep == 0;
    let mut computed = 0;
    let mut context = ComputeContext::new(shared, superstep);

    for node_id in nodes {
        let messages = if initial {
            shared.computation.init(&mut InitContext::new(shared, node_id));
            Messages::empty()
        } else {
            shared.messenger.message_iterator(node_id)
        };

        let has_messages = !messages.is_empty();
        if has_messages {
            shared.vote_bits.clear(node_id);
        } else if shared.vote_bits.get(node_id) {
            continue;
        }

        context.bind(node_id);
        computed += 1;
        if let Err(source) = shared.computation.compute(&mut context, messages) {
            *error = Some(PregelError::Computation {
                superstep,
                node_id,
                source: source.into(),
            });
            break;
        }
    }

    StepStats {
        computed,
        voted_to_halt: context.voted_to_halt(),
        messages_sent: context.messages_sent(),
    }
}
