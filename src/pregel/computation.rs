//! The user-supplied vertex program.

use crate::config::PregelConfig;
use crate::graph::Graph;

use super::context::{ComputeContext, InitContext, MasterComputeContext};
use super::messenger::{Messages, Reducer};
use super::schema::PregelSchema;

/// A vertex-centric computation run by [`Pregel`](super::Pregel).
///
/// `compute` runs concurrently for nodes of different partitions, hence `Sync`.
/// Within a partition nodes are visited in ascending id order; the order across
/// partitions is unspecified and must not be relied upon.
///
/// ```rust
/// use pregel::{
///     ComputeContext, CsrGraph, Graph, Messages, Pregel, PregelComputation, PregelConfig,
///     PregelSchema, Reducer, ValueType,
/// };
/// use pregel::config::NoParams;
///
/// /// Propagates the smallest node id along relationships.
/// struct MinLabel;
///
/// impl PregelComputation for MinLabel {
///     type Params = NoParams;
///
///     fn schema(&self, _config: &PregelConfig) -> PregelSchema {
///         PregelSchema::builder().add("label", ValueType::Double).build()
///     }
///
///     fn compute<G: Graph>(
///         &self,
///         ctx: &mut ComputeContext<'_, G, Self>,
///         messages: Messages<'_>,
///     ) -> anyhow::Result<()> {
///         let current = if ctx.is_initial_superstep() {
///             ctx.node_id() as f64
///         } else {
///             ctx.double_value("label")
///         };
///         let best = messages.fold(current, f64::min);
///         if ctx.is_initial_superstep() || best < current {
///             ctx.set_double("label", best);
///             ctx.send_to_neighbors(best);
///         }
///         ctx.vote_to_halt();
///         Ok(())
///     }
///
///     fn reducer(&self) -> Option<Reducer> {
///         Some(Reducer::Min)
///     }
/// }
///
/// let graph = CsrGraph::undirected_from_edges(4, &[(3, 2), (2, 1)]);
/// let result = Pregel::create(&graph, PregelConfig::default(), MinLabel)?.run()?;
/// assert!(result.did_converge());
/// assert_eq!(result.node_values().double_value("label", 3), 1.0);
/// assert_eq!(result.node_values().double_value("label", 0), 0.0);
/// # Ok::<(), pregel::PregelError>(())
/// ```
pub trait PregelComputation: Sync + Sized {
    /// Algorithm parameters carried in [`PregelConfig::params`].
    type Params: Sync;

    /// Declares the node properties; called once before any superstep.
    fn schema(&self, config: &PregelConfig<Self::Params>) -> PregelSchema;

    /// One-time per-node setup, run in superstep 0 right before `compute`.
    fn init<G: Graph>(&self, _context: &mut InitContext<'_, G, Self>) {}

    /// Runs for every active node in every superstep.
    ///
    /// # Errors
    /// Any error aborts the whole run.
    fn compute<G: Graph>(
        &self,
        context: &mut ComputeContext<'_, G, Self>,
        messages: Messages<'_>,
    ) -> anyhow::Result<()>;

    /// Runs once per superstep after all partitions finished, single-threaded,
    /// with read/write access to every node's values. Returning `true` ends the
    /// run as converged.
    ///
    /// # Errors
    /// Any error aborts the whole run.
    fn master_compute<G: Graph>(
        &self,
        _context: &mut MasterComputeContext<'_, G, Self>,
    ) -> anyhow::Result<bool> {
        Ok(false)
    }

    /// A reducer switches the run to the reducing messenger.
    fn reducer(&self) -> Option<Reducer> {
        None
    }

    /// Transforms a message sent along a weighted relationship by
    /// [`ComputeContext::send_to_neighbors`].
    fn apply_relationship_weight(&self, message: f64, _weight: f64) -> f64 {
        message
    }
}
