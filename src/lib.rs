//! # `pregel` - Vertex-Centric Graph Computation
//!
//! A shared-memory engine for bulk-synchronous-parallel ("Pregel") graph
//! algorithms. The user writes one function that runs per node; the engine runs
//! it for every active node in repeated supersteps, delivers `f64` messages
//! between nodes and stops once every node voted to halt or the iteration limit
//! is reached.
//!
//! ## Execution Model
//!
//! - **Supersteps**: all nodes of superstep *i* finish before any node of
//!   superstep *i + 1* starts. The barrier is the only synchronization point an
//!   algorithm observes.
//! - **Partitions**: the node-id space is split across worker threads. A node's
//!   values are only written by the partition that owns it, so the value store
//!   needs no locks.
//! - **Activity**: a node is computed if it received messages or has not voted
//!   to halt. Receiving a message clears its vote.
//! - **Master compute**: an optional single-threaded hook after each barrier
//!   with read/write access to every node.
//!
//! ## Messaging
//!
//! | Messenger | Chosen when | Delivery |
//! |-----------|-------------|----------|
//! | sync queue | default | next superstep, every message |
//! | async queue | `is_asynchronous` | as soon as the receiver runs |
//! | reducing | the computation declares a [`Reducer`] | next superstep, one reduced value |
//!
//! ## Example
//!
//! ```rust
//! use pregel::{
//!     ComputeContext, CsrGraph, Graph, Messages, Pregel, PregelComputation, PregelConfig,
//!     PregelSchema, Reducer, ValueType,
//! };
//! use pregel::config::NoParams;
//!
//! /// Counts incoming relationships.
//! struct InDegree;
//!
//! impl PregelComputation for InDegree {
//!     type Params = NoParams;
//!
//!     fn schema(&self, _config: &PregelConfig) -> PregelSchema {
//!         PregelSchema::builder().add("in", ValueType::Double).build()
//!     }
//!
//!     fn compute<G: Graph>(
//!         &self,
//!         ctx: &mut ComputeContext<'_, G, Self>,
//!         messages: Messages<'_>,
//!     ) -> anyhow::Result<()> {
//!         if ctx.is_initial_superstep() {
//!             ctx.send_to_neighbors(1.0);
//!         } else {
//!             let count: f64 = messages.sum();
//!             ctx.set_double("in", count);
//!         }
//!         ctx.vote_to_halt();
//!         Ok(())
//!     }
//!
//!     fn reducer(&self) -> Option<Reducer> {
//!         Some(Reducer::Sum)
//!     }
//! }
//!
//! let graph = CsrGraph::from_edges(3, &[(0, 2), (1, 2), (0, 1)]);
//! let result = Pregel::create(&graph, PregelConfig::default(), InDegree)?.run()?;
//! assert_eq!(result.node_values().double_value("in", 2), 2.0);
//! assert_eq!(result.ran_iterations(), 2);
//! # Ok::<(), pregel::PregelError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod mem;
pub mod pregel;

pub use config::{NoParams, PregelConfig};
pub use error::{PregelError, Result};
pub use graph::{CsrGraph, Graph};
pub use mem::{GraphDimensions, MemoryEstimation, MemoryRange, MemoryTree};
pub use pregel::{
    ComputeContext, DefaultValue, InitContext, MasterComputeContext, Messages, MessengerKind, NodeValue,
    Partitioning, Pregel, PregelComputation, PregelResult, PregelSchema, PropertyKey, Reducer, ValueType,
    Visibility,
};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Accumulators are plain 64-bit words.
    assert!(mem::size_of::<concurrency::AtomicDouble>() == mem::size_of::<u64>());

    // Typed property handles are a bare index.
    assert!(mem::size_of::<PropertyKey<f64>>() == mem::size_of::<usize>());
};
