//! One accumulator per node instead of a message list.
//!
//! Every send folds the message into the target's accumulator with a CAS loop,
//! so memory stays O(1) per node regardless of in-degree. Receipt is tracked in
//! a bitset, which keeps an accumulator that happens to equal the identity
//! (a sum of zeros, say) deliverable.

use core::sync::atomic::Ordering;

use crate::concurrency::{AtomicBitSet, AtomicDouble};
use crate::mem::MemoryEstimation;

use super::Messages;

/// A commutative, associative combining function with an identity element.
#[derive(Debug, Clone, Copy)]
pub enum Reducer {
    /// Sum of all messages.
    Sum,
    /// Smallest message.
    Min,
    /// Largest message.
    Max,
    /// User-supplied combiner; `reduce` must be commutative and associative and
    /// `identity` neutral for it.
    Custom {
        /// Neutral element.
        identity: f64,
        /// Combining function `(accumulator, message) -> accumulator`.
        reduce: fn(f64, f64) -> f64,
    },
}

impl Reducer {
    /// Neutral element of the reduction.
    #[inline]
    pub fn identity(&self) -> f64 {
        match self {
            Self::Sum => 0.0,
            Self::Min => f64::INFINITY,
            Self::Max => f64::NEG_INFINITY,
            Self::Custom { identity, .. } => *identity,
        }
    }

    /// Folds `message` into `accumulator`.
    #[inline]
    pub fn reduce(&self, accumulator: f64, message: f64) -> f64 {
        match self {
            Self::Sum => accumulator + message,
            Self::Min => accumulator.min(message),
            Self::Max => accumulator.max(message),
            Self::Custom { reduce, .. } => reduce(accumulator, message),
        }
    }
}

/// Double-buffered reducing messenger.
pub struct ReducingMessenger {
    reducer: Reducer,
    send: Box<[AtomicDouble]>,
    receive: Box<[AtomicDouble]>,
    sent: AtomicBitSet,
    received: AtomicBitSet,
}

impl ReducingMessenger {
    /// Creates accumulators for `node_count` nodes, all at the reducer's identity.
    pub fn new(node_count: usize, reducer: Reducer) -> Self {
        let identity = reducer.identity();
        let accumulators = || -> Box<[AtomicDouble]> {
            (0..node_count).map(|_| AtomicDouble::new(identity)).collect()
        };
        Self {
            reducer,
            send: accumulators(),
            receive: accumulators(),
            sent: AtomicBitSet::new(node_count),
            received: AtomicBitSet::new(node_count),
        }
    }

    /// Structural memory estimation.
    pub fn memory_estimation() -> MemoryEstimation {
        MemoryEstimation::builder("reducing messenger")
            .per_node("send array", core::mem::size_of::<AtomicDouble>())
            .per_node("receive array", core::mem::size_of::<AtomicDouble>())
            .per_node_fn("send flags", AtomicBitSet::memory_estimation)
            .per_node_fn("receive flags", AtomicBitSet::memory_estimation)
            .build()
    }

    /// The reducer in use.
    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    /// Freezes the previous superstep's accumulators and resets the send side.
    pub fn init_iteration(&mut self, _iteration: usize) {
        core::mem::swap(&mut self.send, &mut self.receive);
        core::mem::swap(&mut self.sent, &mut self.received);
        let identity = self.reducer.identity();
        for acc in self.send.iter() {
            acc.store(identity, Ordering::Relaxed);
        }
        self.sent.clear_all();
    }

    /// Folds `message` into `target`'s accumulator for the next superstep.
    ///
    /// # Panics
    /// Panics if `target` is not a node id.
    #[inline]
    pub fn send_to(&self, target: usize, message: f64) {
        assert!(
            target < self.send.len(),
            "target node {target} is out of range [0, {})",
            self.send.len()
        );
        let reducer = self.reducer;
        self.send[target].update(|acc| reducer.reduce(acc, message));
        self.sent.set(target);
    }

    /// The reduced message for `node`, if any was sent during the previous superstep.
    #[inline]
    pub fn message_iterator(&self, node: usize) -> Messages<'_> {
        let message = self
            .received
            .get(node)
            .then(|| self.receive[node].load(Ordering::Relaxed));
        Messages::single(message)
    }

    /// Whether anything was sent during the current superstep.
    pub fn has_pending(&self) -> bool {
        self.sent.cardinality() > 0
    }

    /// Drops both accumulator arrays.
    pub fn release(&mut self) {
        self.send = Box::default();
        self.receive = Box::default();
        self.sent = AtomicBitSet::new(0);
        self.received = AtomicBitSet::new(0);
    }
}
