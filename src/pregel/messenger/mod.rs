//! Message transport across superstep boundaries.
//!
//! Three strategies share one interface (`init_iteration`, `send_to`,
//! `message_iterator`, `release`) and are selected once per run:
//!
//! | Strategy | Visibility | Memory per node |
//! |----------|------------|-----------------|
//! | [`SyncQueueMessenger`] | next superstep | O(in-flight messages), two buffers |
//! | [`AsyncQueueMessenger`] | immediately (opt-in) | O(in-flight messages), one buffer |
//! | [`ReducingMessenger`] | next superstep | O(1), one accumulator |
//!
//! `send_to` may be called from any partition and synchronizes internally;
//! `message_iterator(node)` is only called by the partition owning `node`.

pub mod async_queue;
mod messages;
pub mod reducing;
pub mod sync_queue;

pub use async_queue::AsyncQueueMessenger;
pub use messages::Messages;
pub use reducing::{Reducer, ReducingMessenger};
pub use sync_queue::SyncQueueMessenger;

use crate::error::{PregelError, Result};
use crate::mem::MemoryEstimation;

/// Which messenger strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessengerKind {
    /// Double-buffered queues.
    SyncQueue,
    /// Single-buffered queues.
    AsyncQueue,
    /// Per-node accumulators.
    Reducing,
}

impl MessengerKind {
    /// Chooses the strategy for a computation.
    ///
    /// # Errors
    /// [`PregelError::AsyncReducerConflict`] when a reducer is combined with
    /// asynchronous messaging.
    pub fn select(reducer: Option<Reducer>, is_asynchronous: bool) -> Result<Self> {
        match (reducer, is_asynchronous) {
            (Some(_), true) => Err(PregelError::AsyncReducerConflict),
            (Some(_), false) => Ok(Self::Reducing),
            (None, true) => Ok(Self::AsyncQueue),
            (None, false) => Ok(Self::SyncQueue),
        }
    }
}

/// The message transport of one run.
pub enum Messenger {
    /// Strict-BSP queues.
    SyncQueue(SyncQueueMessenger),
    /// Relaxed-order queues.
    AsyncQueue(AsyncQueueMessenger),
    /// Per-node accumulators.
    Reducing(ReducingMessenger),
}

impl Messenger {
    /// Allocates the messenger for `node_count` nodes.
    ///
    /// # Errors
    /// See [`MessengerKind::select`].
    pub fn new(node_count: usize, reducer: Option<Reducer>, is_asynchronous: bool) -> Result<Self> {
        Ok(match (MessengerKind::select(reducer, is_asynchronous)?, reducer) {
            (MessengerKind::Reducing, Some(r)) => Self::Reducing(ReducingMessenger::new(node_count, r)),
            (MessengerKind::AsyncQueue, _) => Self::AsyncQueue(AsyncQueueMessenger::new(node_count)),
            _ => Self::SyncQueue(SyncQueueMessenger::new(node_count)),
        })
    }

    /// Structural memory estimation of a strategy.
    pub fn memory_estimation(kind: MessengerKind) -> MemoryEstimation {
        match kind {
            MessengerKind::SyncQueue => SyncQueueMessenger::memory_estimation(),
            MessengerKind::AsyncQueue => AsyncQueueMessenger::memory_estimation(),
            MessengerKind::Reducing => ReducingMessenger::memory_estimation(),
        }
    }

    /// Strategy of this messenger.
    pub fn kind(&self) -> MessengerKind {
        match self {
            Self::SyncQueue(_) => MessengerKind::SyncQueue,
            Self::AsyncQueue(_) => MessengerKind::AsyncQueue,
            Self::Reducing(_) => MessengerKind::Reducing,
        }
    }

    /// Prepares the buffers for `iteration`.
    pub fn init_iteration(&mut self, iteration: usize) {
        tracing::trace!(iteration, kind = ?self.kind(), "messenger init iteration");
        match self {
            Self::SyncQueue(m) => m.init_iteration(iteration),
            Self::AsyncQueue(m) => m.init_iteration(iteration),
            Self::Reducing(m) => m.init_iteration(iteration),
        }
    }

    /// Sends `message` to `target`.
    ///
    /// # Panics
    /// Panics if `target` is not a node id.
    #[inline]
    pub fn send_to(&self, target: usize, message: f64) {
        match self {
            Self::SyncQueue(m) => m.send_to(target, message),
            Self::AsyncQueue(m) => m.send_to(target, message),
            Self::Reducing(m) => m.send_to(target, message),
        }
    }

    /// Messages readable by `node` now.
    #[inline]
    pub fn message_iterator(&self, node: usize) -> Messages<'_> {
        match self {
            Self::SyncQueue(m) => m.message_iterator(node),
            Self::AsyncQueue(m) => m.message_iterator(node),
            Self::Reducing(m) => m.message_iterator(node),
        }
    }

    /// Whether messages are waiting to be read by a later superstep.
    pub fn has_pending(&self) -> bool {
        match self {
            Self::SyncQueue(m) => m.has_pending(),
            Self::AsyncQueue(m) => m.has_pending(),
            Self::Reducing(m) => m.has_pending(),
        }
    }

    /// Frees all message buffers.
    pub fn release(&mut self) {
        tracing::trace!(kind = ?self.kind(), "messenger release");
        match self {
            Self::SyncQueue(m) => m.release(),
            Self::AsyncQueue(m) => m.release(),
            Self::Reducing(m) => m.release(),
        }
    }
}
