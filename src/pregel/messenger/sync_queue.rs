//! Double-buffered per-node message queues.
//!
//! Messages sent during superstep `i` are appended to the write buffer; at the
//! start of superstep `i + 1` the buffers swap and the frozen read buffer is
//! iterated without locking.

use parking_lot::Mutex;

use crate::mem::{MemoryEstimation, MemoryRange};

use super::Messages;

/// Strict-BSP queue messenger.
pub struct SyncQueueMessenger {
    inboxes: Vec<Vec<f64>>,
    outboxes: Vec<Mutex<Vec<f64>>>,
}

impl SyncQueueMessenger {
    /// Creates empty queues for `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            inboxes: (0..node_count).map(|_| Vec::new()).collect(),
            outboxes: (0..node_count).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// Structural memory estimation.
    pub fn memory_estimation() -> MemoryEstimation {
        MemoryEstimation::builder("sync queue messenger")
            .per_node("inboxes", core::mem::size_of::<Vec<f64>>())
            .per_node("outboxes", core::mem::size_of::<Mutex<Vec<f64>>>())
            // At most one message per relationship in each of the two buffers.
            .per_relationship("messages", MemoryRange::between(0, 2 * core::mem::size_of::<f64>()))
            .build()
    }

    /// Makes the previous superstep's messages readable and empties the write buffer.
    pub fn init_iteration(&mut self, _iteration: usize) {
        for (inbox, outbox) in self.inboxes.iter_mut().zip(self.outboxes.iter_mut()) {
            let outbox = outbox.get_mut();
            core::mem::swap(inbox, outbox);
            outbox.clear();
        }
    }

    /// Whether anything was sent during the current superstep.
    pub fn has_pending(&self) -> bool {
        self.outboxes.iter().any(|o| !o.lock().is_empty())
    }

    /// Queues `message` for `target` in the next superstep.
    ///
    /// # Panics
    /// Panics if `target` is not a node id.
    #[inline]
    pub fn send_to(&self, target: usize, message: f64) {
        assert!(
            target < self.outboxes.len(),
            "target node {target} is out of range [0, {})",
            self.outboxes.len()
        );
        self.outboxes[target].lock().push(message);
    }

    /// Messages sent to `node` during the previous superstep.
    #[inline]
    pub fn message_iterator(&self, node: usize) -> Messages<'_> {
        Messages::from_slice(&self.inboxes[node])
    }

    /// Drops both buffers.
    pub fn release(&mut self) {
        self.inboxes = Vec::new();
        self.outboxes = Vec::new();
    }
}
