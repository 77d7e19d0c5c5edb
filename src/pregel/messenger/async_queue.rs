//! Single-buffered per-node message queues.
//!
//! A message becomes readable as soon as it is appended. Reading drains the
//! queue, so a message sent to a node whose partition already processed it this
//! superstep is delivered in the next one. Cross-partition interleaving is not
//! reproducible between runs.

use parking_lot::Mutex;

use crate::mem::{MemoryEstimation, MemoryRange};

use super::Messages;

/// Relaxed-order queue messenger.
pub struct AsyncQueueMessenger {
    queues: Vec<Mutex<Vec<f64>>>,
}

impl AsyncQueueMessenger {
    /// Creates empty queues for `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            queues: (0..node_count).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// Structural memory estimation.
    pub fn memory_estimation() -> MemoryEstimation {
        MemoryEstimation::builder("async queue messenger")
            .per_node("queues", core::mem::size_of::<Mutex<Vec<f64>>>())
            .per_relationship("messages", MemoryRange::between(0, core::mem::size_of::<f64>()))
            .build()
    }

    /// Queues carry over between supersteps; nothing to reset.
    pub fn init_iteration(&mut self, _iteration: usize) {}

    /// Appends `message` to `target`'s queue.
    ///
    /// # Panics
    /// Panics if `target` is not a node id.
    #[inline]
    pub fn send_to(&self, target: usize, message: f64) {
        assert!(
            target < self.queues.len(),
            "target node {target} is out of range [0, {})",
            self.queues.len()
        );
        self.queues[target].lock().push(message);
    }

    /// Drains every message queued for `node` so far.
    #[inline]
    pub fn message_iterator(&self, node: usize) -> Messages<'_> {
        let drained = core::mem::take(&mut *self.queues[node].lock());
        Messages::from_vec(drained)
    }

    /// Whether any queue still holds unread messages.
    pub fn has_pending(&self) -> bool {
        self.queues.iter().any(|q| !q.lock().is_empty())
    }

    /// Drops all queues.
    pub fn release(&mut self) {
        self.queues = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_visible_immediately_and_drained_once() {
        let mut m = AsyncQueueMessenger::new(2);
        m.init_iteration(0);
        m.send_to(0, 4.0);
        assert_eq!(m.message_iterator(0).collect::<Vec<_>>(), vec![4.0]);
        assert!(m.message_iterator(0).is_empty());

        m.send_to(1, 5.0);
        m.init_iteration(1);
        assert_eq!(m.message_iterator(1).collect::<Vec<_>>(), vec![5.0]);
    }
}
