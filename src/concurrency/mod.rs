//! Concurrency primitives for partitioned, superstep-synchronized execution.
//!
//! Important: nothing here is a lock around node state. Vote bits and reduced
//! messages use hardware atomics; array-valued node state relies on the
//! owner-partition convention enforced by the compute step.

pub mod atomic;
pub mod cells;

pub use atomic::{AtomicBitSet, AtomicDouble};
pub use cells::PartitionedCells;
