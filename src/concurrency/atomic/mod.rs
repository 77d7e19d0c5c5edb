//! Lock-free atomic primitives shared across partitions.
//!
//! Important:
//! - Atomic RMW operations have inherent hardware cost; the engine only uses them
//!   where a cell can be touched by more than one partition in a superstep.
//! - Relaxed loads/stores are sufficient wherever the superstep barrier orders access.

/// Word-packed atomic bitsets.
pub mod bitset;
/// `f64` atomics.
pub mod double;

pub use bitset::AtomicBitSet;
pub use double::AtomicDouble;
