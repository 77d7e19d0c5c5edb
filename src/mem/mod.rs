//! Memory-cost estimation for admission and planning before a run starts.

pub mod estimation;
pub mod range;

pub use estimation::{GraphDimensions, MemoryEstimation, MemoryEstimationBuilder, MemoryTree};
pub use range::MemoryRange;
