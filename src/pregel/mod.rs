//! Vertex-centric bulk-synchronous graph computation.
//!
//! A run executes [`PregelComputation::compute`] for every active node in
//! supersteps separated by a barrier. Nodes exchange `f64` messages through a
//! [`Messenger`] and keep state in a columnar [`NodeValue`] store declared by a
//! [`PregelSchema`]. A node stays active while it has messages or has not voted
//! to halt; the run converges once every node halted and nothing was sent.

pub mod computation;
mod compute_step;
mod computer;
pub mod context;
mod engine;
pub mod messenger;
pub mod node_value;
pub mod partition;
pub mod schema;

pub use computation::PregelComputation;
pub use context::{ComputeContext, InitContext, MasterComputeContext};
pub use engine::{Pregel, PregelResult};
pub use messenger::{Messages, Messenger, MessengerKind, Reducer};
pub use node_value::NodeValue;
pub use partition::{Partition, Partitioning};
pub use schema::{ColumnKey, DefaultValue, Element, PregelSchema, PropertyKey, PropertyType, ValueType, Visibility};
