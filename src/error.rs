//! Error taxonomy of the engine.
//!
//! Configuration errors surface from [`crate::Pregel::create`] before any superstep
//! runs; computation errors abort [`crate::Pregel::run`]. Contract violations
//! (out-of-range node ids, undeclared `&str` property keys) panic instead.

use thiserror::Error;

use crate::pregel::schema::ValueType;

/// Boxed error returned by user computation code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by the Pregel engine.
#[derive(Debug, Error)]
pub enum PregelError {
    /// `concurrency` must be at least one.
    #[error("invalid concurrency {0}: concurrency must be at least 1")]
    InvalidConcurrency(usize),

    /// A reducer and asynchronous messaging were both requested.
    #[error("a reducing computation cannot run with asynchronous messaging")]
    AsyncReducerConflict,

    /// A property key was used that the schema does not declare.
    #[error("property `{0}` is not declared in the schema")]
    UnknownProperty(String),

    /// A property key was resolved with the wrong value type.
    #[error("property `{key}` is declared as {declared:?} but was accessed as {requested:?}")]
    PropertyTypeMismatch {
        /// Property key.
        key: String,
        /// Type in the schema.
        declared: ValueType,
        /// Type requested by the caller.
        requested: ValueType,
    },

    /// The per-node computation failed; the run is aborted.
    #[error("computation failed on node {node_id} in superstep {superstep}")]
    Computation {
        /// Superstep in which the failure happened.
        superstep: usize,
        /// Node being computed.
        node_id: usize,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// The master computation failed; the run is aborted.
    #[error("master computation failed in superstep {superstep}")]
    MasterCompute {
        /// Superstep after which the master computation ran.
        superstep: usize,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// The worker pool could not be built.
    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration document could not be parsed.
    #[error("invalid configuration document")]
    Config(#[from] serde_json::Error),
}

/// Result alias for engine operations.
pub type Result<T, E = PregelError> = core::result::Result<T, E>;
