//! Engine configuration.
//!
//! A [`PregelConfig`] carries the engine's own knobs plus an algorithm-specific
//! parameter block `P`, flattened into the same document when (de)serialized:
//!
//! ```json
//! { "maxIterations": 20, "concurrency": 4, "dampingFactor": 0.85 }
//! ```
//!
//! Validation is not optional: [`crate::Pregel::create`] always calls
//! [`PregelConfig::validate`], whatever way the value was built.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{PregelError, Result};
use crate::pregel::partition::Partitioning;

/// Default number of supersteps.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;
/// Default worker count.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Parameter block for computations without algorithm-specific settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoParams {}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Configuration of a Pregel run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PregelConfig<P = NoParams> {
    /// Upper bound on supersteps.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Number of worker threads and partitions.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deliver messages within the superstep they are sent in.
    #[serde(default)]
    pub is_asynchronous: bool,
    /// Split work recursively on a fork-join pool instead of fixed partitions.
    #[serde(default)]
    pub use_fork_join: bool,
    /// How node ids are split into fixed partitions.
    #[serde(default)]
    pub partitioning: Partitioning,
    /// Algorithm parameters, opaque to the engine.
    #[serde(flatten)]
    pub params: P,
}

impl<P: Default> Default for PregelConfig<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P> PregelConfig<P> {
    /// Creates a configuration with default engine settings.
    pub fn new(params: P) -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            concurrency: DEFAULT_CONCURRENCY,
            is_asynchronous: false,
            use_fork_join: false,
            partitioning: Partitioning::default(),
            params,
        }
    }

    /// Sets the maximum number of supersteps.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enables asynchronous message delivery.
    #[must_use]
    pub fn with_asynchronous(mut self, is_asynchronous: bool) -> Self {
        self.is_asynchronous = is_asynchronous;
        self
    }

    /// Selects the fork-join executor.
    #[must_use]
    pub fn with_fork_join(mut self, use_fork_join: bool) -> Self {
        self.use_fork_join = use_fork_join;
        self
    }

    /// Selects the partitioning strategy.
    #[must_use]
    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }

    /// Checks the engine settings.
    ///
    /// # Errors
    /// Returns [`PregelError::InvalidConcurrency`] if `concurrency` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PregelError::InvalidConcurrency(self.concurrency));
        }
        Ok(())
    }
}

impl<P: DeserializeOwned> PregelConfig<P> {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`PregelError::Config`] for malformed documents and the errors of
    /// [`PregelConfig::validate`] for invalid settings.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RankParams {
        damping_factor: f64,
    }

    #[test]
    fn json_defaults_and_flattened_params() {
        let config: PregelConfig<RankParams> =
            PregelConfig::from_json(r#"{ "concurrency": 2, "dampingFactor": 0.85 }"#).unwrap();
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.concurrency, 2);
        assert!(!config.is_asynchronous);
        assert_eq!(config.partitioning, Partitioning::Range);
        assert_eq!(config.params.damping_factor, 0.85);
    }

    #[test]
    fn json_partitioning_is_camel_case() {
        let config: PregelConfig =
            PregelConfig::from_json(r#"{ "partitioning": "degree", "useForkJoin": true }"#).unwrap();
        assert_eq!(config.partitioning, Partitioning::Degree);
        assert!(config.use_fork_join);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = PregelConfig::<NoParams>::from_json(r#"{ "concurrency": 0 }"#).unwrap_err();
        assert!(matches!(err, PregelError::InvalidConcurrency(0)));

        let built = PregelConfig::new(NoParams {}).with_concurrency(0);
        assert!(built.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PregelConfig::<NoParams>::from_json("{ maxIterations: }").unwrap_err();
        assert!(matches!(err, PregelError::Config(_)));
    }
}
