use std::error::Error as _;

use pregel::config::NoParams;
use pregel::{
    ComputeContext, CsrGraph, Graph, MasterComputeContext, Messages, Pregel, PregelComputation, PregelConfig,
    PregelError, PregelSchema, Reducer, ValueType,
};

/// Fails on one node in one superstep.
struct FailAt {
    superstep: usize,
    node: usize,
}

impl PregelComputation for FailAt {
    type Params = NoParams;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().add("x", ValueType::Long).build()
    }

    fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
        if ctx.superstep() == self.superstep && ctx.node_id() == self.node {
            anyhow::bail!("node {} gave up", ctx.node_id());
        }
        Ok(())
    }
}

fn ring(n: usize) -> CsrGraph {
    let edges: Vec<_> = (0..n).map(|u| (u, (u + 1) % n)).collect();
    CsrGraph::from_edges(n, &edges)
}

#[test]
fn compute_error_aborts_the_run() {
    let graph = ring(8);
    let err = Pregel::create(&graph, PregelConfig::default(), FailAt { superstep: 1, node: 5 })
        .unwrap()
        .run()
        .unwrap_err();
    match &err {
        PregelError::Computation { superstep, node_id, .. } => {
            assert_eq!(*superstep, 1);
            assert_eq!(*node_id, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.source().unwrap().to_string(), "node 5 gave up");
}

#[test]
fn compute_error_surfaces_from_every_executor() {
    let graph = ring(3_000);
    let configs = [
        PregelConfig::default().with_concurrency(1),
        PregelConfig::default().with_concurrency(4),
        PregelConfig::default().with_concurrency(4).with_fork_join(true),
    ];
    for config in configs {
        let err = Pregel::create(&graph, config, FailAt { superstep: 0, node: 2_500 })
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, PregelError::Computation { superstep: 0, node_id: 2_500, .. }));
    }
}

/// Master compute that rejects the first superstep.
struct BadMaster;

impl PregelComputation for BadMaster {
    type Params = NoParams;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().build()
    }

    fn compute<G: Graph>(&self, _ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn master_compute<G: Graph>(&self, ctx: &mut MasterComputeContext<'_, G, Self>) -> anyhow::Result<bool> {
        anyhow::ensure!(!ctx.is_initial_superstep(), "aggregate overflow");
        Ok(false)
    }
}

#[test]
fn master_compute_error_aborts_the_run() {
    let graph = ring(4);
    let err = Pregel::create(&graph, PregelConfig::default(), BadMaster)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, PregelError::MasterCompute { superstep: 0, .. }));
    assert_eq!(err.source().unwrap().to_string(), "aggregate overflow");
}

#[test]
fn zero_concurrency_is_rejected_at_creation() {
    let graph = ring(4);
    let config = PregelConfig::default().with_concurrency(0);
    let err = Pregel::create(&graph, config, BadMaster).err().unwrap();
    assert!(matches!(err, PregelError::InvalidConcurrency(0)));
}

/// Declares a reducer.
struct Summing;

impl PregelComputation for Summing {
    type Params = NoParams;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().build()
    }

    fn compute<G: Graph>(&self, _ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Sum)
    }
}

#[test]
fn reducer_with_async_messaging_is_rejected() {
    let graph = ring(4);
    let config = PregelConfig::default().with_asynchronous(true);
    let err = Pregel::create(&graph, config, Summing).err().unwrap();
    assert!(matches!(err, PregelError::AsyncReducerConflict));
}

#[test]
fn json_config_is_validated() {
    let err = PregelConfig::<NoParams>::from_json(r#"{"concurrency": 0}"#).unwrap_err();
    assert!(matches!(err, PregelError::InvalidConcurrency(0)));

    let err = PregelConfig::<NoParams>::from_json(r#"{"maxIterations": "many"}"#).unwrap_err();
    assert!(matches!(err, PregelError::Config(_)));
}

#[test]
#[should_panic(expected = "out of range")]
fn sending_outside_the_graph_panics() {
    struct Stray;

    impl PregelComputation for Stray {
        type Params = NoParams;

        fn schema(&self, _config: &PregelConfig) -> PregelSchema {
            PregelSchema::builder().build()
        }

        fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
            let target = ctx.node_count();
            ctx.send_to(target, 1.0);
            Ok(())
        }
    }

    let graph = ring(2);
    let config = PregelConfig::default().with_concurrency(1);
    let _ = Pregel::create(&graph, config, Stray).unwrap().run();
}

#[test]
#[should_panic(expected = "worker exploded")]
fn panics_propagate_out_of_the_pool() {
    struct Explode;

    impl PregelComputation for Explode {
        type Params = NoParams;

        fn schema(&self, _config: &PregelConfig) -> PregelSchema {
            PregelSchema::builder().build()
        }

        fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
            assert!(ctx.node_id() != 7, "worker exploded");
            Ok(())
        }
    }

    let graph = ring(16);
    let config = PregelConfig::default().with_concurrency(4);
    let _ = Pregel::create(&graph, config, Explode).unwrap().run();
}

#[test]
#[should_panic(expected = "not declared")]
fn undeclared_property_panics() {
    struct Typo;

    impl PregelComputation for Typo {
        type Params = NoParams;

        fn schema(&self, _config: &PregelConfig) -> PregelSchema {
            PregelSchema::builder().add("rank", ValueType::Double).build()
        }

        fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
            ctx.set_double("rnak", 1.0);
            Ok(())
        }
    }

    let graph = ring(2);
    let config = PregelConfig::default().with_concurrency(1);
    let _ = Pregel::create(&graph, config, Typo).unwrap().run();
}
