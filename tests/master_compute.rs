use pregel::{
    ComputeContext, CsrGraph, Graph, MasterComputeContext, Messages, Pregel, PregelComputation, PregelConfig,
    PregelSchema, ValueType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalizeParams {
    stop_after: Option<usize>,
}

/// Grows values locally and rescales them globally so they always sum to one.
struct Normalize;

impl PregelComputation for Normalize {
    type Params = NormalizeParams;

    fn schema(&self, _config: &PregelConfig<NormalizeParams>) -> PregelSchema {
        PregelSchema::builder()
            .add("share", ValueType::Double)
            .add("supersteps", ValueType::LongArray)
            .build()
    }

    fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, _messages: Messages<'_>) -> anyhow::Result<()> {
        let share = if ctx.is_initial_superstep() {
            1.0
        } else {
            ctx.double_value("share") * (ctx.degree() + 1) as f64
        };
        ctx.set_double("share", share);
        Ok(())
    }

    fn master_compute<G: Graph>(&self, ctx: &mut MasterComputeContext<'_, G, Self>) -> anyhow::Result<bool> {
        let total: f64 = ctx.node_values().doubles("share").sum();
        let key = ctx.node_values().schema().key::<f64>("share")?;
        let log = ctx.node_values().schema().key::<Vec<i64>>("supersteps")?;
        let superstep = ctx.superstep() as i64;
        let mut visited = 0;
        ctx.for_each_node(|_| {
            visited += 1;
            true
        });
        anyhow::ensure!(visited == ctx.node_count(), "visited {visited} nodes");
        for node in 0..ctx.node_count() {
            let normalized = ctx.double_value(&key, node) / total;
            ctx.set_double(&key, node, normalized);
            let mut seen = ctx.long_array_value(&log, node).to_vec();
            seen.push(superstep);
            ctx.set_long_array(&log, node, seen);
        }
        Ok(ctx.config().params.stop_after == Some(ctx.superstep()))
    }
}

fn path() -> CsrGraph {
    CsrGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2)])
}

#[test]
fn master_compute_normalizes_after_every_superstep() {
    let graph = path();
    let config = PregelConfig::new(NormalizeParams::default()).with_max_iterations(6);
    let result = Pregel::create(&graph, config, Normalize).unwrap().run().unwrap();
    assert_eq!(result.ran_iterations(), 6);
    assert!(!result.did_converge());

    let values = result.node_values();
    let total: f64 = values.doubles("share").sum();
    assert!((total - 1.0).abs() < 1e-12);
    // Node 0 has degree 3, the sinks degree 0.
    assert!(values.double_value("share", 0) > values.double_value("share", 1));
    assert!(values.double_value("share", 1) > values.double_value("share", 2));
    assert_eq!(values.double_value("share", 2), values.double_value("share", 3));
    assert_eq!(values.long_array_value("supersteps", 3), &[0, 1, 2, 3, 4, 5]);
}

#[test]
fn master_compute_can_stop_the_run() {
    let graph = path();
    let config = PregelConfig::<NormalizeParams>::from_json(r#"{"maxIterations": 10, "stopAfter": 2}"#).unwrap();
    let result = Pregel::create(&graph, config, Normalize).unwrap().run().unwrap();
    assert_eq!(result.ran_iterations(), 3);
    assert!(result.did_converge());
    assert_eq!(result.node_values().long_array_value("supersteps", 0), &[0, 1, 2]);
}

#[test]
fn stop_on_the_last_superstep_is_not_convergence() {
    let graph = path();
    let config = PregelConfig::<NormalizeParams>::from_json(r#"{"maxIterations": 3, "stopAfter": 2}"#).unwrap();
    let result = Pregel::create(&graph, config, Normalize).unwrap().run().unwrap();
    assert_eq!(result.ran_iterations(), 3);
    assert!(!result.did_converge());
    assert!(!result.did_converge() || result.ran_iterations() < 3);
}

#[test]
fn first_superstep_is_visible_to_master() {
    let graph = path();
    let config = PregelConfig::new(NormalizeParams::default()).with_max_iterations(1);
    let result = Pregel::create(&graph, config, Normalize).unwrap().run().unwrap();
    assert!(result.node_values().doubles("share").all(|s| s == 0.25));
}
