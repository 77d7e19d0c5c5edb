use pregel::config::NoParams;
use pregel::{
    ComputeContext, CsrGraph, Graph, Messages, Pregel, PregelComputation, PregelConfig, PregelSchema, Reducer,
    ValueType,
};

/// Single-source shortest paths with relationship weights as distances.
struct ShortestPaths;

impl PregelComputation for ShortestPaths {
    type Params = NoParams;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().add("distance", ValueType::Double).build()
    }

    fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, messages: Messages<'_>) -> anyhow::Result<()> {
        if ctx.is_initial_superstep() {
            if ctx.node_id() == 0 {
                ctx.set_double("distance", 0.0);
                ctx.send_to_neighbors(0.0);
            } else {
                ctx.set_double("distance", f64::INFINITY);
            }
        } else {
            let best = messages.fold(f64::INFINITY, f64::min);
            if best < ctx.double_value("distance") {
                ctx.set_double("distance", best);
                ctx.send_to_neighbors(best);
            }
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }

    fn apply_relationship_weight(&self, message: f64, weight: f64) -> f64 {
        message + weight
    }
}

fn distances(graph: &CsrGraph) -> Vec<f64> {
    let result = Pregel::create(graph, PregelConfig::default(), ShortestPaths)
        .unwrap()
        .run()
        .unwrap();
    assert!(result.did_converge());
    result.node_values().doubles("distance").collect()
}

#[test]
fn weights_are_applied_to_neighbor_messages() {
    let graph = CsrGraph::from_weighted_edges(
        5,
        &[(0, 1, 4.0), (0, 2, 1.0), (2, 1, 2.0), (1, 3, 1.0), (2, 3, 5.0)],
    );
    assert_eq!(distances(&graph), vec![0.0, 3.0, 1.0, 4.0, f64::INFINITY]);
}

#[test]
fn unweighted_graphs_send_messages_unchanged() {
    let graph = CsrGraph::from_edges(3, &[(0, 1), (1, 2)]);
    assert_eq!(distances(&graph), vec![0.0, 0.0, 0.0]);
}
