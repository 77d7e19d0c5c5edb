use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use pregel::concurrency::AtomicBitSet;
use pregel::config::NoParams;
use pregel::pregel::messenger::ReducingMessenger;
use pregel::{
    ComputeContext, CsrGraph, DefaultValue, Graph, Messages, Partitioning, Pregel, PregelComputation,
    PregelConfig, PregelSchema, Reducer, Visibility,
};
use proptest::prelude::*;

/// Breadth-first levels from node 0; unreachable nodes keep `-1`.
struct Bfs;

impl PregelComputation for Bfs {
    type Params = NoParams;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder()
            .add_with_default("level", DefaultValue::Long(-1), Visibility::Public)
            .build()
    }

    fn compute<G: Graph>(&self, ctx: &mut ComputeContext<'_, G, Self>, messages: Messages<'_>) -> anyhow::Result<()> {
        if ctx.is_initial_superstep() {
            if ctx.node_id() == 0 {
                ctx.set_long("level", 0);
                ctx.send_to_neighbors(1.0);
            }
        } else if ctx.long_value("level") < 0 {
            let level = messages.fold(f64::INFINITY, f64::min);
            ctx.set_long("level", level as i64);
            ctx.send_to_neighbors(level + 1.0);
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }
}

fn edges_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..60).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..200)))
}

fn reduce_all(reducer: Reducer, messages: &[f64]) -> Option<f64> {
    let mut messenger = ReducingMessenger::new(1, reducer);
    messenger.init_iteration(0);
    for &m in messages {
        messenger.send_to(0, m);
    }
    messenger.init_iteration(1);
    messenger.message_iterator(0).next()
}

proptest! {
    #[test]
    fn bfs_levels_match_petgraph(
        (n, edges) in edges_strategy(),
        concurrency in 1usize..6,
        partitioning in prop_oneof![
            Just(Partitioning::Range),
            Just(Partitioning::Degree),
            Just(Partitioning::Interleaved),
        ],
    ) {
        let graph = CsrGraph::from_edges(n, &edges);
        let config = PregelConfig::default()
            .with_concurrency(concurrency)
            .with_partitioning(partitioning)
            .with_max_iterations(n + 2);
        let result = Pregel::create(&graph, config, Bfs).unwrap().run().unwrap();
        prop_assert!(result.did_converge());

        let mut oracle = DiGraph::<(), ()>::new();
        let nodes: Vec<NodeIndex> = (0..n).map(|_| oracle.add_node(())).collect();
        for &(u, v) in &edges {
            oracle.add_edge(nodes[u], nodes[v], ());
        }
        let distances = dijkstra(&oracle, nodes[0], None, |_| 1i64);
        for (node, &index) in nodes.iter().enumerate() {
            let expected = distances.get(&index).copied().unwrap_or(-1);
            prop_assert_eq!(result.node_values().long_value("level", node), expected);
        }
    }

    #[test]
    fn reducers_ignore_message_order(
        messages in prop::collection::vec(-1_000i32..1_000, 1..64),
        seed in any::<u64>(),
    ) {
        let messages: Vec<f64> = messages.into_iter().map(f64::from).collect();
        let mut shuffled = messages.clone();
        // Deterministic shuffle, small-integer floats keep sums exact.
        let len = shuffled.len();
        let mut state = seed | 1;
        for i in (1..len).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }
        for reducer in [Reducer::Sum, Reducer::Min, Reducer::Max] {
            prop_assert_eq!(reduce_all(reducer, &messages), reduce_all(reducer, &shuffled));
        }
        prop_assert_eq!(reduce_all(Reducer::Sum, &messages), Some(messages.iter().sum::<f64>()));
    }

    #[test]
    fn bitset_matches_a_bool_vector(
        len in 1usize..300,
        ops in prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 0..200),
    ) {
        let bits = AtomicBitSet::new(len);
        let mut model = vec![false; len];
        for (set, index) in ops {
            let i = index.index(len);
            if set {
                prop_assert_eq!(bits.test_and_set(i), !model[i]);
                model[i] = true;
            } else {
                bits.clear(i);
                model[i] = false;
            }
        }
        for (i, &expected) in model.iter().enumerate() {
            prop_assert_eq!(bits.get(i), expected);
        }
        prop_assert_eq!(bits.cardinality(), model.iter().filter(|&&b| b).count());
        prop_assert_eq!(bits.all_set(), model.iter().all(|&b| b));
    }

    #[test]
    fn partitions_cover_every_node_once(
        (n, edges) in edges_strategy(),
        concurrency in 1usize..12,
    ) {
        let graph = CsrGraph::from_edges(n, &edges);
        for partitioning in [Partitioning::Range, Partitioning::Degree, Partitioning::Interleaved] {
            let partitions = partitioning.split(&graph, concurrency);
            prop_assert!(partitions.len() <= concurrency.min(n));
            let mut owners = vec![0usize; n];
            for partition in &partitions {
                prop_assert!(partition.node_count() > 0);
                for node in partition.nodes() {
                    prop_assert!(partition.contains(node));
                    owners[node] += 1;
                }
            }
            prop_assert!(owners.iter().all(|&c| c == 1), "{:?} {:?}", partitioning, owners);
        }
    }
}
