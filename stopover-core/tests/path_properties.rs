//! Property-based tests for path search and the traffic overlay.
//!
//! # Invariants tested
//!
//! - **Optimality:** both strategies return the minimum total length, checked
//!   against an all-pairs relaxation.
//! - **Strategy agreement:** `HeuristicGuided` and `UniformCost` agree on length.
//! - **Overlay idempotence:** applying a snapshot twice changes nothing.
//! - **Length preservation:** overlays only ever change travel times.

use proptest::prelude::*;
use stopover_core::{
    EdgeAttributes, GeoPoint, NetworkGraph, NodeId, PathError, PathFinder,
    Strategy as SearchStrategy, TrafficOverlay, TrafficSnapshot, WeightedGraph,
};

const TOLERANCE: f64 = 1e-6;

/// Random connected-or-not graph description: node offsets and edge list.
#[derive(Debug, Clone)]
struct GraphShape {
    positions: Vec<GeoPoint>,
    edges: Vec<(usize, usize, f64, f64)>,
}

fn graph_shape() -> impl Strategy<Value = GraphShape> {
    (2_usize..8).prop_flat_map(|n| {
        let positions = prop::collection::vec((0.0_f64..0.01, 0.0_f64..0.01), n);
        let edges = prop::collection::vec((0..n, 0..n, 0.1_f64..2.0, 0.0_f64..100.0), 0..(n * 3));
        (positions, edges).prop_map(|(positions, edges)| GraphShape {
            positions: positions
                .into_iter()
                .map(|(lat, lon)| GeoPoint::new(lat, lon))
                .collect(),
            edges,
        })
    })
}

/// Build the graph with edge lengths between a tenth and twice their great-circle span.
fn build(shape: &GraphShape) -> NetworkGraph {
    let mut builder = NetworkGraph::builder();
    for (i, pos) in shape.positions.iter().enumerate() {
        builder.add_node(node(i), *pos).expect("node");
    }
    for &(a, b, stretch, time) in &shape.edges {
        let (Some(pa), Some(pb)) = (shape.positions.get(a), shape.positions.get(b)) else {
            continue;
        };
        let length = pa.haversine_m(pb) * stretch;
        builder
            .add_edge(node(a), node(b), EdgeAttributes::new(length, time))
            .expect("edge");
    }
    builder.build()
}

fn node(i: usize) -> NodeId {
    NodeId(u64::try_from(i).expect("small index"))
}

/// All-pairs shortest lengths by repeated relaxation.
fn all_pairs(graph: &NetworkGraph, n: usize) -> Vec<Vec<f64>> {
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    for edge in graph.edges() {
        let a = usize::try_from(edge.key.source.0).expect("index");
        let b = usize::try_from(edge.key.target.0).expect("index");
        dist[a][b] = dist[a][b].min(edge.attributes.length);
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: both strategies find the minimum-length path or agree that
    /// none exists.
    #[test]
    fn strategies_find_minimum_length(shape in graph_shape()) {
        let graph = build(&shape);
        let n = shape.positions.len();
        let expected = all_pairs(&graph, n);
        let finder = PathFinder::new(WeightedGraph::unadjusted(&graph));

        for origin in 0..n {
            for destination in 0..n {
                let best = expected[origin][destination];
                for strategy in SearchStrategy::ALL {
                    let result = finder.shortest_path(node(origin), node(destination), strategy);
                    if best.is_finite() {
                        let route = result.expect("reachable");
                        prop_assert!(
                            (route.length() - best).abs() <= TOLERANCE * best.max(1.0),
                            "{strategy}: {} vs {best}", route.length()
                        );
                        prop_assert_eq!(route.origin(), node(origin));
                        prop_assert_eq!(route.destination(), node(destination));
                    } else {
                        prop_assert_eq!(
                            result.expect_err("unreachable"),
                            PathError::PathNotFound {
                                origin: node(origin),
                                destination: node(destination),
                            }
                        );
                    }
                }
            }
        }
    }

    /// Property: an overlay applied twice equals one applied once, and no
    /// edge length moves.
    #[test]
    fn overlay_is_idempotent_and_keeps_lengths(
        shape in graph_shape(),
        entries in prop::collection::vec((0_u64..8, 0_u64..8, 0.0_f64..500.0), 0..12),
    ) {
        let graph = build(&shape);
        let snapshot = TrafficSnapshot::from_entries(
            entries.into_iter().map(|(a, b, t)| (NodeId(a), NodeId(b), t)),
        )
        .expect("valid entries");

        let mut once = TrafficOverlay::new();
        let first = once.apply(&graph, &snapshot);
        let mut twice = once.clone();
        let second = twice.apply(&graph, &snapshot);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(first, second);

        let view = WeightedGraph::new(&graph, &once);
        for edge in graph.edges() {
            let adjusted = view.attributes(edge.key).expect("edge exists");
            prop_assert_eq!(adjusted.length, edge.attributes.length);
            let expected_time = snapshot
                .get(edge.key.source, edge.key.target)
                .unwrap_or(edge.attributes.time);
            prop_assert_eq!(adjusted.time, expected_time);
        }
    }
}
