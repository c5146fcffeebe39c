//! Behavioural tests for traffic snapshots and the overlay.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use stopover_core::{
    CacheLoadError, EdgeAttributes, GeoPoint, NetworkGraph, NodeId, TrafficOverlay,
    TrafficSnapshot, WeightedGraph,
};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct TrafficWorld {
    graph: RefCell<Option<NetworkGraph>>,
    overlay: RefCell<TrafficOverlay>,
    dir: RefCell<Option<TempDir>>,
    snapshot_path: RefCell<Option<Utf8PathBuf>>,
    loaded: RefCell<Option<Result<Option<TrafficSnapshot>, CacheLoadError>>>,
}

impl TrafficWorld {
    fn workspace_file(&self, name: &str) -> Utf8PathBuf {
        let mut dir = self.dir.borrow_mut();
        let tmp = dir.get_or_insert_with(|| TempDir::new().expect("tempdir"));
        Utf8PathBuf::from_path_buf(tmp.path().join(name)).expect("utf-8 temp path")
    }

    fn times_from_1_to_2(&self) -> Vec<f64> {
        let graph = self.graph.borrow();
        let graph = graph.as_ref().expect("graph should be built");
        let overlay = self.overlay.borrow();
        let view = WeightedGraph::new(graph, &overlay);
        graph
            .edges_between(NodeId(1), NodeId(2))
            .map(|edge| view.edge_time(edge.key).expect("edge exists"))
            .collect()
    }
}

#[fixture]
fn world() -> TrafficWorld {
    TrafficWorld::default()
}

#[given("a graph with two parallel edges from node 1 to node 2")]
fn given_parallel_graph(world: &TrafficWorld) {
    let mut builder = NetworkGraph::builder();
    builder
        .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))
        .and_then(|b| b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001)))
        .expect("nodes");
    builder
        .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(150.0, 20.0))
        .expect("edge");
    builder
        .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(180.0, 15.0))
        .expect("parallel edge");
    world.graph.replace(Some(builder.build()));
}

#[given("a snapshot file with a malformed key")]
fn given_malformed_snapshot(world: &TrafficWorld) {
    let path = world.workspace_file("traffic.json");
    std::fs::write(&path, r#"{ "1;2": 10 }"#).expect("write snapshot");
    world.snapshot_path.replace(Some(path));
}

#[when("a snapshot setting 1,2 to 45 seconds is applied")]
fn when_snapshot_applied(world: &TrafficWorld) {
    let snapshot = TrafficSnapshot::from_json_str(r#"{ "1,2": 45 }"#).expect("snapshot");
    let graph = world.graph.borrow();
    let graph = graph.as_ref().expect("graph should be built");
    world.overlay.borrow_mut().apply(graph, &snapshot);
}

#[when("the snapshot file does not exist")]
fn when_snapshot_missing(world: &TrafficWorld) {
    let path = world.workspace_file("absent.json");
    world.loaded.replace(Some(TrafficSnapshot::load(&path)));
}

#[when("the snapshot file is loaded")]
fn when_snapshot_loaded(world: &TrafficWorld) {
    let path = world
        .snapshot_path
        .borrow()
        .clone()
        .expect("snapshot path should be set");
    world.loaded.replace(Some(TrafficSnapshot::load(&path)));
}

#[then("both edges from node 1 to node 2 take 45 seconds")]
fn then_edges_adjusted(world: &TrafficWorld) {
    assert_eq!(world.times_from_1_to_2(), vec![45.0, 45.0]);
}

#[then("edge lengths are unchanged")]
fn then_lengths_unchanged(world: &TrafficWorld) {
    let graph = world.graph.borrow();
    let graph = graph.as_ref().expect("graph should be built");
    let overlay = world.overlay.borrow();
    let view = WeightedGraph::new(graph, &overlay);
    for edge in graph.edges_between(NodeId(1), NodeId(2)) {
        let adjusted = view.attributes(edge.key).expect("edge exists");
        assert_eq!(adjusted.length, edge.attributes.length);
    }
}

#[then("no snapshot is loaded")]
fn then_nothing_loaded(world: &TrafficWorld) {
    let loaded = world.loaded.borrow();
    assert!(
        matches!(loaded.as_ref(), Some(Ok(None))),
        "expected Ok(None), got {loaded:?}"
    );
}

#[then("the free-flow times are kept")]
fn then_free_flow(world: &TrafficWorld) {
    let mut times = world.times_from_1_to_2();
    times.sort_by(f64::total_cmp);
    assert_eq!(times, vec![15.0, 20.0]);
}

#[then("a cache load error is returned")]
fn then_cache_error(world: &TrafficWorld) {
    let loaded = world.loaded.borrow();
    assert!(
        matches!(loaded.as_ref(), Some(Err(CacheLoadError::Malformed { .. }))),
        "expected a malformed snapshot error, got {loaded:?}"
    );
}

#[scenario(path = "tests/features/traffic_overlay.feature", index = 0)]
fn snapshot_adjusts_parallel_edges(world: TrafficWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/traffic_overlay.feature", index = 1)]
fn applying_twice_is_stable(world: TrafficWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/traffic_overlay.feature", index = 2)]
fn missing_snapshot_is_a_no_op(world: TrafficWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/traffic_overlay.feature", index = 3)]
fn malformed_snapshot_is_fatal(world: TrafficWorld) {
    let _ = world;
}
