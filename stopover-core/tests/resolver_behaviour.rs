//! Behavioural tests for `NearestNodeResolver`.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use stopover_core::test_support::{SquareGraph, square_graph};
use stopover_core::{
    GeoPoint, NearestNodeResolver, NetworkGraph, Resolution, ResolutionError, ResolverConfig,
};

#[derive(Debug, Default)]
struct ResolverWorld {
    graph: RefCell<Option<NetworkGraph>>,
    resolution: RefCell<Option<Resolution>>,
}

impl ResolverWorld {
    fn resolve(&self, points: &[GeoPoint]) {
        let graph = self.graph.borrow();
        let graph = graph.as_ref().expect("graph should be built");
        let resolver = NearestNodeResolver::new(graph, ResolverConfig::default());
        self.resolution.replace(Some(resolver.resolve(points)));
    }

    fn with_resolution<T>(&self, f: impl FnOnce(&Resolution) -> T) -> T {
        let resolution = self.resolution.borrow();
        f(resolution.as_ref().expect("resolution should be recorded"))
    }
}

#[fixture]
fn world() -> ResolverWorld {
    ResolverWorld::default()
}

#[fixture]
fn square() -> SquareGraph {
    square_graph()
}

#[given("the unit square road network")]
fn given_square(world: &ResolverWorld, #[from(square)] square: &SquareGraph) {
    world.graph.replace(Some(square.graph.clone()));
}

#[given("an empty road network")]
fn given_empty(world: &ResolverWorld) {
    world.graph.replace(Some(NetworkGraph::builder().build()));
}

#[when("destinations at corners A, C and D are resolved")]
fn when_corners_resolved(world: &ResolverWorld, #[from(square)] square: &SquareGraph) {
    world.resolve(&[
        square.position('A'),
        square.position('C'),
        square.position('D'),
    ]);
}

#[when("destinations at corner A, a point 50 km away and corner C are resolved")]
fn when_far_point_resolved(world: &ResolverWorld, #[from(square)] square: &SquareGraph) {
    world.resolve(&[
        square.position('A'),
        GeoPoint::new(0.45, 0.0),
        square.position('C'),
    ]);
}

#[then("{count} destinations are resolved")]
fn then_resolved_count(world: &ResolverWorld, count: usize) {
    world.with_resolution(|resolution| assert_eq!(resolution.resolved.len(), count));
}

#[then("no destinations are skipped")]
fn then_none_skipped(world: &ResolverWorld) {
    world.with_resolution(|resolution| assert!(resolution.skipped.is_empty()));
}

#[then("destination 1 is skipped as out of range")]
fn then_far_point_skipped(world: &ResolverWorld) {
    world.with_resolution(|resolution| {
        let skipped: Vec<_> = resolution.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1]);
        assert!(matches!(
            resolution.skipped.first().map(|s| &s.reason),
            Some(ResolutionError::OutOfRange { .. })
        ));
    });
}

#[then("every destination is skipped because the graph is empty")]
fn then_all_skipped(world: &ResolverWorld) {
    world.with_resolution(|resolution| {
        assert_eq!(resolution.skipped.len(), 3);
        assert!(
            resolution
                .skipped
                .iter()
                .all(|s| s.reason == ResolutionError::EmptyGraph)
        );
    });
}

#[scenario(path = "tests/features/nearest_node_resolver.feature", index = 0)]
fn every_destination_resolves(world: ResolverWorld, square: SquareGraph) {
    let _ = (world, square);
}

#[scenario(path = "tests/features/nearest_node_resolver.feature", index = 1)]
fn distant_destination_is_skipped(world: ResolverWorld, square: SquareGraph) {
    let _ = (world, square);
}

#[scenario(path = "tests/features/nearest_node_resolver.feature", index = 2)]
fn empty_network_resolves_nothing(world: ResolverWorld, square: SquareGraph) {
    let _ = (world, square);
}
