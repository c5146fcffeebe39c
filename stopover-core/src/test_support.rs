//! Test-only graphs and an in-memory `GraphProvider` used by unit and
//! behaviour tests.

use std::sync::Mutex;

use crate::{
    EdgeAttributes, GeoPoint, GraphProvider, GraphProviderError, NetworkGraph, NodeId,
    validate_fetch_area,
};

/// Degrees between neighbouring corners of [`square_graph`], about 0.56 m at
/// the equator.
pub const SQUARE_SIDE_DEG: f64 = 0.000_005;

const SQUARE_CORNERS: [(char, u64, f64, f64); 4] = [
    ('A', 1, 0.0, 0.0),
    ('B', 2, 0.0, SQUARE_SIDE_DEG),
    ('C', 3, SQUARE_SIDE_DEG, SQUARE_SIDE_DEG),
    ('D', 4, SQUARE_SIDE_DEG, 0.0),
];

/// Four corners `A`, `B`, `C`, `D` joined by two-way edges.
///
/// Sides have length 1 and time 1; the diagonals `A-C` and `B-D` have length
/// 1.5 and time 1.5. Corners sit close enough that every edge is at least as
/// long as the great-circle distance between its endpoints.
#[derive(Debug, Clone)]
pub struct SquareGraph {
    /// The graph itself.
    pub graph: NetworkGraph,
}

impl SquareGraph {
    /// Node identifier of the corner labelled `label`.
    ///
    /// # Panics
    /// Panics when `label` is not one of `A`, `B`, `C` or `D`.
    pub fn id(&self, label: char) -> NodeId {
        corner(label).0
    }

    /// Position of the corner labelled `label`.
    ///
    /// # Panics
    /// Panics when `label` is not one of `A`, `B`, `C` or `D`.
    pub fn position(&self, label: char) -> GeoPoint {
        corner(label).1
    }
}

fn corner(label: char) -> (NodeId, GeoPoint) {
    SQUARE_CORNERS
        .iter()
        .find(|(l, ..)| *l == label)
        .map(|&(_, id, lat, lon)| (NodeId(id), GeoPoint::new(lat, lon)))
        .unwrap_or_else(|| panic!("square graph has no corner {label}"))
}

/// Build the unit square with 1.5 diagonals.
///
/// # Panics
/// Panics if the fixture violates graph invariants, which would be a bug in
/// the fixture itself.
pub fn square_graph() -> SquareGraph {
    let mut builder = NetworkGraph::builder();
    for (_, id, lat, lon) in SQUARE_CORNERS {
        builder
            .add_node(NodeId(id), GeoPoint::new(lat, lon))
            .expect("square corner");
    }
    let side = EdgeAttributes::new(1.0, 1.0);
    let diagonal = EdgeAttributes::new(1.5, 1.5);
    for (a, b, attributes) in [
        (1, 2, side),
        (2, 3, side),
        (3, 4, side),
        (4, 1, side),
        (1, 3, diagonal),
        (2, 4, diagonal),
    ] {
        builder
            .add_two_way_edge(NodeId(a), NodeId(b), attributes)
            .expect("square edge");
    }
    SquareGraph {
        graph: builder.build(),
    }
}

/// `GraphProvider` returning a copy of a fixed graph.
///
/// The area requested by the last call is recorded for assertions.
#[derive(Debug)]
pub struct MemoryGraphProvider {
    graph: NetworkGraph,
    last_request: Mutex<Option<(GeoPoint, f64)>>,
}

impl MemoryGraphProvider {
    /// Serve `graph` for every request.
    pub fn new(graph: NetworkGraph) -> Self {
        Self {
            graph,
            last_request: Mutex::new(None),
        }
    }

    /// Centre and radius of the most recent fetch.
    pub fn last_request(&self) -> Option<(GeoPoint, f64)> {
        self.last_request.lock().ok().and_then(|guard| *guard)
    }
}

impl GraphProvider for MemoryGraphProvider {
    fn fetch(&self, center: GeoPoint, radius_m: f64) -> Result<NetworkGraph, GraphProviderError> {
        validate_fetch_area(center, radius_m)?;
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some((center, radius_m));
        }
        Ok(self.graph.clone())
    }
}
