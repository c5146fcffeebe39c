//! Test-only utilities for `stopover-solver-exhaustive`.
//!
//! The helpers in this module are available to unit tests, behavioural tests
//! and benchmarks. They are gated behind the `test-support` feature (and
//! `cfg(test)`).

use stopover_core::{EdgeAttributes, GeoPoint, NetworkGraph, NodeId};

/// Degrees between neighbouring grid nodes, about 111 m at the equator.
pub const GRID_SPACING_DEG: f64 = 0.001;

/// Ratio of edge length to great-circle distance between its endpoints.
pub const GRID_DETOUR_FACTOR: f64 = 1.25;

/// Walking speed used to derive edge times, in metres per second.
pub const GRID_WALKING_SPEED_MPS: f64 = 1.4;

/// Identifier of the grid node at `row`, `col` in a grid `cols` wide.
///
/// # Examples
/// ```rust
/// use stopover_core::NodeId;
/// use stopover_solver_exhaustive::test_support::grid_node;
///
/// assert_eq!(grid_node(0, 0, 3), NodeId(1));
/// assert_eq!(grid_node(1, 2, 3), NodeId(6));
/// ```
#[must_use]
pub fn grid_node(row: u32, col: u32, cols: u32) -> NodeId {
    NodeId(u64::from(row) * u64::from(cols) + u64::from(col) + 1)
}

/// Position of the grid node at `row`, `col`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "grid positions scale the spacing")]
pub fn grid_position(row: u32, col: u32) -> GeoPoint {
    GeoPoint::new(
        f64::from(row) * GRID_SPACING_DEG,
        f64::from(col) * GRID_SPACING_DEG,
    )
}

/// Build a `rows` by `cols` street grid joined by two-way edges.
///
/// Each node connects to its right and lower neighbours. Edge lengths are
/// [`GRID_DETOUR_FACTOR`] times the great-circle distance, so heuristic
/// searches stay optimal.
///
/// # Panics
/// Panics if the generated grid violates graph invariants, which would be a
/// bug in this helper.
///
/// # Examples
/// ```rust
/// use stopover_solver_exhaustive::test_support::grid_graph;
///
/// let graph = grid_graph(2, 3);
/// assert_eq!(graph.node_count(), 6);
/// assert_eq!(graph.edge_count(), 14);
/// ```
#[must_use]
#[expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "fixture construction fails loudly and derives weights from distance"
)]
pub fn grid_graph(rows: u32, cols: u32) -> NetworkGraph {
    let mut builder = NetworkGraph::builder();
    for row in 0..rows {
        for col in 0..cols {
            builder
                .add_node(grid_node(row, col, cols), grid_position(row, col))
                .expect("grid node");
        }
    }
    for row in 0..rows {
        for col in 0..cols {
            let here = grid_position(row, col);
            let neighbours = [(row, col + 1), (row + 1, col)];
            for (next_row, next_col) in neighbours {
                if next_row >= rows || next_col >= cols {
                    continue;
                }
                let length =
                    here.haversine_m(&grid_position(next_row, next_col)) * GRID_DETOUR_FACTOR;
                builder
                    .add_two_way_edge(
                        grid_node(row, col, cols),
                        grid_node(next_row, next_col, cols),
                        EdgeAttributes::new(length, length / GRID_WALKING_SPEED_MPS),
                    )
                    .expect("grid edge");
            }
        }
    }
    builder.build()
}
