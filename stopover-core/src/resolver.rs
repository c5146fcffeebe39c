//! Snap destination coordinates onto graph nodes.
//!
//! [`NearestNodeResolver`] indexes node positions in an R\*-tree once per
//! graph and answers nearest-node queries for each destination. Positions are
//! indexed as points on the unit sphere, so the tree's straight-line distance
//! orders nodes exactly as great-circle distance does, at any latitude and
//! across the antimeridian. Destinations
//! that cannot be snapped are reported alongside the resolved ones instead of
//! failing the whole request.

use std::cmp::Ordering;
use std::fmt;

use log::warn;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{GeoPoint, NetworkGraph, NodeId};

/// Default limit for snapping a destination onto the graph, in metres.
pub const DEFAULT_MAX_SNAP_DISTANCE_M: f64 = 1_000.0;

/// Tuning for [`NearestNodeResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Destinations farther than this from every node are skipped.
    pub max_snap_distance_m: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_snap_distance_m: DEFAULT_MAX_SNAP_DISTANCE_M,
        }
    }
}

/// Why a destination could not be snapped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// The coordinate is non-finite or outside the WGS84 range.
    #[error("coordinate {point} is not a valid latitude/longitude")]
    MalformedCoordinate {
        /// Offending coordinate.
        point: GeoPoint,
    },
    /// The nearest node lies beyond the snapping limit.
    #[error("nearest node is {distance_m:.1} m away, beyond the {limit_m} m limit")]
    OutOfRange {
        /// Distance to the nearest node in metres.
        distance_m: f64,
        /// Configured limit in metres.
        limit_m: f64,
    },
    /// The graph has no nodes to snap to.
    #[error("graph has no nodes")]
    EmptyGraph,
}

/// A destination snapped onto a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedDestination {
    /// Position in the caller's destination list.
    pub index: usize,
    /// Coordinate supplied by the caller.
    pub point: GeoPoint,
    /// Selected graph node.
    pub node: NodeId,
    /// Great-circle distance from `point` to `node` in metres.
    pub distance_m: f64,
}

/// A destination dropped during resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDestination {
    /// Position in the caller's destination list.
    pub index: usize,
    /// Coordinate supplied by the caller.
    pub point: GeoPoint,
    /// Failure that caused the skip.
    #[serde(serialize_with = "serialize_display")]
    pub reason: ResolutionError,
}

/// Outcome of resolving a destination list.
///
/// Both lists preserve the caller's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Destinations that snapped onto a node.
    pub resolved: Vec<ResolvedDestination>,
    /// Destinations that were dropped.
    pub skipped: Vec<SkippedDestination>,
}

impl Resolution {
    /// Node identifiers of the resolved destinations, in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.resolved.iter().map(|dest| dest.node).collect()
    }
}

type IndexedNode = GeomWithData<[f64; 3], (NodeId, GeoPoint)>;

/// Unit vector for `point` in Earth-centred coordinates.
fn unit_vector(point: GeoPoint) -> [f64; 3] {
    let (lat, lon) = (point.lat.to_radians(), point.lon.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Nearest-node lookup over a graph's node positions.
///
/// # Examples
/// ```
/// use stopover_core::{GeoPoint, NearestNodeResolver, NetworkGraph, NodeId, ResolverConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = NetworkGraph::builder();
/// builder
///     .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?
///     .add_node(NodeId(2), GeoPoint::new(0.0, 0.001))?;
/// let graph = builder.build();
///
/// let resolver = NearestNodeResolver::new(&graph, ResolverConfig::default());
/// let resolved = resolver.resolve_point(GeoPoint::new(0.0, 0.0009))?;
/// assert_eq!(resolved.0, NodeId(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NearestNodeResolver {
    tree: RTree<IndexedNode>,
    config: ResolverConfig,
}

impl NearestNodeResolver {
    /// Index the nodes of `graph`.
    pub fn new(graph: &NetworkGraph, config: ResolverConfig) -> Self {
        let entries = graph
            .nodes()
            .map(|(id, pos)| GeomWithData::new(unit_vector(pos), (id, pos)))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            config,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Snap a single point, returning the node and its distance in metres.
    pub fn resolve_point(&self, point: GeoPoint) -> Result<(NodeId, f64), ResolutionError> {
        if !point.is_valid() {
            return Err(ResolutionError::MalformedCoordinate { point });
        }
        let (node, distance_m) = self.nearest(point).ok_or(ResolutionError::EmptyGraph)?;
        if distance_m > self.config.max_snap_distance_m {
            return Err(ResolutionError::OutOfRange {
                distance_m,
                limit_m: self.config.max_snap_distance_m,
            });
        }
        Ok((node, distance_m))
    }

    /// Snap every point, skipping those that cannot be resolved.
    ///
    /// Each skipped destination is logged as a warning. Duplicate points are
    /// kept as separate stops.
    pub fn resolve(&self, points: &[GeoPoint]) -> Resolution {
        let mut resolution = Resolution::default();
        for (index, &point) in points.iter().enumerate() {
            match self.resolve_point(point) {
                Ok((node, distance_m)) => resolution.resolved.push(ResolvedDestination {
                    index,
                    point,
                    node,
                    distance_m,
                }),
                Err(reason) => {
                    warn!("skipping destination {index} at {point}: {reason}");
                    resolution.skipped.push(SkippedDestination {
                        index,
                        point,
                        reason,
                    });
                }
            }
        }
        resolution
    }

    // The tree orders candidates by planar distance in degrees, which shrinks
    // east-west separations away from the equator. Candidates up to twice the
    // planar nearest distance are re-ranked by great-circle distance, which is
    // exact for latitudes within 60 degrees.
    fn nearest(&self, point: GeoPoint) -> Option<(NodeId, f64)> {
        let query = unit_vector(point);
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, first_d2) = candidates.next()?;
        // Chord length grows with arc length; only rounding-level ties remain.
        let horizon = first_d2 + f64::EPSILON;

        std::iter::once(first)
            .chain(
                candidates
                    .take_while(|(_, d2)| *d2 <= horizon)
                    .map(|(entry, _)| entry),
            )
            .map(|entry| {
                let (id, position) = entry.data;
                (id, point.haversine_m(&position))
            })
            .min_by(|a, b| match a.1.total_cmp(&b.1) {
                Ordering::Equal => a.0.cmp(&b.0),
                other => other,
            })
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
