//! Shortest paths between graph nodes.
//!
//! [`PathFinder`] minimises total edge `length` over a [`WeightedGraph`].
//! Travel time is reported alongside but never drives the search.

use std::fmt;
use std::str::FromStr;

use log::debug;
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::EdgeData;
use crate::{NodeId, Route, RouteError, WeightedGraph};

/// Search strategy used for every leg.
///
/// Both strategies return paths of equal length; `HeuristicGuided` usually
/// expands fewer nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Expand nodes by accumulated length alone.
    #[default]
    #[serde(alias = "uniform_cost")]
    UniformCost,
    /// Add the great-circle distance to the destination as an estimate.
    #[serde(alias = "heuristic_guided")]
    HeuristicGuided,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 2] = [Self::UniformCost, Self::HeuristicGuided];

    /// Kebab-case name used in requests and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UniformCost => "uniform-cost",
            Self::HeuristicGuided => "heuristic-guided",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`Strategy`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}`; expected `uniform-cost` or `heuristic-guided`")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "uniform-cost" | "uniform_cost" => Ok(Self::UniformCost),
            "heuristic-guided" | "heuristic_guided" => Ok(Self::HeuristicGuided),
            other => Err(ParseStrategyError(other.to_owned())),
        }
    }
}

/// Errors from [`PathFinder::shortest_path`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The node is not part of the graph.
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),
    /// No directed path joins the endpoints.
    #[error("no path from {origin} to {destination}")]
    PathNotFound {
        /// Start of the requested path.
        origin: NodeId,
        /// End of the requested path.
        destination: NodeId,
    },
    /// The path was found but its totals do not form a valid route, for
    /// example because the summed length overflowed.
    #[error("path from {origin} to {destination} has invalid totals: {source}")]
    InvalidRoute {
        /// Start of the requested path.
        origin: NodeId,
        /// End of the requested path.
        destination: NodeId,
        /// Why the totals were rejected.
        source: RouteError,
    },
}

/// Minimum-length path search over a weighted graph view.
///
/// `PathFinder` is `Copy` and `Sync`; optimiser workers share one per plan.
///
/// # Examples
/// ```
/// use stopover_core::{
///     EdgeAttributes, GeoPoint, NetworkGraph, NodeId, PathFinder, Strategy, WeightedGraph,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = NetworkGraph::builder();
/// builder
///     .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?
///     .add_node(NodeId(2), GeoPoint::new(0.0, 0.001))?
///     .add_node(NodeId(3), GeoPoint::new(0.0, 0.002))?;
/// builder.add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(120.0, 10.0))?;
/// builder.add_edge(NodeId(2), NodeId(3), EdgeAttributes::new(120.0, 10.0))?;
/// builder.add_edge(NodeId(1), NodeId(3), EdgeAttributes::new(400.0, 20.0))?;
/// let graph = builder.build();
///
/// let finder = PathFinder::new(WeightedGraph::unadjusted(&graph));
/// let route = finder.shortest_path(NodeId(1), NodeId(3), Strategy::HeuristicGuided)?;
/// assert_eq!(route.nodes(), &[NodeId(1), NodeId(2), NodeId(3)]);
/// assert_eq!(route.length(), 240.0);
/// assert_eq!(route.time(), 20.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    view: WeightedGraph<'a>,
}

impl<'a> PathFinder<'a> {
    /// Search over `view`.
    pub fn new(view: WeightedGraph<'a>) -> Self {
        Self { view }
    }

    /// The weight view being searched.
    pub fn view(&self) -> WeightedGraph<'a> {
        self.view
    }

    /// Compute the minimum-length route from `origin` to `destination`.
    ///
    /// When several parallel edges join two consecutive nodes, the shortest
    /// one (lowest parallel index on ties) is the one traversed, and its
    /// traffic-adjusted time is added to the route time.
    pub fn shortest_path(
        &self,
        origin: NodeId,
        destination: NodeId,
        strategy: Strategy,
    ) -> Result<Route, PathError> {
        let graph = self.view.graph();
        let start = graph
            .node_index(origin)
            .ok_or(PathError::UnknownNode(origin))?;
        let goal = graph
            .node_index(destination)
            .ok_or(PathError::UnknownNode(destination))?;
        if start == goal {
            return Ok(Route::stationary(origin));
        }

        let structure = graph.structure();
        let goal_position = graph
            .position(destination)
            .ok_or(PathError::UnknownNode(destination))?;
        let scale = graph.heuristic_scale();
        let estimate = |ix: NodeIndex| match strategy {
            Strategy::UniformCost => 0.0,
            Strategy::HeuristicGuided => structure
                .node_weight(ix)
                .map_or(0.0, |node| scale * node.position.haversine_m(&goal_position)),
        };

        let (_, path) = astar(
            structure,
            start,
            |ix| ix == goal,
            |edge| edge.weight().attributes.length,
            estimate,
        )
        .ok_or(PathError::PathNotFound {
            origin,
            destination,
        })?;

        let route = self.trace(&path, origin, destination)?;
        debug!(
            "{strategy} path {origin} -> {destination}: {} nodes, {:.1} m",
            route.nodes().len(),
            route.length()
        );
        Ok(route)
    }

    fn trace(
        &self,
        path: &[NodeIndex],
        origin: NodeId,
        destination: NodeId,
    ) -> Result<Route, PathError> {
        let not_found = PathError::PathNotFound {
            origin,
            destination,
        };
        let graph = self.view.graph();
        let nodes = path
            .iter()
            .map(|&ix| graph.node_data(ix).map(|node| node.id))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| not_found.clone())?;

        let mut length = 0.0;
        let mut time = 0.0;
        for (pair, ids) in path.windows(2).zip(nodes.windows(2)) {
            let (&[a, b], &[source, target]) = (pair, ids) else {
                return Err(not_found);
            };
            let edge = self
                .traversed_edge(a, b)
                .ok_or_else(|| not_found.clone())?;
            let attributes = self.view.adjust(source, target, edge.attributes);
            length += attributes.length;
            time += attributes.time;
        }
        Route::new(nodes, length, time).map_err(|source| PathError::InvalidRoute {
            origin,
            destination,
            source,
        })
    }

    fn traversed_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<&'a EdgeData> {
        self.view
            .graph()
            .structure()
            .edges_connecting(a, b)
            .map(|edge| edge.weight())
            .min_by(|x, y| {
                x.attributes
                    .length
                    .total_cmp(&y.attributes.length)
                    .then(x.parallel_index.cmp(&y.parallel_index))
            })
    }
}
