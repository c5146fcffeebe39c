//! Turn the winning routes into a [`MultiStopPlan`].

use thiserror::Error;

use crate::{GeoPoint, MultiStopPlan, NetworkGraph, NodeId, Route};

/// Errors from [`RouteAssembler::assemble`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// A route visits a node the graph does not know.
    #[error("route node {0} is not in the graph")]
    UnknownNode(NodeId),
    /// The visiting order does not have one more stop than there are routes.
    #[error("{stops} stops cannot be joined by {routes} routes")]
    LegCountMismatch {
        /// Number of stops in the visiting order.
        stops: usize,
        /// Number of routes supplied.
        routes: usize,
    },
    /// A route does not start where the previous one ended.
    #[error("route {leg} starts at {found} but the previous route ends at {expected}")]
    Discontinuous {
        /// Position of the offending route.
        leg: usize,
        /// End of the previous route.
        expected: NodeId,
        /// Start of the offending route.
        found: NodeId,
    },
}

/// Builds plans from routes, looking up node positions in a graph.
///
/// # Examples
/// ```
/// use stopover_core::{GeoPoint, NetworkGraph, NodeId, Route, RouteAssembler};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = NetworkGraph::builder();
/// builder
///     .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?
///     .add_node(NodeId(2), GeoPoint::new(0.0, 0.001))?;
/// let graph = builder.build();
///
/// let route = Route::new(vec![NodeId(1), NodeId(2)], 120.0, 15.0)?;
/// let plan = RouteAssembler::new(&graph).assemble(vec![0, 1], vec![route])?;
/// assert_eq!(plan.coordinates().len(), 2);
/// assert_eq!(plan.total_length(), 120.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteAssembler<'a> {
    graph: &'a NetworkGraph,
}

impl<'a> RouteAssembler<'a> {
    /// Assemble plans over `graph`.
    pub fn new(graph: &'a NetworkGraph) -> Self {
        Self { graph }
    }

    /// Combine `routes`, visited in `order`, into a plan.
    ///
    /// An order with a single stop and no routes yields an empty plan.
    pub fn assemble(
        &self,
        order: Vec<usize>,
        routes: Vec<Route>,
    ) -> Result<MultiStopPlan, AssembleError> {
        if order.len() != routes.len() + 1 {
            return Err(AssembleError::LegCountMismatch {
                stops: order.len(),
                routes: routes.len(),
            });
        }
        for (leg, pair) in routes.windows(2).enumerate() {
            if let [previous, next] = pair {
                if previous.destination() != next.origin() {
                    return Err(AssembleError::Discontinuous {
                        leg: leg + 1,
                        expected: previous.destination(),
                        found: next.origin(),
                    });
                }
            }
        }

        let leg_coordinates = routes
            .iter()
            .map(|route| self.coordinates(route))
            .collect::<Result<Vec<_>, _>>()?;
        let coordinates = leg_coordinates.iter().flatten().copied().collect();

        Ok(MultiStopPlan {
            total_length: routes.iter().map(Route::length).sum(),
            total_time: routes.iter().map(Route::time).sum(),
            routes,
            order,
            leg_coordinates,
            coordinates,
        })
    }

    /// Coordinates of each node along `route`.
    pub fn coordinates(&self, route: &Route) -> Result<Vec<GeoPoint>, AssembleError> {
        route
            .nodes()
            .iter()
            .map(|&id| self.graph.position(id).ok_or(AssembleError::UnknownNode(id)))
            .collect()
    }
}
