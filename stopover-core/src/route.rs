//! Routes between destinations and the multi-stop plans built from them.

use thiserror::Error;

use crate::{GeoPoint, NodeId};

/// Errors returned by [`Route::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// No nodes were supplied.
    #[error("route must contain at least one node")]
    Empty,
    /// A total was negative or not finite.
    #[error("route {attribute} must be finite and non-negative, got {value}")]
    InvalidTotal {
        /// `length` or `time`.
        attribute: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Path between two nodes with its accumulated weights.
///
/// A route always holds at least one node; a route whose origin equals its
/// destination holds exactly one node and zero totals.
///
/// # Examples
/// ```
/// use stopover_core::{NodeId, Route};
///
/// # fn main() -> Result<(), stopover_core::RouteError> {
/// let route = Route::new(vec![NodeId(1), NodeId(4), NodeId(2)], 250.0, 30.0)?;
/// assert_eq!(route.origin(), NodeId(1));
/// assert_eq!(route.destination(), NodeId(2));
/// assert_eq!(route.length(), 250.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    nodes: Vec<NodeId>,
    origin: NodeId,
    destination: NodeId,
    length: f64,
    time: f64,
}

impl Route {
    /// Validates and constructs a [`Route`].
    pub fn new(nodes: Vec<NodeId>, length: f64, time: f64) -> Result<Self, RouteError> {
        let (Some(&origin), Some(&destination)) = (nodes.first(), nodes.last()) else {
            return Err(RouteError::Empty);
        };
        check_total("length", length)?;
        check_total("time", time)?;
        Ok(Self {
            nodes,
            origin,
            destination,
            length,
            time,
        })
    }

    /// Route that stays at `node`.
    pub fn stationary(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            origin: node,
            destination: node,
            length: 0.0,
            time: 0.0,
        }
    }

    /// Visited nodes, endpoints included.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// First node.
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// Last node.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Total length in metres.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Total travel time in seconds, traffic adjusted where known.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Consume the route, returning its nodes.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

fn check_total(attribute: &'static str, value: f64) -> Result<(), RouteError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RouteError::InvalidTotal { attribute, value })
    }
}

/// The cheapest itinerary found for a set of resolved destinations.
///
/// Built by [`RouteAssembler`](crate::RouteAssembler). For `k` resolved
/// destinations the plan holds `k - 1` routes; `order` lists the destinations
/// by their position in the resolved list and always starts with `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStopPlan {
    pub(crate) routes: Vec<Route>,
    pub(crate) order: Vec<usize>,
    pub(crate) total_length: f64,
    pub(crate) total_time: f64,
    pub(crate) leg_coordinates: Vec<Vec<GeoPoint>>,
    pub(crate) coordinates: Vec<GeoPoint>,
}

impl MultiStopPlan {
    /// One route per consecutive pair of visited destinations.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Visiting order as indices into the resolved destination list.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Sum of route lengths in metres.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Sum of route travel times in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Coordinates of each route's nodes.
    pub fn leg_coordinates(&self) -> &[Vec<GeoPoint>] {
        &self.leg_coordinates
    }

    /// All leg coordinates concatenated.
    ///
    /// The node joining two legs appears once at the end of the first and
    /// again at the start of the second.
    pub fn coordinates(&self) -> &[GeoPoint] {
        &self.coordinates
    }

    /// Node sequence of each route.
    pub fn legs(&self) -> Vec<Vec<NodeId>> {
        self.routes
            .iter()
            .map(|route| route.nodes().to_vec())
            .collect()
    }
}
