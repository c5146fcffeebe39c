//! Request/response boundary of the engine.
//!
//! A [`Planner`] turns a [`PlanRequest`] into a [`PlanResponse`]. The
//! [`GraphPlanner`] implementation fetches a graph from a [`GraphProvider`],
//! snaps the destinations, applies optional traffic, and hands the frozen view
//! to a [`RouteOptimiser`].

use camino::Utf8PathBuf;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CacheLoadError, CancellationToken, GeoPoint, GraphProvider, GraphProviderError,
    MultiStopPlan, NearestNodeResolver, NodeId, OptimiseError, OptimiseRequest, OptimiserConfig,
    PlanningSession, Resolution, ResolverConfig, RouteOptimiser, SkippedDestination, Strategy,
    TrafficSnapshot, TransitionError,
};

/// Default radius of the graph fetched around the departure point, in metres.
pub const DEFAULT_RADIUS_M: f64 = 1_000.0;

/// Parameters for a planning request.
///
/// # Examples
/// ```rust
/// use stopover_core::{GeoPoint, PlanRequest, Strategy};
///
/// let request: PlanRequest = serde_json::from_str(
///     r#"{ "destinations": [{ "lat": 51.5, "lon": -0.12 }, { "lat": 51.51, "lon": -0.1 }] }"#,
/// )
/// .unwrap();
/// assert_eq!(request.destinations.len(), 2);
/// assert_eq!(request.strategy, Strategy::UniformCost);
/// assert!(request.traffic_snapshot.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Destinations to visit; the first is the fixed departure point.
    pub destinations: Vec<GeoPoint>,
    /// Optional traffic snapshot file. A missing file is not an error.
    #[serde(default)]
    pub traffic_snapshot: Option<Utf8PathBuf>,
    /// Path search strategy.
    #[serde(default)]
    pub strategy: Strategy,
}

impl PlanRequest {
    /// Request visiting `destinations` with default options.
    pub fn new(destinations: Vec<GeoPoint>) -> Self {
        Self {
            destinations,
            traffic_snapshot: None,
            strategy: Strategy::default(),
        }
    }

    /// Validate the request before any work is done.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.destinations.is_empty() {
            return Err(PlanError::EmptyInput { destinations: 0 });
        }
        Ok(())
    }
}

/// Result of a successful plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResponse {
    /// Concatenated coordinates of every leg.
    pub route_coords: Vec<GeoPoint>,
    /// Node sequence of each leg.
    pub legs: Vec<Vec<NodeId>>,
    /// Total length in metres.
    pub route_length: f64,
    /// Total travel time in seconds.
    pub route_time: f64,
    /// Visiting order as indices into [`PlanRequest::destinations`].
    pub order: Vec<usize>,
    /// Destinations dropped during resolution.
    pub skipped: Vec<SkippedDestination>,
}

impl PlanResponse {
    fn from_plan(plan: &MultiStopPlan, resolution: Resolution) -> Self {
        let order = plan
            .order()
            .iter()
            .filter_map(|&i| resolution.resolved.get(i).map(|dest| dest.index))
            .collect();
        Self {
            route_coords: plan.coordinates().to_vec(),
            legs: plan.legs(),
            route_length: plan.total_length(),
            route_time: plan.total_time(),
            order,
            skipped: resolution.skipped,
        }
    }
}

/// Errors returned by [`Planner::plan`].
#[derive(Debug, Error)]
pub enum PlanError {
    /// Fewer than two usable destinations.
    #[error("at least two destinations are required, got {destinations}")]
    EmptyInput {
        /// Destinations available for planning.
        destinations: usize,
    },
    /// None of the destinations could be snapped onto the graph.
    #[error("none of the destinations could be matched to the road network")]
    NoDestinationsResolved,
    /// Every visiting order contained an unroutable leg.
    #[error("no route visits every destination; {orderings} visiting orders were unroutable")]
    NoFeasiblePlan {
        /// Orderings evaluated.
        orderings: usize,
    },
    /// The traffic snapshot exists but could not be read.
    #[error(transparent)]
    CacheLoad(#[from] CacheLoadError),
    /// The graph provider failed.
    #[error(transparent)]
    GraphProvider(#[from] GraphProviderError),
    /// A planning step ran out of order.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    /// The optimiser failed.
    #[error(transparent)]
    Optimise(OptimiseError),
}

impl From<OptimiseError> for PlanError {
    fn from(err: OptimiseError) -> Self {
        match err {
            OptimiseError::NoFeasiblePlan { orderings } => Self::NoFeasiblePlan { orderings },
            other => Self::Optimise(other),
        }
    }
}

/// Plan multi-stop routes.
///
/// Implementations should return [`PlanError`] for invalid requests rather
/// than panicking. Planners must be `Send + Sync` to serve requests from
/// several threads.
pub trait Planner: Send + Sync {
    /// Plan a request, producing a response or an error.
    fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError>;
}

/// Configuration for [`GraphPlanner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Radius of the graph fetched around the departure point, in metres.
    pub radius_m: f64,
    /// Destination snapping.
    pub resolver: ResolverConfig,
    /// Optimisation limits.
    pub optimiser: OptimiserConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            resolver: ResolverConfig::default(),
            optimiser: OptimiserConfig::default(),
        }
    }
}

/// Planner generic over the graph source and the optimiser.
pub struct GraphPlanner<P, O>
where
    P: GraphProvider,
    O: RouteOptimiser,
{
    provider: P,
    optimiser: O,
    config: PlannerConfig,
    cancel: CancellationToken,
}

impl<P, O> GraphPlanner<P, O>
where
    P: GraphProvider,
    O: RouteOptimiser,
{
    /// Construct a planner using default configuration.
    pub fn new(provider: P, optimiser: O) -> Self {
        Self::with_config(provider, optimiser, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    pub fn with_config(provider: P, optimiser: O, config: PlannerConfig) -> Self {
        Self {
            provider,
            optimiser,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Token that cancels optimisations run by this planner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<P, O> Planner for GraphPlanner<P, O>
where
    P: GraphProvider,
    O: RouteOptimiser,
{
    fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        request.validate()?;
        // The graph is centred on the departure point; a malformed departure
        // point defers to the next valid destination.
        let center = request
            .destinations
            .iter()
            .copied()
            .find(GeoPoint::is_valid)
            .ok_or(PlanError::NoDestinationsResolved)?;

        let mut session = PlanningSession::new();
        session.load_graph(self.provider.fetch(center, self.config.radius_m)?)?;

        if let Some(path) = &request.traffic_snapshot {
            if let Some(snapshot) = TrafficSnapshot::load(path)? {
                let stats = session.apply_traffic(&snapshot)?;
                info!(
                    "applied traffic from {path}: {} edges adjusted, {} keys unmatched",
                    stats.adjusted_edges, stats.unmatched_keys
                );
            }
        }

        let resolution = match session.graph() {
            Some(graph) => NearestNodeResolver::new(graph, self.config.resolver)
                .resolve(&request.destinations),
            None => Resolution::default(),
        };
        match resolution.resolved.len() {
            0 => return Err(PlanError::NoDestinationsResolved),
            1 => return Err(PlanError::EmptyInput { destinations: 1 }),
            _ => {}
        }

        let stops = resolution.nodes();
        let plan = session.optimise(|view| {
            self.optimiser.optimise(&OptimiseRequest {
                view,
                stops: &stops,
                strategy: request.strategy,
                config: &self.config.optimiser,
                cancel: &self.cancel,
            })
        })??;

        info!(
            "planned {} stops ({} skipped): {:.1} m, {:.1} s",
            stops.len(),
            resolution.skipped.len(),
            plan.total_length(),
            plan.total_time()
        );
        Ok(PlanResponse::from_plan(&plan, resolution))
    }
}
