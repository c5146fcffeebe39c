//! Core domain types for the Stopover route planner.
//!
//! The crate models a road network as a weighted multigraph and provides the
//! building blocks of multi-stop planning: snapping destinations onto nodes,
//! overlaying traffic-adjusted travel times, shortest-path search, and
//! assembling the winning routes into a plan. Visiting-order search is
//! abstracted behind [`RouteOptimiser`] and implemented by solver crates.
//!
//! Every domain type is exported from the crate root; the modules themselves
//! are private:
//!
//! ```compile_fail
//! use stopover_core::traffic::TrafficOverlay;
//! ```
//!
//! ```
//! use stopover_core::{TrafficOverlay, TrafficSnapshot, WeightedGraph};
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assemble;
mod geo_point;
mod graph;
mod optimise;
mod path;
mod planner;
mod provider;
mod resolver;
mod route;
mod session;
mod traffic;

pub use assemble::{AssembleError, RouteAssembler};
pub use geo_point::GeoPoint;
pub use graph::{
    EdgeAttributes, EdgeKey, EdgeView, GraphError, NetworkGraph, NetworkGraphBuilder, NodeId,
};
pub use optimise::{
    CancellationToken, DEFAULT_MAX_DESTINATIONS, DEFAULT_MAX_ORDERINGS, OptimiseError,
    OptimiseRequest, OptimiserConfig, RouteOptimiser, ordering_count,
};
pub use path::{ParseStrategyError, PathError, PathFinder, Strategy};
pub use planner::{
    DEFAULT_RADIUS_M, GraphPlanner, PlanError, PlanRequest, PlanResponse, Planner, PlannerConfig,
};
pub use provider::{GraphProvider, GraphProviderError, validate_fetch_area};
pub use resolver::{
    DEFAULT_MAX_SNAP_DISTANCE_M, NearestNodeResolver, Resolution, ResolutionError,
    ResolvedDestination, ResolverConfig, SkippedDestination,
};
pub use route::{MultiStopPlan, Route, RouteError};
pub use session::{PlanningSession, SessionState, TransitionError};
pub use traffic::{
    CacheLoadError, OverlayStats, SnapshotError, TrafficOverlay, TrafficSnapshot, WeightedGraph,
};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
