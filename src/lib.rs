//! Facade crate for the Stopover route planner.
//!
//! This crate re-exports the core domain types and exposes the optional
//! optimiser and graph provider implementations behind feature flags.

#![forbid(unsafe_code)]

pub use stopover_core::{
    GeoPoint, GraphPlanner, GraphProvider, GraphProviderError, MultiStopPlan, NetworkGraph,
    NodeId, OptimiseError, PlanError, PlanRequest, PlanResponse, Planner, PlannerConfig,
    RouteOptimiser, SkippedDestination, Strategy, TrafficSnapshot,
};

#[cfg(feature = "solver-exhaustive")]
pub use stopover_solver_exhaustive::{ExhaustiveOptimiser, ExhaustivePlanner, exhaustive_planner};

#[cfg(feature = "provider-json")]
pub use stopover_data::{GraphExport, JsonGraphProvider};
